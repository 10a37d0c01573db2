//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`confirmation`] -- configuration for emailed confirmation codes.

pub mod confirmation;
pub mod jwt;
