//! Shared utilities.
//!
//! - [`email`]: SMTP notifications for the reset flow
//! - [`errors`]: application error type and HTTP mapping
//! - [`jwt`]: token issuance and verification
//! - [`password`]: bcrypt hashing and verification

pub mod email;
pub mod errors;
pub mod jwt;
pub mod password;
