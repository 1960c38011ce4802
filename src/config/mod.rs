//! Configuration modules, each loaded from environment variables.
//!
//! - [`cors`]: allowed origins for the CORS layer
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`email`]: SMTP settings for password-reset notifications
//! - [`jwt`]: signing secret and token lifetime

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
