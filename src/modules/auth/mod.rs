//! Authentication and password-reset flow.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
