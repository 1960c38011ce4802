pub mod auth;
pub mod operators;
