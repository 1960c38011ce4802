//! Operator account management (role-gated CRUD + paginated filter).

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
