//! Request middleware: authentication and authorization guards.
//!
//! The authorization pipeline is an ordered chain: the [`auth`]
//! authenticate layer runs first (bearer token verification plus a
//! database re-check of the account status), then the [`guard`]
//! extractors enforce profile, level, and write-access constraints.
//! Any failure short-circuits before the handler executes.

pub mod auth;
pub mod guard;
