//! Domain models for Tollgate.
//!
//! These are the core types shared across all crates.

pub mod action;
pub mod permission;
pub mod resource;
pub mod role;
pub mod user;
pub mod user_role;
