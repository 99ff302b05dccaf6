//! Tollgate Authz: identity resolution, effective permission resolution,
//! the authorization guard, guarded catalog administration and seeding.
//!
//! Everything here is generic over the repository traits in
//! `tollgate-core`, so this crate has no dependency on the database crate.

pub mod admin;
pub mod guard;
pub mod identity;
pub mod resolver;
pub mod seeder;

pub use admin::CatalogAdmin;
pub use guard::{Guard, ProtectedRoute, RbacContext, RequestContext};
pub use identity::IdentityBridge;
pub use resolver::{EffectivePermissions, PermissionResolver, PermissionSource};
pub use seeder::{SeedReport, Seeder};
