//! # Seed Layer
//!
//! Populates the canonical permissions and global roles. Must run after
//! migrations and before any user registration relies on the default role.
//!
//! The role seed is destructive (it resets the roles table) and is intended
//! for seed environments only; never run it against populated production
//! data without explicit intent.

use anyhow::Result;
use sea_orm::DatabaseConnection;

pub mod permission;
pub mod role;

pub use permission::seed_permissions;
pub use role::seed_roles;

/// Run all seeds in dependency order: permissions first, then roles (the
/// role seed links the canonical roles to the seeded permissions).
pub async fn run(db: &DatabaseConnection) -> Result<()> {
    seed_permissions(db).await?;
    seed_roles(db).await?;
    Ok(())
}
