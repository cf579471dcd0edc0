//! Permission seeding functionality
//!
//! Seeds the permissions table with the canonical capability set. Inserts
//! are insert-if-missing, so re-running the seed never duplicates rows.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::repositories::{CreatePermissionRequest, PermissionRepository};

/// The canonical permission set, as (name, description) pairs.
pub const CANONICAL_PERMISSIONS: &[(&str, &str)] = &[
    ("users.read", "List and inspect users"),
    ("users.write", "Create, update, and delete users"),
    ("roles.read", "List and inspect roles"),
    ("roles.write", "Create, update, and delete roles"),
    ("tenants.read", "List and inspect tenants"),
    ("tenants.write", "Create, update, and delete tenants"),
];

/// Seeds the permissions table with the canonical capability set.
pub async fn seed_permissions(db: &DatabaseConnection) -> Result<()> {
    let repo = PermissionRepository::new(db);

    for (name, description) in CANONICAL_PERMISSIONS {
        match repo.find_by_name(name).await? {
            Some(_) => {
                log::info!("Permission '{}' already exists, skipping", name);
            }
            None => {
                log::info!("Creating permission: {}", name);
                repo.create_permission(CreatePermissionRequest {
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                })
                .await?;
            }
        }
    }

    log::info!("Permission seeding completed successfully");
    Ok(())
}
