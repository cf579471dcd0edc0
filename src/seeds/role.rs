//! Role seeding functionality
//!
//! Reset-then-insert of the two canonical global roles: `admin` (all seeded
//! permissions, not default) and `user` (read-only permissions, default for
//! new users). The reset deletes every role row, cascading away existing
//! role_permissions and user_roles links, so this is strictly a
//! seed-environment operation.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait};
use uuid::Uuid;

use crate::models::permission::{Entity as Permission, Model as PermissionModel};
use crate::models::role::ActiveModel as RoleActiveModel;
use crate::models::role_permission::{
    ActiveModel as RolePermissionActiveModel, Entity as RolePermission,
};
use crate::models::Role;

/// Seeds the two canonical global roles inside one transaction.
///
/// Running it twice yields exactly the two canonical roles, never
/// duplicates.
pub async fn seed_roles(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;

    // Destructive reset: clear the roles table (links cascade).
    let deleted = Role::delete_many().exec(&txn).await?;
    if deleted.rows_affected > 0 {
        log::warn!("Role seed removed {} existing role(s)", deleted.rows_affected);
    }

    let permissions = Permission::find().all(&txn).await?;
    let read_only: Vec<PermissionModel> = permissions
        .iter()
        .filter(|p| p.name.ends_with(".read"))
        .cloned()
        .collect();

    insert_role(&txn, "admin", "Full access", false, &permissions).await?;
    insert_role(&txn, "user", "Limited access", true, &read_only).await?;

    txn.commit().await?;

    log::info!("Role seeding completed successfully");
    Ok(())
}

async fn insert_role(
    txn: &DatabaseTransaction,
    name: &str,
    description: &str,
    is_default: bool,
    permissions: &[PermissionModel],
) -> Result<()> {
    let now = Utc::now();
    let role = RoleActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        is_default: Set(is_default),
        tenant_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let role = role.insert(txn).await?;
    log::info!("Seeded role '{}' with {} permission(s)", name, permissions.len());

    if permissions.is_empty() {
        return Ok(());
    }

    let links = permissions.iter().map(|permission| RolePermissionActiveModel {
        role_id: Set(role.id),
        permission_id: Set(permission.id),
    });
    RolePermission::insert_many(links).exec(txn).await?;

    Ok(())
}
