//! # Role Repository
//!
//! Repository for roles and their permission associations. Role creation and
//! updates run inside a scoped transaction so the role row and its
//! role_permissions links commit or roll back together.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::permission::{Entity as Permission, Model as PermissionModel};
use crate::models::role::{
    self, ActiveModel as RoleActiveModel, Entity as Role, Model as RoleModel,
};
use crate::models::role_permission::{
    self, ActiveModel as RolePermissionActiveModel, Entity as RolePermission,
};
use crate::models::{permission, user_role};

/// Request data for creating a new role
#[derive(Debug, Clone)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    /// Tenant scope; `None` creates a global role
    pub tenant_id: Option<Uuid>,
    pub permission_ids: Vec<Uuid>,
}

/// Request data for updating an existing role
#[derive(Debug, Clone, Default)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_default: Option<bool>,
    /// When present, replaces the full permission set
    pub permission_ids: Option<Vec<Uuid>>,
}

/// A role together with its associated permissions
#[derive(Debug, Clone)]
pub struct RoleWithPermissions {
    pub role: RoleModel,
    pub permissions: Vec<PermissionModel>,
}

/// Repository for role database operations
pub struct RoleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleRepository<'a> {
    /// Create a new RoleRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a role and link it to the given permissions.
    ///
    /// The role insert and the join-table inserts run in one transaction;
    /// any failure rolls the whole operation back. A duplicate name within
    /// the same tenant scope is a conflict, an unknown permission id is a
    /// validation error.
    pub async fn create_role(
        &self,
        request: CreateRoleRequest,
    ) -> Result<RoleWithPermissions, RepositoryError> {
        let name = validate_role_name(&request.name)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database)?;

        ensure_name_free_in_scope(&txn, &name, request.tenant_id, None).await?;

        let permissions = resolve_permissions(&txn, &request.permission_ids).await?;

        let now = Utc::now();
        let role = RoleActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(request.description),
            is_default: Set(request.is_default),
            tenant_id: Set(request.tenant_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let role = role
            .insert(&txn)
            .await
            .map_err(RepositoryError::database)?;

        link_permissions(&txn, role.id, &permissions).await?;

        txn.commit().await.map_err(RepositoryError::database)?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Get a role by id together with its full permission set.
    pub async fn get_role_by_id(
        &self,
        role_id: Uuid,
    ) -> Result<RoleWithPermissions, RepositoryError> {
        let role = Role::find_by_id(role_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("role {} not found", role_id)))?;

        let permissions = role
            .find_related(Permission)
            .all(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// List roles, optionally restricted to one tenant scope.
    pub async fn list_roles(
        &self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<RoleModel>, RepositoryError> {
        let mut query = Role::find();
        if let Some(tenant) = tenant_id {
            query = query.filter(role::Column::TenantId.eq(tenant));
        }

        query.all(self.db).await.map_err(RepositoryError::database)
    }

    /// Update a role; when `permission_ids` is present the permission set is
    /// replaced wholesale. Runs in one transaction.
    pub async fn update_role(
        &self,
        role_id: Uuid,
        request: UpdateRoleRequest,
    ) -> Result<RoleWithPermissions, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database)?;

        let role = Role::find_by_id(role_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("role {} not found", role_id)))?;

        let tenant_id = role.tenant_id;
        let mut active = role.into_active_model();

        if let Some(name) = request.name {
            let name = validate_role_name(&name)?;
            ensure_name_free_in_scope(&txn, &name, tenant_id, Some(role_id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(is_default) = request.is_default {
            active.is_default = Set(is_default);
        }
        active.updated_at = Set(Utc::now().into());

        let role = active
            .update(&txn)
            .await
            .map_err(RepositoryError::database)?;

        let permissions = match request.permission_ids {
            Some(ids) => {
                let permissions = resolve_permissions(&txn, &ids).await?;
                RolePermission::delete_many()
                    .filter(role_permission::Column::RoleId.eq(role_id))
                    .exec(&txn)
                    .await
                    .map_err(RepositoryError::database)?;
                link_permissions(&txn, role_id, &permissions).await?;
                permissions
            }
            None => {
                Role::find_by_id(role_id)
                    .one(&txn)
                    .await
                    .map_err(RepositoryError::database)?
                    .ok_or_else(|| {
                        RepositoryError::not_found(format!("role {} not found", role_id))
                    })?
                    .find_related(Permission)
                    .all(&txn)
                    .await
                    .map_err(RepositoryError::database)?
            }
        };

        txn.commit().await.map_err(RepositoryError::database)?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Delete a role; its role_permissions and user_roles links cascade.
    pub async fn delete_role(&self, role_id: Uuid) -> Result<(), RepositoryError> {
        let role = Role::find_by_id(role_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("role {} not found", role_id)))?;

        role.delete(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    /// Find the role flagged as default for new users, if any.
    pub async fn find_default_role(&self) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find()
            .filter(role::Column::IsDefault.eq(true))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)
    }

    /// List the users holding the given role.
    pub async fn list_role_members(&self, role_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let links = user_role::Entity::find()
            .filter(user_role::Column::RoleId.eq(role_id))
            .all(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(links.into_iter().map(|link| link.user_id).collect())
    }
}

fn validate_role_name(name: &str) -> Result<String, RepositoryError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(RepositoryError::validation("role name cannot be empty"));
    }

    if trimmed.len() > 255 {
        return Err(RepositoryError::validation(
            "role name cannot exceed 255 characters",
        ));
    }

    Ok(trimmed.to_string())
}

/// Pre-check the per-scope name uniqueness invariant for a descriptive
/// conflict message. The store enforces the invariant itself through the
/// unique index coalescing null tenant_id to a sentinel, so a race past this
/// check still surfaces as a conflict, just with a generic message.
async fn ensure_name_free_in_scope(
    txn: &DatabaseTransaction,
    name: &str,
    tenant_id: Option<Uuid>,
    exclude_role: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut query = Role::find().filter(role::Column::Name.eq(name));
    query = match tenant_id {
        Some(tenant) => query.filter(role::Column::TenantId.eq(tenant)),
        None => query.filter(role::Column::TenantId.is_null()),
    };
    if let Some(excluded) = exclude_role {
        query = query.filter(role::Column::Id.ne(excluded));
    }

    let existing = query.one(txn).await.map_err(RepositoryError::database)?;

    match existing {
        Some(_) => Err(RepositoryError::conflict(format!(
            "role '{}' already exists in this tenant scope",
            name
        ))),
        None => Ok(()),
    }
}

/// Resolve permission ids to rows, rejecting unknown ids before any write.
async fn resolve_permissions(
    txn: &DatabaseTransaction,
    permission_ids: &[Uuid],
) -> Result<Vec<PermissionModel>, RepositoryError> {
    let unique: BTreeSet<Uuid> = permission_ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let permissions = Permission::find()
        .filter(permission::Column::Id.is_in(unique.iter().copied().collect::<Vec<_>>()))
        .all(txn)
        .await
        .map_err(RepositoryError::database)?;

    if permissions.len() != unique.len() {
        let found: BTreeSet<Uuid> = permissions.iter().map(|p| p.id).collect();
        let missing: Vec<String> = unique
            .difference(&found)
            .map(|id| id.to_string())
            .collect();
        return Err(RepositoryError::validation(format!(
            "unknown permission id(s): {}",
            missing.join(", ")
        )));
    }

    Ok(permissions)
}

async fn link_permissions(
    txn: &DatabaseTransaction,
    role_id: Uuid,
    permissions: &[PermissionModel],
) -> Result<(), RepositoryError> {
    if permissions.is_empty() {
        return Ok(());
    }

    let links = permissions.iter().map(|permission| RolePermissionActiveModel {
        role_id: Set(role_id),
        permission_id: Set(permission.id),
    });

    RolePermission::insert_many(links)
        .exec(txn)
        .await
        .map_err(RepositoryError::database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_validation() {
        assert!(validate_role_name("editor").is_ok());
        assert_eq!(validate_role_name("  editor  ").unwrap(), "editor");
        assert!(matches!(
            validate_role_name(""),
            Err(RepositoryError::Validation(_))
        ));
        assert!(matches!(
            validate_role_name("   "),
            Err(RepositoryError::Validation(_))
        ));
        assert!(matches!(
            validate_role_name(&"a".repeat(256)),
            Err(RepositoryError::Validation(_))
        ));
    }
}
