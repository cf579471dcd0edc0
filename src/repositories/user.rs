//! # User Repository
//!
//! Repository for user CRUD and role assignment. User creation hashes the
//! password with Argon2id and grants the default role (when one exists)
//! inside the same transaction as the user insert.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::role::{self, Entity as Role, Model as RoleModel};
use crate::models::user::{
    self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel,
};
use crate::models::user_role::{self, ActiveModel as UserRoleActiveModel, Entity as UserRole};
use crate::password;

/// Request data for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    /// Plaintext password; hashed before it reaches the database
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Tenant scope; `None` creates a global user
    pub tenant_id: Option<Uuid>,
}

/// Request data for a profile edit
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A user together with the roles they hold
#[derive(Debug, Clone)]
pub struct UserWithRoles {
    pub user: UserModel,
    pub roles: Vec<RoleModel>,
}

/// Repository for user database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a user. The insert and the default-role grant run in one
    /// transaction; a duplicate email is a conflict.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserWithRoles, RepositoryError> {
        validate_new_user(&request)?;

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database)?;

        let email = request.email.trim().to_lowercase();
        let existing = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await
            .map_err(RepositoryError::database)?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            tenant_id: Set(request.tenant_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let user = user
            .insert(&txn)
            .await
            .map_err(RepositoryError::database)?;

        // Grant the default role when one is seeded.
        let default_role = Role::find()
            .filter(role::Column::IsDefault.eq(true))
            .one(&txn)
            .await
            .map_err(RepositoryError::database)?;

        let mut roles = Vec::new();
        if let Some(role) = default_role {
            UserRoleActiveModel {
                user_id: Set(user.id),
                role_id: Set(role.id),
            }
            .insert(&txn)
            .await
            .map_err(RepositoryError::database)?;
            roles.push(role);
        }

        txn.commit().await.map_err(RepositoryError::database)?;

        Ok(UserWithRoles { user, roles })
    }

    /// Get a user by id together with the roles they hold.
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<UserWithRoles, RepositoryError> {
        let user = User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("user {} not found", user_id)))?;

        let roles = user
            .find_related(Role)
            .all(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(UserWithRoles { user, roles })
    }

    /// List users, optionally restricted to one tenant scope.
    pub async fn list_users(
        &self,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<UserModel>, RepositoryError> {
        let mut query = User::find();
        if let Some(tenant) = tenant_id {
            query = query.filter(user::Column::TenantId.eq(tenant));
        }

        query.all(self.db).await.map_err(RepositoryError::database)
    }

    /// Apply a profile edit, refreshing the updated_at timestamp.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserModel, RepositoryError> {
        let user = User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("user {} not found", user_id)))?;

        let mut active = user.into_active_model();

        if let Some(first_name) = request.first_name {
            let first_name = first_name.trim().to_string();
            if first_name.is_empty() {
                return Err(RepositoryError::validation("first name cannot be empty"));
            }
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            let last_name = last_name.trim().to_string();
            if last_name.is_empty() {
                return Err(RepositoryError::validation("last name cannot be empty"));
            }
            active.last_name = Set(last_name);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(self.db).await.map_err(RepositoryError::database)
    }

    /// Hard-delete a user. Fails with NotFound (and no side effects) when the
    /// id does not exist; user_roles links cascade.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let user = User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("user {} not found", user_id)))?;

        user.delete(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    /// Grant a role to a user. Both must exist; a duplicate grant is a
    /// conflict.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError> {
        User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("user {} not found", user_id)))?;

        Role::find_by_id(role_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| RepositoryError::not_found(format!("role {} not found", role_id)))?;

        let existing = UserRole::find_by_id((user_id, role_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?;
        if existing.is_some() {
            return Err(RepositoryError::conflict("role is already assigned"));
        }

        UserRoleActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database)?;

        Ok(())
    }

    /// Revoke a role from a user; NotFound when the grant does not exist.
    pub async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError> {
        let link = UserRole::find_by_id((user_id, role_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?
            .ok_or_else(|| {
                RepositoryError::not_found(format!(
                    "user {} does not hold role {}",
                    user_id, role_id
                ))
            })?;

        link.delete(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    /// Verify a user's credentials, returning the user on success.
    pub async fn verify_credentials(
        &self,
        email: &str,
        candidate_password: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database)?;

        let Some(user) = user else {
            return Ok(None);
        };

        let matches = password::verify_password(candidate_password, &user.password_hash)
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        Ok(matches.then_some(user))
    }

    /// List the user_roles rows for a user (grant audit helper).
    pub async fn list_role_grants(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let links = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(self.db)
            .await
            .map_err(RepositoryError::database)?;

        Ok(links.into_iter().map(|link| link.role_id).collect())
    }
}

fn validate_new_user(request: &CreateUserRequest) -> Result<(), RepositoryError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(RepositoryError::validation("a valid email is required"));
    }

    if request.password.len() < 8 {
        return Err(RepositoryError::validation(
            "password must be at least 8 characters",
        ));
    }

    if request.first_name.trim().is_empty() {
        return Err(RepositoryError::validation("first name cannot be empty"));
    }

    if request.last_name.trim().is_empty() {
        return Err(RepositoryError::validation("last name cannot be empty"));
    }

    Ok(())
}
