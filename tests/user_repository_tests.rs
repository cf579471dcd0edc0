//! Integration tests for UserRepository covering creation with the default
//! role grant, deletion semantics, and role assignment.

use std::time::Duration;

use anyhow::Result;
use rbac::error::RepositoryError;
use rbac::models::user_role::Entity as UserRole;
use rbac::repositories::{
    CreateRoleRequest, CreateUserRequest, RoleRepository, UpdateUserRequest, UserRepository,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

#[path = "common/mod.rs"]
mod common;
use common::setup_test_db;

fn user_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        tenant_id: None,
    }
}

async fn seed_default_role(db: &DatabaseConnection) -> Result<Uuid> {
    let repo = RoleRepository::new(db);
    let created = repo
        .create_role(CreateRoleRequest {
            name: "user".to_string(),
            description: None,
            is_default: true,
            tenant_id: None,
            permission_ids: vec![],
        })
        .await?;
    Ok(created.role.id)
}

#[tokio::test]
async fn create_user_grants_the_default_role() -> Result<()> {
    let db = setup_test_db().await?;
    let default_role = seed_default_role(&db).await?;
    let repo = UserRepository::new(&db);

    let created = repo.create_user(user_request("Ada@Example.com")).await?;

    // Email is normalized and the password hash never equals the input.
    assert_eq!(created.user.email, "ada@example.com");
    assert_ne!(created.user.password_hash, "correct horse battery");
    assert_eq!(created.roles.len(), 1);
    assert_eq!(created.roles[0].id, default_role);
    Ok(())
}

#[tokio::test]
async fn create_user_without_a_default_role_grants_nothing() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    let created = repo.create_user(user_request("ada@example.com")).await?;

    assert!(created.roles.is_empty());
    assert!(UserRole::find().all(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    repo.create_user(user_request("ada@example.com")).await?;
    let result = repo.create_user(user_request("ADA@example.com")).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    assert_eq!(repo.list_users(None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn weak_password_is_rejected() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    let result = repo
        .create_user(CreateUserRequest {
            password: "short".to_string(),
            ..user_request("ada@example.com")
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::Validation(_))));
    assert!(repo.list_users(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_user_removes_exactly_that_user() -> Result<()> {
    let db = setup_test_db().await?;
    seed_default_role(&db).await?;
    let repo = UserRepository::new(&db);

    let ada = repo.create_user(user_request("ada@example.com")).await?;
    let grace = repo.create_user(user_request("grace@example.com")).await?;

    repo.delete_user(ada.user.id).await?;

    let remaining = repo.list_users(None).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, grace.user.id);

    // Ada's grant cascaded away; Grace's survives untouched.
    let grants = UserRole::find().all(&db).await?;
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].user_id, grace.user.id);
    Ok(())
}

#[tokio::test]
async fn delete_unknown_user_is_not_found_with_no_side_effects() -> Result<()> {
    let db = setup_test_db().await?;
    seed_default_role(&db).await?;
    let repo = UserRepository::new(&db);
    repo.create_user(user_request("ada@example.com")).await?;

    let result = repo.delete_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    assert_eq!(repo.list_users(None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn assign_and_remove_role_round_trip() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);
    let roles = RoleRepository::new(&db);

    let user = repo.create_user(user_request("ada@example.com")).await?;
    let role = roles
        .create_role(CreateRoleRequest {
            name: "auditor".to_string(),
            description: None,
            is_default: false,
            tenant_id: None,
            permission_ids: vec![],
        })
        .await?;

    repo.assign_role(user.user.id, role.role.id).await?;

    assert_eq!(repo.list_role_grants(user.user.id).await?, vec![role.role.id]);
    assert_eq!(roles.list_role_members(role.role.id).await?, vec![user.user.id]);

    // A second identical grant conflicts.
    let result = repo.assign_role(user.user.id, role.role.id).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    repo.remove_role(user.user.id, role.role.id).await?;
    let result = repo.remove_role(user.user.id, role.role.id).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn assign_role_to_unknown_user_is_not_found() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    let result = repo.assign_role(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn update_user_edits_profile_fields_only() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    let created = repo.create_user(user_request("ada@example.com")).await?;
    let updated = repo
        .update_user(
            created.user.id,
            UpdateUserRequest {
                first_name: Some("Augusta".to_string()),
                last_name: None,
            },
        )
        .await?;

    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.last_name, "Lovelace");
    assert_eq!(updated.email, "ada@example.com");
    Ok(())
}

#[tokio::test]
async fn update_user_refreshes_updated_at() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    let created = repo.create_user(user_request("ada@example.com")).await?;

    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = repo
        .update_user(
            created.user.id,
            UpdateUserRequest {
                first_name: Some("Augusta".to_string()),
                last_name: None,
            },
        )
        .await?;

    assert!(updated.updated_at > created.user.updated_at);
    assert_eq!(updated.created_at, created.user.created_at);
    Ok(())
}

#[tokio::test]
async fn verify_credentials_matches_only_the_right_password() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = UserRepository::new(&db);

    repo.create_user(user_request("ada@example.com")).await?;

    let matched = repo
        .verify_credentials("ada@example.com", "correct horse battery")
        .await?;
    assert!(matched.is_some());

    let mismatched = repo
        .verify_credentials("ada@example.com", "wrong password")
        .await?;
    assert!(mismatched.is_none());

    let unknown = repo
        .verify_credentials("nobody@example.com", "correct horse battery")
        .await?;
    assert!(unknown.is_none());
    Ok(())
}
