//! Integration tests for RoleRepository covering creation atomicity,
//! per-scope name uniqueness, and permission linking.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rbac::error::RepositoryError;
use rbac::models::role::ActiveModel as RoleActiveModel;
use rbac::models::role_permission::Entity as RolePermission;
use rbac::repositories::{
    CreatePermissionRequest, CreateRoleRequest, CreateTenantRequest, PermissionRepository,
    RoleRepository, TenantRepository, UpdateRoleRequest,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

#[path = "common/mod.rs"]
mod common;
use common::setup_test_db;

fn role_request(name: &str, tenant_id: Option<Uuid>, permission_ids: Vec<Uuid>) -> CreateRoleRequest {
    CreateRoleRequest {
        name: name.to_string(),
        description: None,
        is_default: false,
        tenant_id,
        permission_ids,
    }
}

async fn seed_permission(db: &DatabaseConnection, name: &str) -> Result<Uuid> {
    let repo = PermissionRepository::new(db);
    let permission = repo
        .create_permission(CreatePermissionRequest {
            name: name.to_string(),
            description: None,
        })
        .await?;
    Ok(permission.id)
}

#[tokio::test]
async fn create_role_links_exactly_the_requested_permissions() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let read = seed_permission(&db, "articles.read").await?;
    let write = seed_permission(&db, "articles.write").await?;
    seed_permission(&db, "articles.delete").await?;

    let created = repo
        .create_role(role_request("editor", None, vec![read, write, read]))
        .await?;

    assert_eq!(created.role.name, "editor");
    let mut linked: Vec<Uuid> = created.permissions.iter().map(|p| p.id).collect();
    linked.sort();
    let mut expected = vec![read, write];
    expected.sort();
    assert_eq!(linked, expected);

    // The fetched view agrees with the creation response.
    let fetched = repo.get_role_by_id(created.role.id).await?;
    assert_eq!(fetched.permissions.len(), 2);
    Ok(())
}

#[tokio::test]
async fn create_role_with_unknown_permission_writes_nothing() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let read = seed_permission(&db, "articles.read").await?;
    let bogus = Uuid::new_v4();

    let result = repo
        .create_role(role_request("editor", None, vec![read, bogus]))
        .await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));

    // No role row and no join rows leaked out of the failed creation.
    assert!(repo.list_roles(None).await?.is_empty());
    assert!(RolePermission::find().all(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_global_role_name_is_a_conflict() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    repo.create_role(role_request("admin", None, vec![])).await?;
    let result = repo.create_role(role_request("admin", None, vec![])).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    assert_eq!(repo.list_roles(None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn store_rejects_a_duplicate_global_name_without_the_repository_check() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    repo.create_role(role_request("ops", None, vec![])).await?;

    // Insert directly, the way a concurrent writer that raced past the
    // repository's scope lookup would reach the store.
    let now = Utc::now();
    let duplicate = RoleActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("ops".to_string()),
        description: Set(None),
        is_default: Set(false),
        tenant_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let err = duplicate
        .insert(&db)
        .await
        .expect_err("unique index rejects the duplicate");
    assert!(matches!(
        RepositoryError::database(err),
        RepositoryError::Conflict(_)
    ));
    assert_eq!(repo.list_roles(None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn same_role_name_is_allowed_across_tenant_scopes() -> Result<()> {
    let db = setup_test_db().await?;
    let tenants = TenantRepository::new(&db);
    let roles = RoleRepository::new(&db);

    let acme = tenants
        .create_tenant(CreateTenantRequest {
            name: "Acme".to_string(),
        })
        .await?;
    let globex = tenants
        .create_tenant(CreateTenantRequest {
            name: "Globex".to_string(),
        })
        .await?;

    roles
        .create_role(role_request("editor", Some(acme.id), vec![]))
        .await?;
    roles
        .create_role(role_request("editor", Some(globex.id), vec![]))
        .await?;
    roles.create_role(role_request("editor", None, vec![])).await?;

    // But a second "editor" within one scope conflicts.
    let result = roles
        .create_role(role_request("editor", Some(acme.id), vec![]))
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    assert_eq!(roles.list_roles(Some(acme.id)).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_role_name_is_rejected_before_any_write() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    for name in ["", "   "] {
        let result = repo.create_role(role_request(name, None, vec![])).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    assert!(repo.list_roles(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn get_unknown_role_is_not_found() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let result = repo.get_role_by_id(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn update_role_replaces_the_permission_set_wholesale() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let read = seed_permission(&db, "articles.read").await?;
    let write = seed_permission(&db, "articles.write").await?;

    let created = repo
        .create_role(role_request("editor", None, vec![read]))
        .await?;

    let updated = repo
        .update_role(
            created.role.id,
            UpdateRoleRequest {
                name: Some("senior-editor".to_string()),
                permission_ids: Some(vec![write]),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.role.name, "senior-editor");
    assert_eq!(updated.permissions.len(), 1);
    assert_eq!(updated.permissions[0].id, write);
    Ok(())
}

#[tokio::test]
async fn update_without_permission_ids_keeps_existing_links() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let read = seed_permission(&db, "articles.read").await?;
    let created = repo
        .create_role(role_request("editor", None, vec![read]))
        .await?;

    let updated = repo
        .update_role(
            created.role.id,
            UpdateRoleRequest {
                description: Some("Can edit articles".to_string()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.permissions.len(), 1);
    assert_eq!(updated.role.description.as_deref(), Some("Can edit articles"));
    Ok(())
}

#[tokio::test]
async fn update_role_refreshes_updated_at() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let created = repo.create_role(role_request("editor", None, vec![])).await?;

    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = repo
        .update_role(
            created.role.id,
            UpdateRoleRequest {
                description: Some("Can edit articles".to_string()),
                ..Default::default()
            },
        )
        .await?;

    assert!(updated.role.updated_at > created.role.updated_at);
    assert_eq!(updated.role.created_at, created.role.created_at);
    Ok(())
}

#[tokio::test]
async fn delete_role_cascades_its_permission_links() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = RoleRepository::new(&db);

    let read = seed_permission(&db, "articles.read").await?;
    let created = repo
        .create_role(role_request("editor", None, vec![read]))
        .await?;

    repo.delete_role(created.role.id).await?;

    assert!(repo.list_roles(None).await?.is_empty());
    assert!(RolePermission::find().all(&db).await?.is_empty());

    // The permission itself survives the role deletion.
    let permissions = PermissionRepository::new(&db);
    assert!(permissions.get_permission_by_id(read).await.is_ok());
    Ok(())
}
