//! Database migrations for the RBAC API.
//!
//! Migrations must run in dependency order: tenants first, then users and
//! roles (both carry a nullable tenant foreign key), then permissions and
//! the two join tables.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_000001_create_tenants;
mod m2025_01_10_000002_create_users;
mod m2025_01_10_000003_create_roles;
mod m2025_01_10_000004_create_permissions;
mod m2025_01_10_000005_create_role_permissions;
mod m2025_01_10_000006_create_user_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_000001_create_tenants::Migration),
            Box::new(m2025_01_10_000002_create_users::Migration),
            Box::new(m2025_01_10_000003_create_roles::Migration),
            Box::new(m2025_01_10_000004_create_permissions::Migration),
            Box::new(m2025_01_10_000005_create_role_permissions::Migration),
            Box::new(m2025_01_10_000006_create_user_roles::Migration),
        ]
    }
}
