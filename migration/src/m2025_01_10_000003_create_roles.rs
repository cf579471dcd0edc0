//! Migration to create the roles table.
//!
//! Role names are unique per tenant scope. SQL NULLs compare unequal, so a
//! plain unique index on (tenant_id, name) would not cover the global scope
//! (null tenant_id); the unique index instead coalesces null tenant_id to a
//! sentinel UUID so the store enforces the invariant under concurrency.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

/// Sentinel standing in for the null (global) tenant scope in the unique
/// index expression. Must never collide with a real tenant id.
const NULL_SCOPE_SENTINEL: &str = "00000000-0000-0000-0000-000000000000";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Roles::Name).text().not_null())
                    .col(ColumnDef::new(Roles::Description).text().null())
                    .col(
                        ColumnDef::new(Roles::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Roles::TenantId).uuid().null())
                    .col(
                        ColumnDef::new(Roles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Roles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roles_tenant_id")
                            .from(Roles::Table, Roles::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Expression indexes are not expressible through the schema builder.
        let index_sql = match manager.get_database_backend() {
            DatabaseBackend::Postgres => format!(
                "CREATE UNIQUE INDEX idx_roles_scope_name ON roles \
                 (coalesce(tenant_id, '{}'::uuid), name)",
                NULL_SCOPE_SENTINEL
            ),
            _ => format!(
                "CREATE UNIQUE INDEX idx_roles_scope_name ON roles \
                 (coalesce(tenant_id, '{}'), name)",
                NULL_SCOPE_SENTINEL
            ),
        };
        manager
            .get_connection()
            .execute_unprepared(&index_sql)
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_roles_tenant_id")
                    .table(Roles::Table)
                    .col(Roles::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX idx_roles_scope_name")
            .await?;

        manager
            .drop_index(Index::drop().name("idx_roles_tenant_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    Description,
    IsDefault,
    TenantId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
