//! User entity model
//!
//! SeaORM entity for the users table. Users hold roles through the
//! user_roles join table and may be scoped to a tenant.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// User entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Email address (unique)
    pub email: String,

    /// Argon2id PHC-format password hash
    pub password_hash: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Tenant scope; null means a global (cross-tenant) user
    pub tenant_id: Option<Uuid>,

    /// Timestamp when the user was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the user was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
