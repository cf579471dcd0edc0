//! # Data Models
//!
//! SeaORM entity models for the RBAC tables.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod permission;
pub mod role;
pub mod role_permission;
pub mod tenant;
pub mod user;
pub mod user_role;

pub use permission::Entity as Permission;
pub use role::Entity as Role;
pub use role_permission::Entity as RolePermission;
pub use tenant::Entity as Tenant;
pub use user::Entity as User;
pub use user_role::Entity as UserRole;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "rbac".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
