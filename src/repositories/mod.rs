//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for the
//! RBAC entities. Repositories receive the connection pool handle explicitly
//! so there is no process-wide implicit database state; multi-statement
//! mutations run inside scoped transactions.

pub mod permission;
pub mod role;
pub mod tenant;
pub mod user;

pub use permission::{CreatePermissionRequest, PermissionRepository};
pub use role::{CreateRoleRequest, RoleRepository, RoleWithPermissions, UpdateRoleRequest};
pub use tenant::{CreateTenantRequest, TenantRepository};
pub use user::{CreateUserRequest, UpdateUserRequest, UserRepository, UserWithRoles};
