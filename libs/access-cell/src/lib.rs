pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Permission, Role, RoleDefinition, UserRecord};
pub use services::evaluator::{
    has_permission, has_any_permission, has_all_permissions,
    effective_permissions, is_admin_role,
};
pub use services::guard::ensure_permission;
