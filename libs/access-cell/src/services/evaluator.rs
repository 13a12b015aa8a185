// libs/access-cell/src/services/evaluator.rs
//
// Pure access checks over the static role table. Nothing here touches the
// store; callers hand in whatever role string they have and get a boolean.

use crate::models::{Permission, Role, UserRecord};

/// Whether the role string names an administrator-equivalent role.
pub fn is_admin_role(role: &str) -> bool {
    matches!(Role::parse(role), Some(Role::Admin))
}

/// Role-table membership check. Unknown or absent roles and absent
/// permissions evaluate to `false`, never an error.
pub fn has_permission(role: Option<&str>, permission: Option<Permission>) -> bool {
    let (Some(role), Some(permission)) = (role, permission) else {
        return false;
    };

    match Role::parse(role) {
        Some(role) => role.definition().permissions.contains(&permission),
        None => false,
    }
}

/// True iff at least one of `permissions` is granted. Empty list is `false`.
pub fn has_any_permission(role: Option<&str>, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(role, Some(*p)))
}

/// True iff every one of `permissions` is granted. An empty list is
/// vacuously `true`.
pub fn has_all_permissions(role: Option<&str>, permissions: &[Permission]) -> bool {
    permissions.iter().all(|p| has_permission(role, Some(*p)))
}

/// The permission set that actually governs a user: administrators always
/// get the full set, regardless of whatever (possibly stale) explicit list
/// is stored on the record; everyone else gets their explicit list when one
/// exists, or their role defaults. Unknown stored tokens are dropped.
pub fn effective_permissions(role: Option<&str>, stored: Option<&[String]>) -> Vec<Permission> {
    let parsed_role = role.and_then(Role::parse);

    if matches!(parsed_role, Some(Role::Admin)) {
        return Permission::ALL.to_vec();
    }

    if let Some(stored) = stored {
        return stored.iter().filter_map(|t| Permission::parse(t)).collect();
    }

    match parsed_role {
        Some(role) => role.definition().permissions.to_vec(),
        None => vec![],
    }
}

/// Access check against a stored user record, honoring explicit permission
/// overrides and the admin override.
pub fn user_has_permission(record: &UserRecord, permission: Permission) -> bool {
    if record.disabled {
        return false;
    }

    effective_permissions(Some(&record.role), record.permissions.as_deref())
        .contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_follows_role_table() {
        assert!(has_permission(Some("recepcionista"), Some(Permission::AppointmentsCreate)));
        assert!(!has_permission(Some("recepcionista"), Some(Permission::UsersView)));
        assert!(has_permission(Some("financeiro"), Some(Permission::FinancialReports)));
        assert!(!has_permission(Some("medico"), Some(Permission::FinancialView)));
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        assert!(!has_permission(Some("nonexistent_role"), Some(Permission::UsersView)));
        for p in Permission::ALL {
            assert!(!has_permission(Some("estagiario"), Some(*p)));
        }
    }

    #[test]
    fn absent_role_or_permission_is_false() {
        assert!(!has_permission(None, Some(Permission::UsersView)));
        assert!(!has_permission(Some("admin"), None));
        assert!(!has_permission(None, None));
    }

    #[test]
    fn role_lookup_is_case_insensitive() {
        for p in Permission::ALL {
            let lower = has_permission(Some("admin"), Some(*p));
            assert_eq!(has_permission(Some("ADMIN"), Some(*p)), lower);
            assert_eq!(has_permission(Some("Admin"), Some(*p)), lower);
        }
        assert!(has_permission(Some("RECEPCIONISTA"), Some(Permission::AppointmentsView)));
    }

    #[test]
    fn legacy_administrador_alias_is_admin() {
        assert!(is_admin_role("administrador"));
        assert!(is_admin_role("Administrador"));
        assert!(has_permission(Some("administrador"), Some(Permission::RolesManage)));
    }

    #[test]
    fn any_permission_empty_list_is_false() {
        assert!(!has_any_permission(Some("admin"), &[]));
    }

    #[test]
    fn any_permission_needs_one_grant() {
        assert!(has_any_permission(
            Some("financeiro"),
            &[Permission::UsersView, Permission::FinancialView]
        ));
        assert!(!has_any_permission(
            Some("financeiro"),
            &[Permission::UsersView, Permission::DatesEdit]
        ));
    }

    #[test]
    fn all_permissions_empty_list_is_vacuously_true() {
        assert!(has_all_permissions(Some("medico"), &[]));
        assert!(has_all_permissions(Some("nonexistent_role"), &[]));
    }

    #[test]
    fn all_permissions_needs_every_grant() {
        assert!(has_all_permissions(
            Some("gerente"),
            &[Permission::DatesEdit, Permission::ScheduleEdit]
        ));
        assert!(!has_all_permissions(
            Some("gerente"),
            &[Permission::DatesEdit, Permission::UsersDelete]
        ));
    }

    #[test]
    fn admin_override_ignores_stored_permissions() {
        let empty: Vec<String> = vec![];
        let stale = vec!["users:view".to_string()];

        let from_empty = effective_permissions(Some("admin"), Some(&empty));
        let from_stale = effective_permissions(Some("ADMIN"), Some(&stale));
        let from_none = effective_permissions(Some("administrador"), None);

        assert_eq!(from_empty, Permission::ALL.to_vec());
        assert_eq!(from_stale, Permission::ALL.to_vec());
        assert_eq!(from_none, Permission::ALL.to_vec());
    }

    #[test]
    fn explicit_permissions_override_role_defaults() {
        let stored = vec!["financial:reports".to_string()];
        let effective = effective_permissions(Some("recepcionista"), Some(&stored));
        assert_eq!(effective, vec![Permission::FinancialReports]);
    }

    #[test]
    fn unknown_stored_tokens_are_dropped() {
        let stored = vec!["users:view".to_string(), "warp:drive".to_string()];
        let effective = effective_permissions(Some("recepcionista"), Some(&stored));
        assert_eq!(effective, vec![Permission::UsersView]);
    }

    #[test]
    fn disabled_user_has_no_access() {
        let record = UserRecord {
            id: "u1".to_string(),
            email: "a@b.c".to_string(),
            nome: None,
            role: "admin".to_string(),
            permissions: None,
            disabled: true,
        };
        assert!(!user_has_permission(&record, Permission::UsersView));
    }
}
