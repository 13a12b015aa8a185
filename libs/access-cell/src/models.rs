// libs/access-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// PERMISSIONS
// ==============================================================================

/// Atomic capability token. The wire form is `resource:action` and is what
/// the `usuarios` collection stores; inside the process only this enum moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    #[serde(rename = "users:view")]
    UsersView,
    #[serde(rename = "users:create")]
    UsersCreate,
    #[serde(rename = "users:edit")]
    UsersEdit,
    #[serde(rename = "users:delete")]
    UsersDelete,

    #[serde(rename = "doctors:view")]
    DoctorsView,
    #[serde(rename = "doctors:create")]
    DoctorsCreate,
    #[serde(rename = "doctors:edit")]
    DoctorsEdit,
    #[serde(rename = "doctors:delete")]
    DoctorsDelete,

    #[serde(rename = "cities:view")]
    CitiesView,
    #[serde(rename = "cities:create")]
    CitiesCreate,
    #[serde(rename = "cities:edit")]
    CitiesEdit,
    #[serde(rename = "cities:delete")]
    CitiesDelete,

    #[serde(rename = "dates:view")]
    DatesView,
    #[serde(rename = "dates:create")]
    DatesCreate,
    #[serde(rename = "dates:edit")]
    DatesEdit,
    #[serde(rename = "dates:delete")]
    DatesDelete,

    #[serde(rename = "appointments:view")]
    AppointmentsView,
    #[serde(rename = "appointments:create")]
    AppointmentsCreate,
    #[serde(rename = "appointments:edit")]
    AppointmentsEdit,
    #[serde(rename = "appointments:delete")]
    AppointmentsDelete,

    #[serde(rename = "financial:view")]
    FinancialView,
    #[serde(rename = "financial:create")]
    FinancialCreate,
    #[serde(rename = "financial:edit")]
    FinancialEdit,
    #[serde(rename = "financial:delete")]
    FinancialDelete,
    #[serde(rename = "financial:reports")]
    FinancialReports,

    #[serde(rename = "schedule:view")]
    ScheduleView,
    #[serde(rename = "schedule:edit")]
    ScheduleEdit,

    #[serde(rename = "roles:manage")]
    RolesManage,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::UsersView,
        Permission::UsersCreate,
        Permission::UsersEdit,
        Permission::UsersDelete,
        Permission::DoctorsView,
        Permission::DoctorsCreate,
        Permission::DoctorsEdit,
        Permission::DoctorsDelete,
        Permission::CitiesView,
        Permission::CitiesCreate,
        Permission::CitiesEdit,
        Permission::CitiesDelete,
        Permission::DatesView,
        Permission::DatesCreate,
        Permission::DatesEdit,
        Permission::DatesDelete,
        Permission::AppointmentsView,
        Permission::AppointmentsCreate,
        Permission::AppointmentsEdit,
        Permission::AppointmentsDelete,
        Permission::FinancialView,
        Permission::FinancialCreate,
        Permission::FinancialEdit,
        Permission::FinancialDelete,
        Permission::FinancialReports,
        Permission::ScheduleView,
        Permission::ScheduleEdit,
        Permission::RolesManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UsersView => "users:view",
            Permission::UsersCreate => "users:create",
            Permission::UsersEdit => "users:edit",
            Permission::UsersDelete => "users:delete",
            Permission::DoctorsView => "doctors:view",
            Permission::DoctorsCreate => "doctors:create",
            Permission::DoctorsEdit => "doctors:edit",
            Permission::DoctorsDelete => "doctors:delete",
            Permission::CitiesView => "cities:view",
            Permission::CitiesCreate => "cities:create",
            Permission::CitiesEdit => "cities:edit",
            Permission::CitiesDelete => "cities:delete",
            Permission::DatesView => "dates:view",
            Permission::DatesCreate => "dates:create",
            Permission::DatesEdit => "dates:edit",
            Permission::DatesDelete => "dates:delete",
            Permission::AppointmentsView => "appointments:view",
            Permission::AppointmentsCreate => "appointments:create",
            Permission::AppointmentsEdit => "appointments:edit",
            Permission::AppointmentsDelete => "appointments:delete",
            Permission::FinancialView => "financial:view",
            Permission::FinancialCreate => "financial:create",
            Permission::FinancialEdit => "financial:edit",
            Permission::FinancialDelete => "financial:delete",
            Permission::FinancialReports => "financial:reports",
            Permission::ScheduleView => "schedule:view",
            Permission::ScheduleEdit => "schedule:edit",
            Permission::RolesManage => "roles:manage",
        }
    }

    /// Parse a stored token. Unknown tokens come back as `None` and are
    /// ignored by the evaluator rather than erroring.
    pub fn parse(token: &str) -> Option<Permission> {
        Permission::ALL.iter().copied().find(|p| p.as_str() == token)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// ROLES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Receptionist,
    Doctor,
    Financial,
}

impl Role {
    /// Case-insensitive role normalization, including the legacy
    /// `administrador` alias and English/Portuguese synonyms.
    pub fn parse(role: &str) -> Option<Role> {
        match role.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Some(Role::Admin),
            "gerente" | "manager" => Some(Role::Manager),
            "recepcionista" | "receptionist" => Some(Role::Receptionist),
            "medico" | "médico" | "doctor" => Some(Role::Doctor),
            "financeiro" | "financial" => Some(Role::Financial),
            _ => None,
        }
    }

    pub fn definition(&self) -> &'static RoleDefinition {
        match self {
            Role::Admin => &ROLE_ADMIN,
            Role::Manager => &ROLE_MANAGER,
            Role::Receptionist => &ROLE_RECEPTIONIST,
            Role::Doctor => &ROLE_DOCTOR,
            Role::Financial => &ROLE_FINANCIAL,
        }
    }

    pub fn all_definitions() -> [&'static RoleDefinition; 5] {
        [&ROLE_ADMIN, &ROLE_MANAGER, &ROLE_RECEPTIONIST, &ROLE_DOCTOR, &ROLE_FINANCIAL]
    }
}

/// One row of the static role table.
#[derive(Debug, Serialize)]
pub struct RoleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub permissions: &'static [Permission],
    pub can_manage_roles: bool,
}

static ROLE_ADMIN: RoleDefinition = RoleDefinition {
    id: "admin",
    name: "Administrador",
    permissions: Permission::ALL,
    can_manage_roles: true,
};

static ROLE_MANAGER: RoleDefinition = RoleDefinition {
    id: "gerente",
    name: "Gerente",
    permissions: &[
        Permission::DoctorsView,
        Permission::DoctorsCreate,
        Permission::DoctorsEdit,
        Permission::DoctorsDelete,
        Permission::CitiesView,
        Permission::CitiesCreate,
        Permission::CitiesEdit,
        Permission::CitiesDelete,
        Permission::DatesView,
        Permission::DatesCreate,
        Permission::DatesEdit,
        Permission::DatesDelete,
        Permission::AppointmentsView,
        Permission::AppointmentsCreate,
        Permission::AppointmentsEdit,
        Permission::AppointmentsDelete,
        Permission::FinancialView,
        Permission::FinancialReports,
        Permission::ScheduleView,
        Permission::ScheduleEdit,
    ],
    can_manage_roles: false,
};

static ROLE_RECEPTIONIST: RoleDefinition = RoleDefinition {
    id: "recepcionista",
    name: "Recepcionista",
    permissions: &[
        Permission::CitiesView,
        Permission::DoctorsView,
        Permission::DatesView,
        Permission::AppointmentsView,
        Permission::AppointmentsCreate,
        Permission::AppointmentsEdit,
        Permission::ScheduleView,
    ],
    can_manage_roles: false,
};

static ROLE_DOCTOR: RoleDefinition = RoleDefinition {
    id: "medico",
    name: "Médico",
    permissions: &[
        Permission::CitiesView,
        Permission::DatesView,
        Permission::AppointmentsView,
        Permission::ScheduleView,
    ],
    can_manage_roles: false,
};

static ROLE_FINANCIAL: RoleDefinition = RoleDefinition {
    id: "financeiro",
    name: "Financeiro",
    permissions: &[
        Permission::CitiesView,
        Permission::FinancialView,
        Permission::FinancialCreate,
        Permission::FinancialEdit,
        Permission::FinancialDelete,
        Permission::FinancialReports,
    ],
    can_manage_roles: false,
};

// ==============================================================================
// USER RECORDS (collection `usuarios`)
// ==============================================================================

/// Stored user as persisted in `usuarios`. Permissions stay as raw tokens
/// here; `effective_permissions` is where they become typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub nome: Option<String>,
    pub role: String,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub nome: Option<String>,
    pub role: String,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub nome: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub disabled: Option<bool>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("User not found")]
    NotFound,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Auth provider error: {0}")]
    AuthProviderError(String),
}
