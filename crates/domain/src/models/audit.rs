//! Audit log (bitácora) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed enumeration of audited action kinds.
///
/// Unknown inbound strings are rejected at the boundary; `Other` is an
/// explicit, caller-chosen kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditActionKind {
    Login,
    Logout,
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateRole,
    UpdateRole,
    DeleteRole,
    AssignRole,
    RemoveRole,
    CreatePermission,
    UpdatePermission,
    DeletePermission,
    CreateClient,
    UpdateClient,
    DeleteClient,
    CreatePlan,
    UpdatePlan,
    DeletePlan,
    CreatePromotion,
    UpdatePromotion,
    DeletePromotion,
    CreateEnrollment,
    CreateMembership,
    UpdateMembership,
    ApplyPromotion,
    ChangePassword,
    ForgotPassword,
    ResetPassword,
    Error,
    Other,
}

impl AuditActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditActionKind::Login => "login",
            AuditActionKind::Logout => "logout",
            AuditActionKind::CreateUser => "create_user",
            AuditActionKind::UpdateUser => "update_user",
            AuditActionKind::DeleteUser => "delete_user",
            AuditActionKind::CreateRole => "create_role",
            AuditActionKind::UpdateRole => "update_role",
            AuditActionKind::DeleteRole => "delete_role",
            AuditActionKind::AssignRole => "assign_role",
            AuditActionKind::RemoveRole => "remove_role",
            AuditActionKind::CreatePermission => "create_permission",
            AuditActionKind::UpdatePermission => "update_permission",
            AuditActionKind::DeletePermission => "delete_permission",
            AuditActionKind::CreateClient => "create_client",
            AuditActionKind::UpdateClient => "update_client",
            AuditActionKind::DeleteClient => "delete_client",
            AuditActionKind::CreatePlan => "create_plan",
            AuditActionKind::UpdatePlan => "update_plan",
            AuditActionKind::DeletePlan => "delete_plan",
            AuditActionKind::CreatePromotion => "create_promotion",
            AuditActionKind::UpdatePromotion => "update_promotion",
            AuditActionKind::DeletePromotion => "delete_promotion",
            AuditActionKind::CreateEnrollment => "create_enrollment",
            AuditActionKind::CreateMembership => "create_membership",
            AuditActionKind::UpdateMembership => "update_membership",
            AuditActionKind::ApplyPromotion => "apply_promotion",
            AuditActionKind::ChangePassword => "change_password",
            AuditActionKind::ForgotPassword => "forgot_password",
            AuditActionKind::ResetPassword => "reset_password",
            AuditActionKind::Error => "error",
            AuditActionKind::Other => "other",
        }
    }

    /// Human-readable display label shown by the front end.
    pub fn display(&self) -> &'static str {
        match self {
            AuditActionKind::Login => "Inicio de Sesión",
            AuditActionKind::Logout => "Cierre de Sesión",
            AuditActionKind::CreateUser => "Crear Usuario",
            AuditActionKind::UpdateUser => "Actualizar Usuario",
            AuditActionKind::DeleteUser => "Eliminar Usuario",
            AuditActionKind::CreateRole => "Crear Rol",
            AuditActionKind::UpdateRole => "Actualizar Rol",
            AuditActionKind::DeleteRole => "Eliminar Rol",
            AuditActionKind::AssignRole => "Asignar Rol",
            AuditActionKind::RemoveRole => "Remover Rol",
            AuditActionKind::CreatePermission => "Crear Permiso",
            AuditActionKind::UpdatePermission => "Actualizar Permiso",
            AuditActionKind::DeletePermission => "Eliminar Permiso",
            AuditActionKind::CreateClient => "Crear Cliente",
            AuditActionKind::UpdateClient => "Actualizar Cliente",
            AuditActionKind::DeleteClient => "Eliminar Cliente",
            AuditActionKind::CreatePlan => "Crear Plan",
            AuditActionKind::UpdatePlan => "Actualizar Plan",
            AuditActionKind::DeletePlan => "Eliminar Plan",
            AuditActionKind::CreatePromotion => "Crear Promoción",
            AuditActionKind::UpdatePromotion => "Actualizar Promoción",
            AuditActionKind::DeletePromotion => "Eliminar Promoción",
            AuditActionKind::CreateEnrollment => "Registrar Inscripción",
            AuditActionKind::CreateMembership => "Crear Membresía",
            AuditActionKind::UpdateMembership => "Actualizar Membresía",
            AuditActionKind::ApplyPromotion => "Aplicar Promoción",
            AuditActionKind::ChangePassword => "Cambio de Contraseña",
            AuditActionKind::ForgotPassword => "Recuperación de Contraseña",
            AuditActionKind::ResetPassword => "Restablecer Contraseña",
            AuditActionKind::Error => "Error del Sistema",
            AuditActionKind::Other => "Otra Actividad",
        }
    }
}

impl FromStr for AuditActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(AuditActionKind::Login),
            "logout" => Ok(AuditActionKind::Logout),
            "create_user" => Ok(AuditActionKind::CreateUser),
            "update_user" => Ok(AuditActionKind::UpdateUser),
            "delete_user" => Ok(AuditActionKind::DeleteUser),
            "create_role" => Ok(AuditActionKind::CreateRole),
            "update_role" => Ok(AuditActionKind::UpdateRole),
            "delete_role" => Ok(AuditActionKind::DeleteRole),
            "assign_role" => Ok(AuditActionKind::AssignRole),
            "remove_role" => Ok(AuditActionKind::RemoveRole),
            "create_permission" => Ok(AuditActionKind::CreatePermission),
            "update_permission" => Ok(AuditActionKind::UpdatePermission),
            "delete_permission" => Ok(AuditActionKind::DeletePermission),
            "create_client" => Ok(AuditActionKind::CreateClient),
            "update_client" => Ok(AuditActionKind::UpdateClient),
            "delete_client" => Ok(AuditActionKind::DeleteClient),
            "create_plan" => Ok(AuditActionKind::CreatePlan),
            "update_plan" => Ok(AuditActionKind::UpdatePlan),
            "delete_plan" => Ok(AuditActionKind::DeletePlan),
            "create_promotion" => Ok(AuditActionKind::CreatePromotion),
            "update_promotion" => Ok(AuditActionKind::UpdatePromotion),
            "delete_promotion" => Ok(AuditActionKind::DeletePromotion),
            "create_enrollment" => Ok(AuditActionKind::CreateEnrollment),
            "create_membership" => Ok(AuditActionKind::CreateMembership),
            "update_membership" => Ok(AuditActionKind::UpdateMembership),
            "apply_promotion" => Ok(AuditActionKind::ApplyPromotion),
            "change_password" => Ok(AuditActionKind::ChangePassword),
            "forgot_password" => Ok(AuditActionKind::ForgotPassword),
            "reset_password" => Ok(AuditActionKind::ResetPassword),
            "error" => Ok(AuditActionKind::Error),
            "other" => Ok(AuditActionKind::Other),
            _ => Err(format!("Unknown audit action kind: {}", s)),
        }
    }
}

impl fmt::Display for AuditActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Severity::Info => "Información",
            Severity::Warning => "Advertencia",
            Severity::Error => "Error",
            Severity::Critical => "Crítico",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An audit log entry. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_display_name: Option<String>,
    pub action_kind: AuditActionKind,
    pub action: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub extra_data: Option<JsonValue>,
}

/// External representation of an audit entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: Uuid,
    pub user: Option<Uuid>,
    pub user_display_name: String,
    pub action_kind: AuditActionKind,
    pub action_kind_display: String,
    pub action: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub severity_display: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub formatted_timestamp: String,
    pub extra_data: Option<JsonValue>,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id,
            user: entry.user_id,
            user_display_name: entry
                .user_display_name
                .unwrap_or_else(|| "Sistema".to_string()),
            action_kind: entry.action_kind,
            action_kind_display: entry.action_kind.display().to_string(),
            action: entry.action,
            description: entry.description,
            severity: entry.severity,
            severity_display: entry.severity.display().to_string(),
            ip: entry.ip_address,
            user_agent: entry.user_agent,
            timestamp: entry.recorded_at,
            formatted_timestamp: entry.recorded_at.format("%d/%m/%Y %H:%M:%S").to_string(),
            extra_data: entry.extra_data,
        }
    }
}

/// Input for recording a new audit entry.
#[derive(Debug, Clone)]
pub struct RecordActivityInput {
    pub user_id: Option<Uuid>,
    pub action_kind: AuditActionKind,
    pub action: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub extra_data: Option<JsonValue>,
}

impl RecordActivityInput {
    /// Create a new input with the required fields; severity defaults to info.
    pub fn new(action_kind: AuditActionKind, action: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action_kind,
            action: action.into(),
            description: None,
            severity: Severity::Info,
            ip_address: None,
            user_agent: None,
            extra_data: None,
        }
    }

    /// Attribute the activity to a user.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach the request context (client ip + user agent).
    pub fn with_request_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn with_extra(mut self, extra: JsonValue) -> Self {
        self.extra_data = Some(extra);
        self
    }
}

/// Query parameters for listing audit entries.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Username substring filter
    pub usuario: Option<String>,
    /// Action kind filter (closed enum, rejected when unknown)
    pub tipo_accion: Option<String>,
    /// Severity filter
    pub nivel: Option<String>,
    /// Inclusive lower bound on recorded_at
    pub fecha_inicio: Option<DateTime<Utc>>,
    /// Inclusive upper bound on recorded_at
    pub fecha_fin: Option<DateTime<Utc>>,
    /// Free-text substring over the action text
    pub accion: Option<String>,
    /// IP substring filter
    pub ip: Option<String>,
}

/// Pagination info for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i32,
    pub per_page: i32,
    pub total: i64,
    pub total_pages: i32,
}

/// Response envelope for the audit list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditResponse {
    pub data: Vec<AuditEntryResponse>,
    pub pagination: Pagination,
}

/// Count of entries for one action kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindCount {
    pub action_kind: String,
    pub count: i64,
}

/// Count of entries for one severity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
}

/// Entries recorded on one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: chrono::NaiveDate,
    pub count: i64,
}

/// One of the most active users.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub user_id: Uuid,
    pub username: String,
    pub count: i64,
}

/// Aggregate statistics for the audit log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatsResponse {
    pub total: i64,
    pub by_action_kind: Vec<KindCount>,
    pub by_severity: Vec<SeverityCount>,
    /// Per-day activity for the trailing 7 days
    pub last_seven_days: Vec<DailyActivity>,
    /// Top 5 most active users
    pub top_users: Vec<ActiveUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_roundtrip() {
        for kind in [
            AuditActionKind::Login,
            AuditActionKind::DeleteRole,
            AuditActionKind::ApplyPromotion,
            AuditActionKind::ForgotPassword,
            AuditActionKind::Other,
        ] {
            assert_eq!(AuditActionKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_action_kind_unknown_rejected() {
        assert!(AuditActionKind::from_str("teleport").is_err());
        assert!(AuditActionKind::from_str("").is_err());
    }

    #[test]
    fn test_severity_from_str_case_insensitive() {
        assert_eq!(Severity::from_str("INFO").unwrap(), Severity::Info);
        assert_eq!(Severity::from_str("Warning").unwrap(), Severity::Warning);
        assert!(Severity::from_str("fatal").is_err());
    }

    #[test]
    fn test_record_activity_input_builder() {
        let user_id = Uuid::new_v4();
        let input = RecordActivityInput::new(AuditActionKind::CreateRole, "Creó rol Recepcionista")
            .with_user(user_id)
            .with_severity(Severity::Info)
            .with_request_context(Some("10.0.0.1".to_string()), Some("curl/8".to_string()))
            .with_extra(serde_json::json!({"roleId": "abc"}));

        assert_eq!(input.user_id, Some(user_id));
        assert_eq!(input.action_kind, AuditActionKind::CreateRole);
        assert_eq!(input.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(input.extra_data.is_some());
    }

    #[test]
    fn test_audit_entry_response_system_fallback() {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id: None,
            user_display_name: None,
            action_kind: AuditActionKind::Error,
            action: "Error interno".to_string(),
            description: None,
            severity: Severity::Error,
            ip_address: None,
            user_agent: None,
            recorded_at: Utc::now(),
            extra_data: None,
        };

        let response = AuditEntryResponse::from(entry);
        assert_eq!(response.user_display_name, "Sistema");
        assert_eq!(response.severity_display, "Error");
        assert_eq!(response.action_kind_display, "Error del Sistema");
    }

    #[test]
    fn test_formatted_timestamp_shape() {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id: None,
            user_display_name: None,
            action_kind: AuditActionKind::Login,
            action: "Inicio de sesión".to_string(),
            description: None,
            severity: Severity::Info,
            ip_address: None,
            user_agent: None,
            recorded_at: chrono::DateTime::parse_from_rfc3339("2024-06-15T14:30:45Z")
                .unwrap()
                .with_timezone(&Utc),
            extra_data: None,
        };

        let response = AuditEntryResponse::from(entry);
        assert_eq!(response.formatted_timestamp, "15/06/2024 14:30:45");
    }
}
