//! Audit entry entity.

use chrono::{DateTime, Utc};
use domain::models::{AuditActionKind, AuditEntry, Severity};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for audit entries. Joined with users for the display
/// name; `user_display_name` is null for system entries.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntryEntity {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_display_name: Option<String>,
    pub action_kind: String,
    pub action: String,
    pub description: Option<String>,
    pub severity: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub extra_data: Option<serde_json::Value>,
}

impl From<AuditEntryEntity> for AuditEntry {
    fn from(entity: AuditEntryEntity) -> Self {
        AuditEntry {
            id: entity.id,
            user_id: entity.user_id,
            user_display_name: entity.user_display_name,
            // Stored values come from the closed enums; fall back for rows
            // touched outside the application
            action_kind: entity
                .action_kind
                .parse::<AuditActionKind>()
                .unwrap_or(AuditActionKind::Other),
            action: entity.action,
            description: entity.description,
            severity: entity.severity.parse::<Severity>().unwrap_or(Severity::Info),
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            recorded_at: entity.recorded_at,
            extra_data: entity.extra_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = AuditEntryEntity {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            user_display_name: Some("Carlos Mendoza".to_string()),
            action_kind: "create_role".to_string(),
            action: "Creó rol Recepcionista".to_string(),
            description: Some("Permisos: view_clients".to_string()),
            severity: "info".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            recorded_at: Utc::now(),
            extra_data: Some(serde_json::json!({"roleId": "r-1"})),
        };

        let entry: AuditEntry = entity.into();
        assert_eq!(entry.action_kind, AuditActionKind::CreateRole);
        assert_eq!(entry.severity, Severity::Info);
        assert!(entry.extra_data.is_some());
    }

    #[test]
    fn test_unknown_stored_kind_falls_back_to_other() {
        let entity = AuditEntryEntity {
            id: Uuid::new_v4(),
            user_id: None,
            user_display_name: None,
            action_kind: "legacy_kind".to_string(),
            action: "?".to_string(),
            description: None,
            severity: "bogus".to_string(),
            ip_address: None,
            user_agent: None,
            recorded_at: Utc::now(),
            extra_data: None,
        };

        let entry: AuditEntry = entity.into();
        assert_eq!(entry.action_kind, AuditActionKind::Other);
        assert_eq!(entry.severity, Severity::Info);
    }
}
