//! Permission domain models and the closed permission-code table.
//!
//! Handlers never carry permission string literals: each protected action
//! resolves its required code through [`PermissionCode::for_action`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Closed enumeration of permission codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCode {
    ViewUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ManageAdmins,
    ManageInstructors,
    ViewRoles,
    ManageRoles,
    DeleteRole,
    ViewPermissions,
    AssignPermissions,
    ViewAuditLog,
    ViewClients,
    ManageClients,
    DeleteClient,
    ViewPlans,
    ManagePlans,
    ViewPromotions,
    ManagePromotions,
    ViewEnrollments,
    ManageEnrollments,
    ViewMemberships,
    ManageMemberships,
    ViewDashboard,
}

/// Resources protected by permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Role,
    Permission,
    AuditLog,
    Client,
    Plan,
    Promotion,
    Enrollment,
    Membership,
    Dashboard,
}

/// Actions a handler can perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl PermissionCode {
    /// Lookup table mapping (resource, action) to the required code.
    ///
    /// This is the single place where protected actions are bound to
    /// permission codes.
    pub fn for_action(resource: Resource, action: Action) -> PermissionCode {
        use Action::*;
        use Resource::*;

        match (resource, action) {
            (User, View) => PermissionCode::ViewUsers,
            (User, Create) => PermissionCode::CreateUser,
            (User, Update) => PermissionCode::UpdateUser,
            (User, Delete) => PermissionCode::DeleteUser,

            (Role, View) => PermissionCode::ViewRoles,
            (Role, Create) | (Role, Update) => PermissionCode::ManageRoles,
            (Role, Delete) => PermissionCode::DeleteRole,

            (Permission, View) => PermissionCode::ViewPermissions,
            (Permission, Create) | (Permission, Update) | (Permission, Delete) => {
                PermissionCode::AssignPermissions
            }

            (AuditLog, _) => PermissionCode::ViewAuditLog,

            (Client, View) => PermissionCode::ViewClients,
            (Client, Create) | (Client, Update) => PermissionCode::ManageClients,
            (Client, Delete) => PermissionCode::DeleteClient,

            (Plan, View) => PermissionCode::ViewPlans,
            (Plan, _) => PermissionCode::ManagePlans,

            (Promotion, View) => PermissionCode::ViewPromotions,
            (Promotion, _) => PermissionCode::ManagePromotions,

            (Enrollment, View) => PermissionCode::ViewEnrollments,
            (Enrollment, _) => PermissionCode::ManageEnrollments,

            (Membership, View) => PermissionCode::ViewMemberships,
            (Membership, _) => PermissionCode::ManageMemberships,

            (Dashboard, _) => PermissionCode::ViewDashboard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCode::ViewUsers => "view_users",
            PermissionCode::CreateUser => "create_user",
            PermissionCode::UpdateUser => "update_user",
            PermissionCode::DeleteUser => "delete_user",
            PermissionCode::ManageAdmins => "manage_admins",
            PermissionCode::ManageInstructors => "manage_instructors",
            PermissionCode::ViewRoles => "view_roles",
            PermissionCode::ManageRoles => "manage_roles",
            PermissionCode::DeleteRole => "delete_role",
            PermissionCode::ViewPermissions => "view_permissions",
            PermissionCode::AssignPermissions => "assign_permissions",
            PermissionCode::ViewAuditLog => "view_audit_log",
            PermissionCode::ViewClients => "view_clients",
            PermissionCode::ManageClients => "manage_clients",
            PermissionCode::DeleteClient => "delete_client",
            PermissionCode::ViewPlans => "view_plans",
            PermissionCode::ManagePlans => "manage_plans",
            PermissionCode::ViewPromotions => "view_promotions",
            PermissionCode::ManagePromotions => "manage_promotions",
            PermissionCode::ViewEnrollments => "view_enrollments",
            PermissionCode::ManageEnrollments => "manage_enrollments",
            PermissionCode::ViewMemberships => "view_memberships",
            PermissionCode::ManageMemberships => "manage_memberships",
            PermissionCode::ViewDashboard => "view_dashboard",
        }
    }
}

impl FromStr for PermissionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view_users" => Ok(PermissionCode::ViewUsers),
            "create_user" => Ok(PermissionCode::CreateUser),
            "update_user" => Ok(PermissionCode::UpdateUser),
            "delete_user" => Ok(PermissionCode::DeleteUser),
            "manage_admins" => Ok(PermissionCode::ManageAdmins),
            "manage_instructors" => Ok(PermissionCode::ManageInstructors),
            "view_roles" => Ok(PermissionCode::ViewRoles),
            "manage_roles" => Ok(PermissionCode::ManageRoles),
            "delete_role" => Ok(PermissionCode::DeleteRole),
            "view_permissions" => Ok(PermissionCode::ViewPermissions),
            "assign_permissions" => Ok(PermissionCode::AssignPermissions),
            "view_audit_log" => Ok(PermissionCode::ViewAuditLog),
            "view_clients" => Ok(PermissionCode::ViewClients),
            "manage_clients" => Ok(PermissionCode::ManageClients),
            "delete_client" => Ok(PermissionCode::DeleteClient),
            "view_plans" => Ok(PermissionCode::ViewPlans),
            "manage_plans" => Ok(PermissionCode::ManagePlans),
            "view_promotions" => Ok(PermissionCode::ViewPromotions),
            "manage_promotions" => Ok(PermissionCode::ManagePromotions),
            "view_enrollments" => Ok(PermissionCode::ViewEnrollments),
            "manage_enrollments" => Ok(PermissionCode::ManageEnrollments),
            "view_memberships" => Ok(PermissionCode::ViewMemberships),
            "manage_memberships" => Ok(PermissionCode::ManageMemberships),
            "view_dashboard" => Ok(PermissionCode::ViewDashboard),
            _ => Err(format!("Unknown permission code: {}", s)),
        }
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A permission row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub code: PermissionCode,
    pub name: String,
    pub description: Option<String>,
}

/// Request body for creating a permission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    /// Permission code; must be one of the closed set
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Request body for updating a permission's display fields.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_code_roundtrip() {
        for code in [
            PermissionCode::ViewUsers,
            PermissionCode::ManageRoles,
            PermissionCode::ViewAuditLog,
            PermissionCode::ManageMemberships,
            PermissionCode::ViewDashboard,
        ] {
            assert_eq!(PermissionCode::from_str(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn test_permission_code_unknown_rejected() {
        assert!(PermissionCode::from_str("fly_to_the_moon").is_err());
        assert!(PermissionCode::from_str("").is_err());
    }

    #[test]
    fn test_for_action_table() {
        assert_eq!(
            PermissionCode::for_action(Resource::Role, Action::Create),
            PermissionCode::ManageRoles
        );
        assert_eq!(
            PermissionCode::for_action(Resource::Role, Action::Delete),
            PermissionCode::DeleteRole
        );
        assert_eq!(
            PermissionCode::for_action(Resource::Client, Action::Delete),
            PermissionCode::DeleteClient
        );
        assert_eq!(
            PermissionCode::for_action(Resource::AuditLog, Action::View),
            PermissionCode::ViewAuditLog
        );
        assert_eq!(
            PermissionCode::for_action(Resource::Membership, Action::Update),
            PermissionCode::ManageMemberships
        );
    }

    #[test]
    fn test_permission_code_serde_snake_case() {
        let json = serde_json::to_string(&PermissionCode::ViewAuditLog).unwrap();
        assert_eq!(json, "\"view_audit_log\"");
    }
}
