//! Enrollment and membership domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::{validate_amount, validate_date_range};

/// Payment method used for an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Qr,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Qr => "qr",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Card => "Tarjeta",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Qr => "QR",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "transfer" => Ok(PaymentMethod::Transfer),
            "qr" => Ok(PaymentMethod::Qr),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Suspended,
    Expired,
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Suspended => "suspended",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Cancelled => "cancelled",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "Activa",
            MembershipStatus::Suspended => "Suspendida",
            MembershipStatus::Expired => "Vencida",
            MembershipStatus::Cancelled => "Cancelada",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(MembershipStatus::Active),
            "suspended" => Ok(MembershipStatus::Suspended),
            "expired" => Ok(MembershipStatus::Expired),
            "cancelled" => Ok(MembershipStatus::Cancelled),
            _ => Err(format!("Unknown membership status: {}", s)),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment enrollment; each successful enrollment backs one membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// External representation of an enrollment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub client_name: String,
    pub payment_method_display: String,
}

/// A dated subscription instance tied to one enrollment and one plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub plan_id: Uuid,
    pub registered_by: Option<Uuid>,
    pub status: MembershipStatus,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl Membership {
    /// A membership is in effect when active and today is inside its window.
    pub fn is_active_now(&self) -> bool {
        let today = Utc::now().date_naive();
        self.status == MembershipStatus::Active && self.starts_on <= today && today <= self.ends_on
    }

    /// Days remaining until the end date; zero once past it.
    pub fn days_remaining(&self) -> i64 {
        let today = Utc::now().date_naive();
        (self.ends_on - today).num_days().max(0)
    }
}

/// A promotion applied to a membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotion {
    pub id: Uuid,
    pub name: String,
    pub discount_percent: f64,
    pub applied_at: DateTime<Utc>,
}

/// External representation of a membership.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    #[serde(flatten)]
    pub membership: Membership,
    pub client_name: String,
    pub plan_name: String,
    pub registered_by_username: Option<String>,
    pub status_display: String,
    pub is_active_now: bool,
    pub days_remaining: i64,
    pub promotions: Vec<AppliedPromotion>,
}

/// Request body for creating an enrollment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    pub cliente: Uuid,

    #[validate(custom(function = "validate_amount"))]
    pub amount: f64,

    pub payment_method: PaymentMethod,
}

/// Request body for creating a membership.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_membership_dates"))]
pub struct CreateMembershipRequest {
    pub inscripcion: Uuid,

    pub plan: Uuid,

    pub starts_on: NaiveDate,

    pub ends_on: NaiveDate,
}

fn validate_membership_dates(request: &CreateMembershipRequest) -> Result<(), ValidationError> {
    validate_date_range(request.starts_on, request.ends_on)
}

/// Request body for updating a membership.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipRequest {
    pub status: Option<MembershipStatus>,

    pub starts_on: Option<NaiveDate>,

    pub ends_on: Option<NaiveDate>,
}

/// Request body for applying a promotion to a membership.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPromotionRequest {
    pub promocion: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Transfer,
            PaymentMethod::Qr,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()).unwrap(), method);
        }
        assert!(PaymentMethod::from_str("barter").is_err());
    }

    #[test]
    fn test_membership_status_roundtrip() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::Suspended,
            MembershipStatus::Expired,
            MembershipStatus::Cancelled,
        ] {
            assert_eq!(MembershipStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_create_enrollment_amount_must_be_positive() {
        let request = CreateEnrollmentRequest {
            cliente: Uuid::new_v4(),
            amount: 0.0,
            payment_method: PaymentMethod::Cash,
        };
        assert!(request.validate().is_err());

        let request = CreateEnrollmentRequest {
            amount: 150.0,
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_membership_inverted_dates_rejected() {
        let request = CreateMembershipRequest {
            inscripcion: Uuid::new_v4(),
            plan: Uuid::new_v4(),
            starts_on: date(2024, 6, 1),
            ends_on: date(2024, 5, 1),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_days_remaining_never_negative() {
        let today = Utc::now().date_naive();
        let membership = Membership {
            id: Uuid::new_v4(),
            enrollment_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            registered_by: None,
            status: MembershipStatus::Active,
            starts_on: today - chrono::Duration::days(60),
            ends_on: today - chrono::Duration::days(30),
        };
        assert_eq!(membership.days_remaining(), 0);
        assert!(!membership.is_active_now());
    }

    #[test]
    fn test_is_active_now_in_window() {
        let today = Utc::now().date_naive();
        let membership = Membership {
            id: Uuid::new_v4(),
            enrollment_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            registered_by: None,
            status: MembershipStatus::Active,
            starts_on: today - chrono::Duration::days(5),
            ends_on: today + chrono::Duration::days(25),
        };
        assert!(membership.is_active_now());
        assert_eq!(membership.days_remaining(), 25);

        let suspended = Membership {
            status: MembershipStatus::Suspended,
            ..membership
        };
        assert!(!suspended.is_active_now());
    }
}
