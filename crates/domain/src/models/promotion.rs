//! Promotion domain models.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::{validate_date_range, validate_discount};

/// Administrative status of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Active,
    Inactive,
    Expired,
}

impl PromotionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::Active => "active",
            PromotionStatus::Inactive => "inactive",
            PromotionStatus::Expired => "expired",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            PromotionStatus::Active => "Activa",
            PromotionStatus::Inactive => "Inactiva",
            PromotionStatus::Expired => "Vencida",
        }
    }
}

impl FromStr for PromotionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PromotionStatus::Active),
            "inactive" => Ok(PromotionStatus::Inactive),
            "expired" => Ok(PromotionStatus::Expired),
            _ => Err(format!("Unknown promotion status: {}", s)),
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-bounded discount applicable to memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub duration_months: i32,
    pub discount_percent: f64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: PromotionStatus,
}

impl Promotion {
    /// A promotion is applicable when its status is active and today falls
    /// inside its date window.
    pub fn is_active_now(&self) -> bool {
        let today = Utc::now().date_naive();
        self.status == PromotionStatus::Active && self.starts_on <= today && today <= self.ends_on
    }
}

/// External representation of a promotion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResponse {
    #[serde(flatten)]
    pub promotion: Promotion,
    pub status_display: String,
    pub is_active_now: bool,
}

impl From<Promotion> for PromotionResponse {
    fn from(promotion: Promotion) -> Self {
        Self {
            status_display: promotion.status.display().to_string(),
            is_active_now: promotion.is_active_now(),
            promotion,
        }
    }
}

/// Request body for creating a promotion.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_promotion_dates"))]
pub struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 1, message = "Duration must be at least 1 month"))]
    pub duration_months: i32,

    #[validate(custom(function = "validate_discount"))]
    pub discount_percent: f64,

    pub starts_on: NaiveDate,

    pub ends_on: NaiveDate,

    pub status: PromotionStatus,
}

fn validate_promotion_dates(request: &CreatePromotionRequest) -> Result<(), ValidationError> {
    validate_date_range(request.starts_on, request.ends_on)
}

/// Request body for updating a promotion.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromotionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Duration must be at least 1 month"))]
    pub duration_months: Option<i32>,

    #[validate(custom(function = "validate_discount"))]
    pub discount_percent: Option<f64>,

    pub starts_on: Option<NaiveDate>,

    pub ends_on: Option<NaiveDate>,

    pub status: Option<PromotionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_request() -> CreatePromotionRequest {
        CreatePromotionRequest {
            name: "Verano 2x1".to_string(),
            duration_months: 2,
            discount_percent: 25.0,
            starts_on: date(2024, 5, 1),
            ends_on: date(2024, 6, 1),
            status: PromotionStatus::Active,
        }
    }

    #[test]
    fn test_create_promotion_valid() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn test_create_promotion_inverted_dates_rejected() {
        let mut request = sample_request();
        request.starts_on = date(2024, 6, 1);
        request.ends_on = date(2024, 5, 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_promotion_equal_dates_rejected() {
        let mut request = sample_request();
        request.ends_on = request.starts_on;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_promotion_discount_out_of_range() {
        let mut request = sample_request();
        request.discount_percent = 0.0;
        assert!(request.validate().is_err());
        request.discount_percent = 120.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_is_active_now_respects_status() {
        let today = Utc::now().date_naive();
        let promotion = Promotion {
            id: Uuid::new_v4(),
            name: "Prueba".to_string(),
            duration_months: 1,
            discount_percent: 10.0,
            starts_on: today - chrono::Duration::days(1),
            ends_on: today + chrono::Duration::days(1),
            status: PromotionStatus::Inactive,
        };
        assert!(!promotion.is_active_now());

        let active = Promotion {
            status: PromotionStatus::Active,
            ..promotion
        };
        assert!(active.is_active_now());
    }

    #[test]
    fn test_is_active_now_respects_window() {
        let today = Utc::now().date_naive();
        let past = Promotion {
            id: Uuid::new_v4(),
            name: "Vencida".to_string(),
            duration_months: 1,
            discount_percent: 10.0,
            starts_on: today - chrono::Duration::days(30),
            ends_on: today - chrono::Duration::days(10),
            status: PromotionStatus::Active,
        };
        assert!(!past.is_active_now());
    }
}
