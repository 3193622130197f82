//! Gym client domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_height, validate_phone, validate_weight};

/// Training experience level of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Principiante",
            ExperienceLevel::Intermediate => "Intermedio",
            ExperienceLevel::Advanced => "Avanzado",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            _ => Err(format!("Unknown experience level: {}", s)),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A gym client (member of the gym, not a staff user).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,
    pub experience: ExperienceLevel,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// External representation of a client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,
    pub experience: ExperienceLevel,
    pub experience_display: String,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            full_name: client.full_name(),
            experience_display: client.experience.display().to_string(),
            id: client.id,
            first_name: client.first_name,
            last_name: client.last_name,
            phone: client.phone,
            weight_kg: client.weight_kg,
            height_m: client.height_m,
            experience: client.experience,
            registered_at: client.registered_at,
            is_active: client.is_active,
        }
    }
}

/// An active membership summary attached to the client detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMembershipSummary {
    pub id: Uuid,
    pub plan: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub days_remaining: i64,
}

/// Detailed client view with membership information.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetailResponse {
    #[serde(flatten)]
    pub client: ClientResponse,
    pub active_memberships: Vec<ClientMembershipSummary>,
    pub total_enrollments: i64,
}

/// Request body for creating a client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_weight"))]
    pub weight_kg: Option<f64>,

    #[validate(custom(function = "validate_height"))]
    pub height_m: Option<f64>,

    pub experience: ExperienceLevel,
}

/// Request body for updating a client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_weight"))]
    pub weight_kg: Option<f64>,

    #[validate(custom(function = "validate_height"))]
    pub height_m: Option<f64>,

    pub experience: Option<ExperienceLevel>,

    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateClientRequest {
        CreateClientRequest {
            first_name: "María".to_string(),
            last_name: "Quispe".to_string(),
            phone: Some("71234567".to_string()),
            weight_kg: Some(80.0),
            height_m: Some(1.65),
            experience: ExperienceLevel::Beginner,
        }
    }

    #[test]
    fn test_create_client_request_valid() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn test_create_client_weight_out_of_range() {
        let mut request = sample_request();
        request.weight_kg = Some(600.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_client_height_out_of_range() {
        let mut request = sample_request();
        request.height_m = Some(3.2);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_client_optional_measurements() {
        let mut request = sample_request();
        request.weight_kg = None;
        request.height_m = None;
        request.phone = None;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_experience_level_roundtrip() {
        for level in [
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
        ] {
            assert_eq!(ExperienceLevel::from_str(level.as_str()).unwrap(), level);
        }
        assert!(ExperienceLevel::from_str("expert").is_err());
    }

    #[test]
    fn test_full_name() {
        let client = Client {
            id: Uuid::new_v4(),
            first_name: "María".to_string(),
            last_name: "Quispe".to_string(),
            phone: None,
            weight_kg: None,
            height_m: None,
            experience: ExperienceLevel::Beginner,
            registered_at: Utc::now(),
            is_active: true,
        };
        assert_eq!(client.full_name(), "María Quispe");
    }
}
