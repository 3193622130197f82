//! Client entity.

use chrono::{DateTime, Utc};
use domain::models::{Client, ExperienceLevel};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for gym clients.
#[derive(Debug, Clone, FromRow)]
pub struct ClientEntity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,
    pub experience: String,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<ClientEntity> for Client {
    fn from(entity: ClientEntity) -> Self {
        Client {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            phone: entity.phone,
            weight_kg: entity.weight_kg,
            height_m: entity.height_m,
            experience: entity
                .experience
                .parse::<ExperienceLevel>()
                .unwrap_or(ExperienceLevel::Beginner),
            registered_at: entity.registered_at,
            is_active: entity.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = ClientEntity {
            id: Uuid::new_v4(),
            first_name: "María".to_string(),
            last_name: "Quispe".to_string(),
            phone: Some("71234567".to_string()),
            weight_kg: Some(62.5),
            height_m: Some(1.6),
            experience: "intermediate".to_string(),
            registered_at: Utc::now(),
            is_active: true,
        };

        let client: Client = entity.into();
        assert_eq!(client.experience, ExperienceLevel::Intermediate);
        assert_eq!(client.full_name(), "María Quispe");
    }
}
