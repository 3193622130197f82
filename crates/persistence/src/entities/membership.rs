//! Enrollment and membership entities.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{
    AppliedPromotion, Enrollment, Membership, MembershipStatus, PaymentMethod,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for enrollments.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub amount: f64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl From<EnrollmentEntity> for Enrollment {
    fn from(entity: EnrollmentEntity) -> Self {
        Enrollment {
            id: entity.id,
            client_id: entity.client_id,
            amount: entity.amount,
            payment_method: entity
                .payment_method
                .parse::<PaymentMethod>()
                .unwrap_or(PaymentMethod::Cash),
            created_at: entity.created_at,
        }
    }
}

/// Database entity for memberships.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipEntity {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub plan_id: Uuid,
    pub registered_by: Option<Uuid>,
    pub status: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl From<MembershipEntity> for Membership {
    fn from(entity: MembershipEntity) -> Self {
        Membership {
            id: entity.id,
            enrollment_id: entity.enrollment_id,
            plan_id: entity.plan_id,
            registered_by: entity.registered_by,
            status: entity
                .status
                .parse::<MembershipStatus>()
                .unwrap_or(MembershipStatus::Active),
            starts_on: entity.starts_on,
            ends_on: entity.ends_on,
        }
    }
}

/// Row for a promotion applied to a membership (join with promotions).
#[derive(Debug, Clone, FromRow)]
pub struct AppliedPromotionEntity {
    pub id: Uuid,
    pub name: String,
    pub discount_percent: f64,
    pub applied_at: DateTime<Utc>,
}

impl From<AppliedPromotionEntity> for AppliedPromotion {
    fn from(entity: AppliedPromotionEntity) -> Self {
        AppliedPromotion {
            id: entity.id,
            name: entity.name,
            discount_percent: entity.discount_percent,
            applied_at: entity.applied_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_entity_to_domain() {
        let entity = EnrollmentEntity {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            amount: 250.0,
            payment_method: "qr".to_string(),
            created_at: Utc::now(),
        };

        let enrollment: Enrollment = entity.into();
        assert_eq!(enrollment.payment_method, PaymentMethod::Qr);
    }

    #[test]
    fn test_membership_entity_to_domain() {
        let entity = MembershipEntity {
            id: Uuid::new_v4(),
            enrollment_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            registered_by: None,
            status: "suspended".to_string(),
            starts_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };

        let membership: Membership = entity.into();
        assert_eq!(membership.status, MembershipStatus::Suspended);
    }
}
