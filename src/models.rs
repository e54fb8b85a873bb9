use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    lifecycle::OrderStatus,
};

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Exactly one of manager/attendant at any time; the enum makes the
/// exclusivity structural instead of a pair of booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Occupation {
    Manager,
    Attendant,
}

impl Occupation {
    pub fn as_str(self) -> &'static str {
        match self {
            Occupation::Manager => "manager",
            Occupation::Attendant => "attendant",
        }
    }

    /// Registration boundary: both flags set is a bad request, neither set
    /// defaults to attendant.
    pub fn from_flags(manager: Option<bool>, attendant: Option<bool>) -> Result<Self, AppError> {
        match (manager.unwrap_or(false), attendant.unwrap_or(false)) {
            (true, true) => Err(AppError::BadRequest(
                "EMPLOYEE_MUST_HAVE_ONLY_ONE_ROLE".into(),
            )),
            (true, false) => Ok(Occupation::Manager),
            (false, _) => Ok(Occupation::Attendant),
        }
    }

    /// Occupation-change boundary: exactly one flag must be set.
    pub fn from_exclusive_flags(
        manager: Option<bool>,
        attendant: Option<bool>,
    ) -> Result<Self, AppError> {
        match (manager.unwrap_or(false), attendant.unwrap_or(false)) {
            (true, false) => Ok(Occupation::Manager),
            (false, true) => Ok(Occupation::Attendant),
            _ => Err(AppError::BadRequest(
                "EMPLOYEE_MUST_HAVE_ONLY_ONE_ROLE".into(),
            )),
        }
    }
}

impl TryFrom<String> for Occupation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "manager" => Ok(Occupation::Manager),
            "attendant" => Ok(Occupation::Attendant),
            other => Err(format!("unknown occupation {other:?}")),
        }
    }
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(skip)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub occupation: Occupation,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// Aggregate of the line snapshots; null until creation finishes pricing.
    pub price_cents: Option<i64>,
    pub requisition_date: NaiveDate,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price at order time times quantity; never re-derived.
    pub price_cents: i64,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct PasswordReset {
    pub id: Uuid,
    pub token: String,
    pub customer_id: Uuid,
    pub requisition_date: DateTime<Utc>,
    pub utilized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_defaults_to_attendant() {
        assert_eq!(
            Occupation::from_flags(None, None).unwrap(),
            Occupation::Attendant
        );
        assert_eq!(
            Occupation::from_flags(Some(false), None).unwrap(),
            Occupation::Attendant
        );
        assert_eq!(
            Occupation::from_flags(Some(true), None).unwrap(),
            Occupation::Manager
        );
    }

    #[test]
    fn both_roles_rejected() {
        assert!(Occupation::from_flags(Some(true), Some(true)).is_err());
        assert!(Occupation::from_exclusive_flags(Some(true), Some(true)).is_err());
        assert!(Occupation::from_exclusive_flags(None, None).is_err());
    }

    #[test]
    fn occupation_round_trips_storage_form() {
        for occupation in [Occupation::Manager, Occupation::Attendant] {
            assert_eq!(
                Occupation::try_from(occupation.as_str().to_string()).unwrap(),
                occupation
            );
        }
    }
}
