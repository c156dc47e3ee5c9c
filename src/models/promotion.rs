use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Promotion {
    pub id: Uuid,
    #[validate(length(max = 50))]
    pub code: String,
    #[validate(
        range(min = 0.0, max = 100.0),
        custom(function = "crate::validation::finite")
    )]
    pub discount_percentage: f64,
    pub expiry_date: DateTime<Utc>,
    /// Comma-separated country names.
    #[validate(length(max = 1000))]
    pub applicable_countries: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    pub fn new(create: PromotionCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        check(Self {
            id: Uuid::new_v4(),
            code: create.code,
            discount_percentage: create.discount_percentage,
            expiry_date: create.expiry_date,
            applicable_countries: create.applicable_countries,
            created_at: now,
            updated_at: now,
        })
    }

    /// Entries of `applicable_countries`, trimmed, without blanks.
    pub fn countries(&self) -> Vec<&str> {
        self.applicable_countries
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|country| !country.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}

impl Entity for Promotion {
    const KIND: EntityKind = EntityKind::Promotion;

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub code: String,
    pub discount_percentage: f64,
    pub expiry_date: DateTime<Utc>,
    pub applicable_countries: Option<String>,
}
