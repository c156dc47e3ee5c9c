use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind, ForeignKey};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DeliveryCompany {
    pub id: Uuid,
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone_number: String,
    pub headquarters_address_id: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl DeliveryCompany {
    pub fn new(create: DeliveryCompanyCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        check(Self {
            id: Uuid::new_v4(),
            name: create.name,
            email: create.email,
            phone_number: create.phone_number,
            headquarters_address_id: create.headquarters_address_id,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for DeliveryCompany {
    const KIND: EntityKind = EntityKind::DeliveryCompany;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new(
            "headquarters_address_id",
            EntityKind::Address,
            self.headquarters_address_id,
        )]
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryCompanyCreate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub headquarters_address_id: Uuid,
}
