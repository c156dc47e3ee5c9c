use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{default_true, Entity, EntityKind, ForeignKey};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Driver {
    pub id: Uuid,
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(length(max = 20))]
    pub phone_number: String,
    #[validate(length(max = 50))]
    pub license_number: String,
    pub assigned_vehicle_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub availability: bool,
    #[validate(length(max = 255))]
    pub current_location: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(create: DriverCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        check(Self {
            id: Uuid::new_v4(),
            name: create.name,
            phone_number: create.phone_number,
            license_number: create.license_number,
            assigned_vehicle_id: create.assigned_vehicle_id,
            availability: create.availability,
            current_location: create.current_location,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Driver {
    const KIND: EntityKind = EntityKind::Driver;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        self.assigned_vehicle_id
            .map(|id| ForeignKey::new("assigned_vehicle_id", EntityKind::Vehicle, id))
            .into_iter()
            .collect()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCreate {
    pub name: String,
    pub phone_number: String,
    pub license_number: String,
    pub assigned_vehicle_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub availability: bool,
    pub current_location: Option<String>,
}
