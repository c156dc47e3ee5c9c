use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    pub id: Uuid,
    #[validate(length(max = 255))]
    pub street: String,
    #[validate(length(max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[validate(length(max = 100))]
    pub country: String,
    #[validate(
        range(min = -90.0, max = 90.0),
        custom(function = "crate::validation::finite")
    )]
    pub latitude: Option<f64>,
    #[validate(
        range(min = -180.0, max = 180.0),
        custom(function = "crate::validation::finite")
    )]
    pub longitude: Option<f64>,
}

impl Address {
    pub fn new(create: AddressCreate) -> Result<Self, ValidationError> {
        check(Self {
            id: Uuid::new_v4(),
            street: create.street,
            city: create.city,
            state: create.state,
            postal_code: create.postal_code,
            country: create.country,
            latitude: create.latitude,
            longitude: create.longitude,
        })
    }
}

impl Entity for Address {
    const KIND: EntityKind = EntityKind::Address;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressCreate {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
