use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{DeliveryStatus, Entity, EntityKind, ForeignKey};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub company_id: Uuid,
    pub pickup_address_id: Uuid,
    pub delivery_address_id: Uuid,
    pub status: DeliveryStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Delivery {
    pub fn new(create: DeliveryCreate) -> Result<Self, ValidationError> {
        check(Self {
            id: Uuid::new_v4(),
            order_id: create.order_id,
            driver_id: create.driver_id,
            vehicle_id: create.vehicle_id,
            company_id: create.company_id,
            pickup_address_id: create.pickup_address_id,
            delivery_address_id: create.delivery_address_id,
            status: create.status,
            started_at: None,
            delivered_at: None,
        })
    }
}

impl Entity for Delivery {
    const KIND: EntityKind = EntityKind::Delivery;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        let mut refs = vec![
            ForeignKey::new("order_id", EntityKind::Order, self.order_id),
            ForeignKey::new("company_id", EntityKind::DeliveryCompany, self.company_id),
            ForeignKey::new("pickup_address_id", EntityKind::Address, self.pickup_address_id),
            ForeignKey::new(
                "delivery_address_id",
                EntityKind::Address,
                self.delivery_address_id,
            ),
        ];
        if let Some(driver_id) = self.driver_id {
            refs.push(ForeignKey::new("driver_id", EntityKind::Driver, driver_id));
        }
        if let Some(vehicle_id) = self.vehicle_id {
            refs.push(ForeignKey::new("vehicle_id", EntityKind::Vehicle, vehicle_id));
        }
        refs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryCreate {
    pub order_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub company_id: Uuid,
    pub pickup_address_id: Uuid,
    pub delivery_address_id: Uuid,
    #[serde(default)]
    pub status: DeliveryStatus,
}
