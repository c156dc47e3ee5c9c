use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind, ForeignKey, OrderStatus};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
    pub id: Uuid,
    #[validate(length(max = 255))]
    pub customer_name: String,
    #[validate(email, length(max = 255))]
    pub customer_email: String,
    pub sender_address_id: Uuid,
    pub recipient_address_id: Uuid,
    pub status: OrderStatus,
    pub total_weight: Option<f64>,
    pub total_price: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(create: OrderCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        check(Self {
            id: Uuid::new_v4(),
            customer_name: create.customer_name,
            customer_email: create.customer_email,
            sender_address_id: create.sender_address_id,
            recipient_address_id: create.recipient_address_id,
            status: create.status,
            total_weight: create.total_weight,
            total_price: create.total_price,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new("sender_address_id", EntityKind::Address, self.sender_address_id),
            ForeignKey::new(
                "recipient_address_id",
                EntityKind::Address,
                self.recipient_address_id,
            ),
        ]
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_name: String,
    pub customer_email: String,
    pub sender_address_id: Uuid,
    pub recipient_address_id: Uuid,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_weight: Option<f64>,
    pub total_price: f64,
}

/// One line of an order's parcel contents. Removed together with its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PackageItem {
    pub id: Uuid,
    pub order_id: Uuid,
    #[validate(length(max = 255))]
    pub description: String,
    pub weight: f64,
    #[validate(length(max = 50))]
    pub dimensions: String,
    pub quantity: u32,
}

impl PackageItem {
    pub fn new(create: PackageItemCreate) -> Result<Self, ValidationError> {
        check(Self {
            id: Uuid::new_v4(),
            order_id: create.order_id,
            description: create.description,
            weight: create.weight,
            dimensions: create.dimensions,
            quantity: create.quantity,
        })
    }
}

impl Entity for PackageItem {
    const KIND: EntityKind = EntityKind::PackageItem;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("order_id", EntityKind::Order, self.order_id)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageItemCreate {
    pub order_id: Uuid,
    pub description: String,
    pub weight: f64,
    pub dimensions: String,
    pub quantity: u32,
}
