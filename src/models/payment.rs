use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind, ForeignKey, PaymentMethod, PaymentStatus};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(create: PaymentCreate) -> Result<Self, ValidationError> {
        check(Self {
            id: Uuid::new_v4(),
            order_id: create.order_id,
            amount: create.amount,
            payment_method: create.payment_method,
            payment_status: create.payment_status,
            created_at: Utc::now(),
        })
    }
}

impl Entity for Payment {
    const KIND: EntityKind = EntityKind::Payment;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("order_id", EntityKind::Order, self.order_id)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: Uuid,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}
