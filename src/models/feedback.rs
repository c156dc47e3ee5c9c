use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind, ForeignKey};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Feedback {
    pub id: Uuid,
    pub order_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(create: FeedbackCreate) -> Result<Self, ValidationError> {
        check(Self {
            id: Uuid::new_v4(),
            order_id: create.order_id,
            rating: create.rating,
            comment: create.comment,
            created_at: Utc::now(),
        })
    }
}

impl Entity for Feedback {
    const KIND: EntityKind = EntityKind::Feedback;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("order_id", EntityKind::Order, self.order_id)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCreate {
    pub order_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}
