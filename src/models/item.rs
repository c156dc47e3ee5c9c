use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Entity, EntityKind, ForeignKey};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Item {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl Item {
    pub fn new(owner_id: Uuid, create: ItemCreate) -> Result<Self, ValidationError> {
        let create = check(create)?;
        check(Self {
            id: Uuid::new_v4(),
            title: create.title,
            description: create.description,
            owner_id,
        })
    }

    pub fn apply(&mut self, update: ItemUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
    }
}

impl Entity for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn id(&self) -> Uuid {
        self.id
    }

    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("owner_id", EntityKind::User, self.owner_id)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemCreate {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ItemUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(
        default,
        deserialize_with = "crate::models::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 255))]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPublic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl From<&Item> for ItemPublic {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            owner_id: item.owner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPublic {
    pub data: Vec<ItemPublic>,
    pub count: usize,
}
