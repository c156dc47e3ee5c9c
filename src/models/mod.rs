pub mod address;
pub mod auth;
pub mod company;
pub mod delivery;
pub mod driver;
pub mod enums;
pub mod feedback;
pub mod item;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod user;
pub mod vehicle;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use address::{Address, AddressCreate};
pub use auth::{Message, NewPassword, Token, TokenPayload, UpdatePassword};
pub use company::{DeliveryCompany, DeliveryCompanyCreate};
pub use delivery::{Delivery, DeliveryCreate};
pub use driver::{Driver, DriverCreate};
pub use enums::{DeliveryStatus, OrderStatus, PaymentMethod, PaymentStatus, VehicleType};
pub use feedback::{Feedback, FeedbackCreate};
pub use item::{Item, ItemCreate, ItemPublic, ItemUpdate, ItemsPublic};
pub use order::{Order, OrderCreate, PackageItem, PackageItemCreate};
pub use payment::{Payment, PaymentCreate};
pub use promotion::{Promotion, PromotionCreate};
pub use user::{User, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe, UsersPublic};
pub use vehicle::{Vehicle, VehicleCreate};

/// Table an entity is persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Item,
    Address,
    DeliveryCompany,
    Order,
    PackageItem,
    Vehicle,
    Driver,
    Delivery,
    Payment,
    Feedback,
    Promotion,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::User,
        EntityKind::Item,
        EntityKind::Address,
        EntityKind::DeliveryCompany,
        EntityKind::Order,
        EntityKind::PackageItem,
        EntityKind::Vehicle,
        EntityKind::Driver,
        EntityKind::Delivery,
        EntityKind::Payment,
        EntityKind::Feedback,
        EntityKind::Promotion,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Item => "item",
            EntityKind::Address => "address",
            EntityKind::DeliveryCompany => "delivery_company",
            EntityKind::Order => "order",
            EntityKind::PackageItem => "package_item",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Driver => "driver",
            EntityKind::Delivery => "delivery",
            EntityKind::Payment => "payment",
            EntityKind::Feedback => "feedback",
            EntityKind::Promotion => "promotion",
        }
    }

    /// The child table removed together with a parent of this kind, if any.
    pub fn cascades_to(&self) -> Option<EntityKind> {
        match self {
            EntityKind::User => Some(EntityKind::Item),
            EntityKind::Order => Some(EntityKind::PackageItem),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A set foreign-key column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    pub target: EntityKind,
    pub id: Uuid,
}

impl ForeignKey {
    pub fn new(field: &'static str, target: EntityKind, id: Uuid) -> Self {
        Self { field, target, id }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// Patch field reader: absent stays `None`, explicit `null` becomes `Some(None)`.
/// Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub trait Entity: Clone + Validate + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Foreign keys that are currently set; unset optional references are omitted.
    fn references(&self) -> Vec<ForeignKey> {
        Vec::new()
    }

    /// Value that must be unique across the table, with the field it comes from.
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }

    /// Stamps `updated_at` on tables that track it.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}
