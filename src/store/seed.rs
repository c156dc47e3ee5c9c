use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::{
    Address, Delivery, DeliveryCompany, Driver, Feedback, Item, Order, PackageItem, Payment,
    Promotion, User, Vehicle,
};
use crate::store::{Store, Stored};
use crate::validation;

/// A bundle of complete records, keyed by table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<User>,
    pub items: Vec<Item>,
    pub addresses: Vec<Address>,
    pub delivery_companies: Vec<DeliveryCompany>,
    pub orders: Vec<Order>,
    pub package_items: Vec<PackageItem>,
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub deliveries: Vec<Delivery>,
    pub payments: Vec<Payment>,
    pub feedback: Vec<Feedback>,
    pub promotions: Vec<Promotion>,
}

impl Seed {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        validation::parse_json(raw, "invalid seed")
    }

    pub fn len(&self) -> usize {
        self.users.len()
            + self.items.len()
            + self.addresses.len()
            + self.delivery_companies.len()
            + self.orders.len()
            + self.package_items.len()
            + self.vehicles.len()
            + self.drivers.len()
            + self.deliveries.len()
            + self.payments.len()
            + self.feedback.len()
            + self.promotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store {
    /// Inserts every record of `seed`, parents before children, stopping at
    /// the first rejected record. Returns the number of records inserted.
    pub fn import(&self, seed: Seed) -> Result<usize, AppError> {
        let mut inserted = 0;

        inserted += self.insert_all(seed.users)?;
        inserted += self.insert_all(seed.items)?;
        inserted += self.insert_all(seed.addresses)?;
        inserted += self.insert_all(seed.delivery_companies)?;
        inserted += self.insert_all(seed.orders)?;
        inserted += self.insert_all(seed.package_items)?;
        inserted += self.insert_all(seed.vehicles)?;
        inserted += self.insert_all(seed.drivers)?;
        inserted += self.insert_all(seed.deliveries)?;
        inserted += self.insert_all(seed.payments)?;
        inserted += self.insert_all(seed.feedback)?;
        inserted += self.insert_all(seed.promotions)?;

        info!(inserted, "seed imported");
        Ok(inserted)
    }

    fn insert_all<T: Stored>(&self, rows: Vec<T>) -> Result<usize, AppError> {
        let count = rows.len();
        for row in rows {
            self.insert(row)?;
        }
        Ok(count)
    }
}
