pub mod seed;
pub mod table;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, ReferenceError};
use crate::models::user::PasswordHasher;
use crate::models::{
    Address, Delivery, DeliveryCompany, Driver, Entity, EntityKind, Feedback, Item, ItemCreate,
    ItemPublic, ItemUpdate, ItemsPublic, Order, PackageItem, Payment, Promotion, User, UserCreate,
    UserPublic, UserUpdate, UsersPublic, Vehicle,
};
use crate::observability::metrics::Metrics;
use crate::validation::check;

pub use seed::Seed;
pub use table::Table;

/// Entities that have a table in the [`Store`].
pub trait Stored: Entity {
    fn table(store: &Store) -> &Table<Self>;
}

/// In-memory persistence contract: primary keys, foreign-key integrity,
/// unique columns and the User→Item and Order→PackageItem cascades.
///
/// Each table is individually thread-safe; checks spanning several tables
/// are not transactional.
pub struct Store {
    users: Table<User>,
    items: Table<Item>,
    addresses: Table<Address>,
    companies: Table<DeliveryCompany>,
    orders: Table<Order>,
    package_items: Table<PackageItem>,
    vehicles: Table<Vehicle>,
    drivers: Table<Driver>,
    deliveries: Table<Delivery>,
    payments: Table<Payment>,
    feedback: Table<Feedback>,
    promotions: Table<Promotion>,
    max_page_size: usize,
    metrics: Metrics,
}

macro_rules! stored {
    ($($entity:ty => $table:ident),+ $(,)?) => {
        $(
            impl Stored for $entity {
                fn table(store: &Store) -> &Table<Self> {
                    &store.$table
                }
            }
        )+
    };
}

stored! {
    User => users,
    Item => items,
    Address => addresses,
    DeliveryCompany => companies,
    Order => orders,
    PackageItem => package_items,
    Vehicle => vehicles,
    Driver => drivers,
    Delivery => deliveries,
    Payment => payments,
    Feedback => feedback,
    Promotion => promotions,
}

impl Store {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            users: Table::new(),
            items: Table::new(),
            addresses: Table::new(),
            companies: Table::new(),
            orders: Table::new(),
            package_items: Table::new(),
            vehicles: Table::new(),
            drivers: Table::new(),
            deliveries: Table::new(),
            payments: Table::new(),
            feedback: Table::new(),
            promotions: Table::new(),
            max_page_size: max_page_size.max(1),
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::User => self.users.len(),
            EntityKind::Item => self.items.len(),
            EntityKind::Address => self.addresses.len(),
            EntityKind::DeliveryCompany => self.companies.len(),
            EntityKind::Order => self.orders.len(),
            EntityKind::PackageItem => self.package_items.len(),
            EntityKind::Vehicle => self.vehicles.len(),
            EntityKind::Driver => self.drivers.len(),
            EntityKind::Delivery => self.deliveries.len(),
            EntityKind::Payment => self.payments.len(),
            EntityKind::Feedback => self.feedback.len(),
            EntityKind::Promotion => self.promotions.len(),
        }
    }

    /// Records per table, in declaration order.
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        EntityKind::ALL
            .iter()
            .map(|kind| (*kind, self.len_of(*kind)))
            .collect()
    }

    pub fn exists(&self, kind: EntityKind, id: Uuid) -> bool {
        match kind {
            EntityKind::User => self.users.contains(&id),
            EntityKind::Item => self.items.contains(&id),
            EntityKind::Address => self.addresses.contains(&id),
            EntityKind::DeliveryCompany => self.companies.contains(&id),
            EntityKind::Order => self.orders.contains(&id),
            EntityKind::PackageItem => self.package_items.contains(&id),
            EntityKind::Vehicle => self.vehicles.contains(&id),
            EntityKind::Driver => self.drivers.contains(&id),
            EntityKind::Delivery => self.deliveries.contains(&id),
            EntityKind::Payment => self.payments.contains(&id),
            EntityKind::Feedback => self.feedback.contains(&id),
            EntityKind::Promotion => self.promotions.contains(&id),
        }
    }

    pub fn get<T: Stored>(&self, id: Uuid) -> Option<T> {
        T::table(self).get(&id)
    }

    pub fn contains<T: Stored>(&self, id: Uuid) -> bool {
        T::table(self).contains(&id)
    }

    /// Looks up a referenced record, failing when it is gone.
    pub fn resolve<T: Stored>(&self, id: Uuid) -> Result<T, AppError> {
        self.get(id).ok_or_else(|| AppError::not_found(T::KIND, id))
    }

    /// One page ordered by id, plus the table's total size.
    pub fn list<T: Stored>(&self, skip: usize, limit: usize) -> (Vec<T>, usize) {
        T::table(self).page(|_| true, skip, self.clamp(limit))
    }

    pub fn insert<T: Stored>(&self, row: T) -> Result<T, AppError> {
        let result = self.try_insert(row);
        self.tally(T::KIND, result)
    }

    fn try_insert<T: Stored>(&self, row: T) -> Result<T, AppError> {
        let row = check(row)?;
        self.check_references(&row)?;
        T::table(self).insert(row.clone())?;

        self.sync_gauge(T::KIND);
        debug!(table = %T::KIND, id = %row.id(), "record inserted");
        Ok(row)
    }

    /// Applies `mutate` to a copy of the record and persists it once it
    /// passes validation, reference and uniqueness checks again.
    pub fn update<T, F>(&self, id: Uuid, mutate: F) -> Result<T, AppError>
    where
        T: Stored,
        F: FnOnce(&mut T),
    {
        let result = self.try_update(id, mutate);
        self.tally(T::KIND, result)
    }

    fn try_update<T, F>(&self, id: Uuid, mutate: F) -> Result<T, AppError>
    where
        T: Stored,
        F: FnOnce(&mut T),
    {
        let mut row: T = self.resolve(id)?;
        mutate(&mut row);
        if row.id() != id {
            return Err(AppError::BadRequest(format!(
                "{} id cannot change from {id} to {}",
                T::KIND,
                row.id()
            )));
        }

        let mut row = check(row)?;
        self.check_references(&row)?;
        row.touch(Utc::now());
        T::table(self).replace(row.clone())?;

        debug!(table = %T::KIND, id = %id, "record updated");
        Ok(row)
    }

    /// Deletes a record and its cascade children, returning how many children
    /// went with it. Refused while any other record still points at it.
    pub fn delete<T: Stored>(&self, id: Uuid) -> Result<usize, AppError> {
        let result = self.try_delete::<T>(id);
        self.tally(T::KIND, result)
    }

    fn try_delete<T: Stored>(&self, id: Uuid) -> Result<usize, AppError> {
        if !self.contains::<T>(id) {
            return Err(AppError::not_found(T::KIND, id));
        }

        if let Some((table, field)) = self.find_referrer(T::KIND, id) {
            return Err(ReferenceError::Restricted {
                target: T::KIND,
                id,
                table,
                field,
            }
            .into());
        }

        let cascaded = match T::KIND.cascades_to() {
            Some(EntityKind::Item) => self.items.remove_where(|item| item.owner_id == id).len(),
            Some(EntityKind::PackageItem) => self
                .package_items
                .remove_where(|package| package.order_id == id)
                .len(),
            _ => 0,
        };

        T::table(self)
            .remove(&id)
            .ok_or_else(|| AppError::not_found(T::KIND, id))?;

        self.sync_gauge(T::KIND);
        if let Some(child) = T::KIND.cascades_to() {
            self.sync_gauge(child);
        }

        info!(table = %T::KIND, id = %id, cascaded, "record deleted");
        Ok(cascaded)
    }

    pub fn create_user(
        &self,
        create: UserCreate,
        hasher: &dyn PasswordHasher,
    ) -> Result<User, AppError> {
        let user = User::new(create, hasher).map_err(AppError::from);
        let user = self.tally(EntityKind::User, user)?;
        self.insert(user)
    }

    pub fn update_user(
        &self,
        id: Uuid,
        update: UserUpdate,
        hasher: &dyn PasswordHasher,
    ) -> Result<User, AppError> {
        let update = self.tally(EntityKind::User, check(update).map_err(AppError::from))?;
        self.update::<User, _>(id, |user| user.apply(update, hasher))
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users.get_unique(email)
    }

    pub fn list_users(&self, skip: usize, limit: usize) -> UsersPublic {
        let (users, count) = self.list::<User>(skip, limit);
        UsersPublic {
            data: users.iter().map(UserPublic::from).collect(),
            count,
        }
    }

    pub fn create_item(&self, owner_id: Uuid, create: ItemCreate) -> Result<Item, AppError> {
        let item = Item::new(owner_id, create).map_err(AppError::from);
        let item = self.tally(EntityKind::Item, item)?;
        self.insert(item)
    }

    pub fn update_item(&self, id: Uuid, update: ItemUpdate) -> Result<Item, AppError> {
        let update = self.tally(EntityKind::Item, check(update).map_err(AppError::from))?;
        self.update::<Item, _>(id, |item| item.apply(update))
    }

    /// Items page, optionally restricted to one owner; `count` covers every match.
    pub fn list_items(&self, owner_id: Option<Uuid>, skip: usize, limit: usize) -> ItemsPublic {
        let (items, count) = self.items.page(
            |item| owner_id.is_none_or(|owner| item.owner_id == owner),
            skip,
            self.clamp(limit),
        );
        ItemsPublic {
            data: items.iter().map(ItemPublic::from).collect(),
            count,
        }
    }

    pub fn items_of(&self, owner_id: Uuid) -> Vec<Item> {
        self.items.find(|item| item.owner_id == owner_id)
    }

    pub fn package_items_of(&self, order_id: Uuid) -> Vec<PackageItem> {
        self.package_items.find(|package| package.order_id == order_id)
    }

    fn check_references<T: Entity>(&self, row: &T) -> Result<(), ReferenceError> {
        for fk in row.references() {
            if !self.exists(fk.target, fk.id) {
                return Err(ReferenceError::Dangling {
                    table: T::KIND,
                    field: fk.field,
                    target: fk.target,
                    id: fk.id,
                });
            }
        }
        Ok(())
    }

    /// First non-cascading record pointing at `target`/`id`.
    fn find_referrer(&self, target: EntityKind, id: Uuid) -> Option<(EntityKind, &'static str)> {
        let skip = target.cascades_to();
        referrer_in(&self.items, skip, target, id)
            .or_else(|| referrer_in(&self.companies, skip, target, id))
            .or_else(|| referrer_in(&self.orders, skip, target, id))
            .or_else(|| referrer_in(&self.package_items, skip, target, id))
            .or_else(|| referrer_in(&self.drivers, skip, target, id))
            .or_else(|| referrer_in(&self.deliveries, skip, target, id))
            .or_else(|| referrer_in(&self.payments, skip, target, id))
            .or_else(|| referrer_in(&self.feedback, skip, target, id))
    }

    fn clamp(&self, limit: usize) -> usize {
        limit.min(self.max_page_size)
    }

    fn sync_gauge(&self, kind: EntityKind) {
        self.metrics
            .records
            .with_label_values(&[kind.table_name()])
            .set(self.len_of(kind) as i64);
    }

    fn tally<R>(&self, kind: EntityKind, result: Result<R, AppError>) -> Result<R, AppError> {
        if let Err(err) = &result {
            self.metrics
                .rejections_total
                .with_label_values(&[err.reason()])
                .inc();
            warn!(table = %kind, reason = err.reason(), error = %err, "write rejected");
        }
        result
    }
}

fn referrer_in<T: Entity>(
    table: &Table<T>,
    skip: Option<EntityKind>,
    target: EntityKind,
    id: Uuid,
) -> Option<(EntityKind, &'static str)> {
    if skip == Some(T::KIND) {
        return None;
    }
    table.first_referrer(target, id).map(|field| (T::KIND, field))
}
