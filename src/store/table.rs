use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Entity, EntityKind};
use crate::validation::ValidationError;

/// Rows of one entity keyed by id, plus the index backing its unique column.
pub struct Table<T> {
    rows: DashMap<Uuid, T>,
    unique: DashMap<String, Uuid>,
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            unique: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.rows.contains_key(id)
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.rows.get(id).map(|entry| entry.value().clone())
    }

    pub fn get_unique(&self, key: &str) -> Option<T> {
        let id = *self.unique.get(key)?;
        self.get(&id)
    }

    pub fn insert(&self, row: T) -> Result<(), AppError> {
        let id = row.id();
        let key = row.unique_key();

        let mut claimed = false;
        if let Some((field, value)) = &key {
            claimed = self.claim(field, value.clone(), id)?;
        }

        match self.rows.entry(id) {
            Entry::Occupied(_) => {
                if let (true, Some((_, value))) = (claimed, key) {
                    self.release(&value, id);
                }
                Err(AppError::Conflict(format!("{} {id} already exists", T::KIND)))
            }
            Entry::Vacant(slot) => {
                slot.insert(row);
                Ok(())
            }
        }
    }

    /// Overwrites an existing row, moving its unique key if it changed.
    pub fn replace(&self, row: T) -> Result<(), AppError> {
        let id = row.id();
        let previous = self
            .get(&id)
            .ok_or_else(|| AppError::not_found(T::KIND, id))?;

        let old_key = previous.unique_key();
        let new_key = row.unique_key();
        if old_key != new_key {
            if let Some((field, value)) = &new_key {
                self.claim(field, value.clone(), id)?;
            }
            if let Some((_, value)) = old_key {
                self.release(&value, id);
            }
        }

        self.rows.insert(id, row);
        Ok(())
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        let (_, row) = self.rows.remove(id)?;
        if let Some((_, value)) = row.unique_key() {
            self.release(&value, *id);
        }
        Some(row)
    }

    /// Removes every row matching `predicate` and returns them.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let ids: Vec<Uuid> = self
            .rows
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        ids.iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Matching rows ordered by id.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.id());
        rows
    }

    /// One page of matching rows plus the total number of matches.
    pub fn page(&self, predicate: impl Fn(&T) -> bool, skip: usize, limit: usize) -> (Vec<T>, usize) {
        let rows = self.find(predicate);
        let total = rows.len();
        (rows.into_iter().skip(skip).take(limit).collect(), total)
    }

    /// Field of the first row holding a foreign key to `target`/`id`.
    pub fn first_referrer(&self, target: EntityKind, id: Uuid) -> Option<&'static str> {
        self.rows.iter().find_map(|entry| {
            entry
                .value()
                .references()
                .into_iter()
                .find(|fk| fk.target == target && fk.id == id)
                .map(|fk| fk.field)
        })
    }

    /// Reserves `value` for `id`; `true` when the reservation is new.
    fn claim(&self, field: &str, value: String, id: Uuid) -> Result<bool, AppError> {
        match self.unique.entry(value) {
            Entry::Occupied(owner) if *owner.get() != id => Err(ValidationError::unique(field).into()),
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(true)
            }
        }
    }

    fn release(&self, value: &str, id: Uuid) {
        self.unique.remove_if(value, |_, owner| *owner == id);
    }
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}
