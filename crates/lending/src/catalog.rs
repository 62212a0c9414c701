//! In-memory catalog of item records.

use std::collections::BTreeMap;

use common::ItemId;

use crate::error::{DomainError, Result};
use crate::item::{ItemRecord, ensure_positive};

/// First identifier handed out by a fresh catalog.
pub const FIRST_ITEM_ID: ItemId = ItemId::new(1001);

/// Result of [`Catalog::add_or_increase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub item_id: ItemId,
    /// True when the quantity was added to an existing record with the same name.
    pub merged: bool,
}

/// Item records keyed by id.
///
/// Ids are allocated in increasing order, so iterating the map yields
/// records in insertion order.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: BTreeMap<ItemId, ItemRecord>,
    next_id: ItemId,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: FIRST_ITEM_ID,
        }
    }

    /// Adds stock by name.
    ///
    /// Item identity is the name compared case-insensitively: if a record
    /// already carries the name, its quantity is increased instead of a new
    /// record being created.
    pub fn add_or_increase(&mut self, name: &str, quantity: u32) -> Result<AddOutcome> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("name is required"));
        }
        ensure_positive(quantity)?;

        if let Some(id) = self.find_by_name_exact(name).map(ItemRecord::id)
            && let Some(existing) = self.items.get_mut(&id)
        {
            existing.add_quantity(quantity)?;
            return Ok(AddOutcome {
                item_id: id,
                merged: true,
            });
        }

        let id = self.next_id;
        let record = ItemRecord::new(id, name, quantity)?;
        self.next_id = id.next();
        self.items.insert(id, record);
        Ok(AddOutcome {
            item_id: id,
            merged: false,
        })
    }

    pub fn find_by_id(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: ItemId) -> Option<&mut ItemRecord> {
        self.items.get_mut(&id)
    }

    /// Case-insensitive exact name lookup. Surrounding whitespace is ignored.
    pub fn find_by_name_exact(&self, name: &str) -> Option<&ItemRecord> {
        let key = name.trim().to_lowercase();
        self.items
            .values()
            .find(|item| item.name().to_lowercase() == key)
    }

    /// Case-insensitive substring search, in insertion order.
    pub fn search_by_name(&self, keyword: &str) -> Vec<&ItemRecord> {
        let key = keyword.to_lowercase();
        self.items
            .values()
            .filter(|item| item.name().to_lowercase().contains(&key))
            .collect()
    }

    /// All records in insertion order.
    pub fn list_all(&self) -> Vec<&ItemRecord> {
        self.items.values().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes stock from an existing record.
    pub fn reduce_quantity(&mut self, id: ItemId, quantity: u32) -> Result<&ItemRecord> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(DomainError::NotFound { item_id: id })?;
        item.remove_quantity(quantity)?;
        Ok(item)
    }

    /// Deletes a record. Refused while any of its units are lent out.
    pub fn remove(&mut self, id: ItemId) -> Result<ItemRecord> {
        let item = self
            .items
            .get(&id)
            .ok_or(DomainError::NotFound { item_id: id })?;
        if item.borrowed() > 0 {
            return Err(DomainError::invalid_state(format!(
                "{id} still has {} units on loan",
                item.borrowed()
            )));
        }
        self.items
            .remove(&id)
            .ok_or(DomainError::NotFound { item_id: id })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
