//! Item stock record.

use common::ItemId;

use crate::error::{DomainError, Result};

/// Stock counts for one borrowable item.
///
/// Invariant: `available <= total`. The lent-out amount is derived as
/// `total - available`, so `total` can never drop below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    id: ItemId,
    name: String,
    total: u32,
    available: u32,
}

impl ItemRecord {
    /// Creates a record with all units available. The name is trimmed.
    pub fn new(id: ItemId, name: impl AsRef<str>, quantity: u32) -> Result<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(DomainError::invalid_argument("name is required"));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            total: quantity,
            available: quantity,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// Units currently lent out.
    pub fn borrowed(&self) -> u32 {
        self.total - self.available
    }

    /// Adds new stock, increasing both total and available.
    pub fn add_quantity(&mut self, quantity: u32) -> Result<()> {
        ensure_positive(quantity)?;
        let total = self
            .total
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invalid_argument("quantity overflows item total"))?;
        self.total = total;
        self.available += quantity;
        Ok(())
    }

    /// Removes stock without touching what is lent out.
    ///
    /// Fails with `InvalidState` if the new total would fall below the
    /// borrowed amount; the record is left unchanged in that case.
    pub fn remove_quantity(&mut self, quantity: u32) -> Result<()> {
        ensure_positive(quantity)?;
        if quantity > self.total {
            return Err(DomainError::invalid_argument(format!(
                "cannot remove {quantity} from {} with total {}",
                self.id, self.total
            )));
        }
        let borrowed = self.borrowed();
        let new_total = self.total - quantity;
        if new_total < borrowed {
            return Err(DomainError::invalid_state(format!(
                "removing {quantity} from {} would leave total {new_total} below borrowed {borrowed}",
                self.id
            )));
        }
        self.total = new_total;
        self.available = new_total - borrowed;
        Ok(())
    }

    /// Debits `quantity` from available stock.
    ///
    /// Returns false without mutating when the quantity is zero or exceeds
    /// what is available.
    pub fn borrow(&mut self, quantity: u32) -> bool {
        if quantity == 0 || quantity > self.available {
            return false;
        }
        self.available -= quantity;
        true
    }

    /// Credits returned units back to available stock.
    pub fn give_back(&mut self, quantity: u32) -> Result<()> {
        ensure_positive(quantity)?;
        if quantity > self.borrowed() {
            return Err(DomainError::invalid_state(format!(
                "returning {quantity} to {} exceeds borrowed {}",
                self.id,
                self.borrowed()
            )));
        }
        self.available += quantity;
        Ok(())
    }
}

impl std::fmt::Display for ItemRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (total={}, available={})",
            self.id, self.name, self.total, self.available
        )
    }
}

pub(crate) fn ensure_positive(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(DomainError::invalid_argument(
            "quantity must be greater than 0",
        ));
    }
    Ok(())
}
