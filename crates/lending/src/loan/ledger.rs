//! Ordered ledger of loan records.

use chrono::{DateTime, Utc};
use common::{ActorId, ItemId};

use super::LoanRecord;

/// Loan records in insertion order.
///
/// Records are appended when loans open and are only ever replaced in place
/// when a partial return splits them. Admission checks happen before a loan
/// reaches the ledger; the ledger only records facts.
#[derive(Debug, Clone, Default)]
pub struct LoanLedger {
    records: Vec<LoanRecord>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new open loan and returns it.
    pub fn open(
        &mut self,
        actor_id: ActorId,
        item_id: ItemId,
        item_name: impl Into<String>,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> &LoanRecord {
        let index = self.records.len();
        self.records
            .push(LoanRecord::open(actor_id, item_id, item_name, quantity, now));
        &self.records[index]
    }

    /// Sum of open quantities held by `actor_id` for `item_id`.
    pub fn outstanding_for(&self, actor_id: &ActorId, item_id: ItemId) -> u32 {
        self.records
            .iter()
            .filter(|r| r.is_open_claim(actor_id, item_id))
            .map(LoanRecord::quantity)
            .sum()
    }

    /// True if `actor_id` holds any open loan for any item.
    pub fn has_any_open(&self, actor_id: &ActorId) -> bool {
        self.records
            .iter()
            .any(|r| r.is_open() && r.actor_id().matches(actor_id))
    }

    /// Sum of open quantities for `item_id` across all actors.
    pub fn open_quantity_for_item(&self, item_id: ItemId) -> u32 {
        self.records
            .iter()
            .filter(|r| r.is_open() && r.item_id() == item_id)
            .map(LoanRecord::quantity)
            .sum()
    }

    /// Closes `quantity` units of the actor's open loans for an item.
    ///
    /// Open records are matched most recent first. A record that fits within
    /// the remaining amount is closed whole; the first record larger than the
    /// remaining amount is split into a closed fragment followed by an open
    /// remainder at the same position. Returns the amount actually closed,
    /// which is less than `quantity` only if the caller asked for more than
    /// is outstanding.
    pub fn close(
        &mut self,
        actor_id: &ActorId,
        item_id: ItemId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> u32 {
        let mut remaining = quantity;

        for index in (0..self.records.len()).rev() {
            if remaining == 0 {
                break;
            }
            if !self.records[index].is_open_claim(actor_id, item_id) {
                continue;
            }

            let record_qty = self.records[index].quantity();
            if record_qty <= remaining {
                self.records[index].close(now);
                remaining -= record_qty;
            } else {
                let record = self.records.remove(index);
                let (closed, open) = record.split(remaining, now);
                self.records.insert(index, open);
                self.records.insert(index, closed);
                remaining = 0;
            }
        }

        quantity - remaining
    }

    pub fn list_all(&self) -> Vec<&LoanRecord> {
        self.records.iter().collect()
    }

    pub fn list_open(&self) -> Vec<&LoanRecord> {
        self.records.iter().filter(|r| r.is_open()).collect()
    }

    /// Records of one actor, open and closed, ignoring case.
    pub fn list_by_actor(&self, actor_id: &ActorId) -> Vec<&LoanRecord> {
        self.records
            .iter()
            .filter(|r| r.actor_id().matches(actor_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
