//! A single loan transaction.

use chrono::{DateTime, Utc};
use common::{ActorId, ItemId, LoanId};
use serde::{Deserialize, Serialize};

/// Whether a loan record still represents unreturned units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// No return timestamp yet.
    Open,
    /// Returned; the record is never mutated again.
    Closed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "Open",
            LoanStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A claim of `quantity` units of one item by one actor.
///
/// While open, `quantity` is the amount still outstanding. A partial return
/// splits the record instead of shrinking it, so closed records always show
/// exactly what was returned and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanRecord {
    id: LoanId,
    actor_id: ActorId,
    item_id: ItemId,
    /// Item name captured when the loan was opened.
    item_name: String,
    quantity: u32,
    borrowed_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
}

impl LoanRecord {
    pub(crate) fn open(
        actor_id: ActorId,
        item_id: ItemId,
        item_name: impl Into<String>,
        quantity: u32,
        borrowed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LoanId::new(),
            actor_id,
            item_id,
            item_name: item_name.into(),
            quantity,
            borrowed_at,
            returned_at: None,
        }
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn borrowed_at(&self) -> DateTime<Utc> {
        self.borrowed_at
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn status(&self) -> LoanStatus {
        if self.is_open() {
            LoanStatus::Open
        } else {
            LoanStatus::Closed
        }
    }

    /// True for an open record held by `actor_id` (ignoring case) for `item_id`.
    pub(crate) fn is_open_claim(&self, actor_id: &ActorId, item_id: ItemId) -> bool {
        self.is_open() && self.item_id == item_id && self.actor_id.matches(actor_id)
    }

    pub(crate) fn close(&mut self, at: DateTime<Utc>) {
        debug_assert!(self.is_open(), "closed loan records are immutable");
        self.returned_at = Some(at);
    }

    /// Splits an open record into a closed fragment of `returned` units and
    /// an open remainder. Both keep the original borrow timestamp; the
    /// remainder keeps the original id.
    ///
    /// Requires `0 < returned < quantity`.
    pub(crate) fn split(self, returned: u32, at: DateTime<Utc>) -> (LoanRecord, LoanRecord) {
        debug_assert!(returned > 0 && returned < self.quantity);
        let closed = LoanRecord {
            id: LoanId::new(),
            actor_id: self.actor_id.clone(),
            item_id: self.item_id,
            item_name: self.item_name.clone(),
            quantity: returned,
            borrowed_at: self.borrowed_at,
            returned_at: Some(at),
        };
        let remainder = LoanRecord {
            quantity: self.quantity - returned,
            ..self
        };
        (closed, remainder)
    }
}
