//! Read-only snapshots handed to callers.

use chrono::{DateTime, Utc};
use common::{ActorId, ItemId, LoanId};
use serde::{Deserialize, Serialize};

use crate::item::ItemRecord;
use crate::loan::{LoanRecord, LoanStatus};

/// Snapshot of an item's stock counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub total: u32,
    pub available: u32,
    pub borrowed: u32,
}

impl From<&ItemRecord> for ItemView {
    fn from(item: &ItemRecord) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            total: item.total(),
            available: item.available(),
            borrowed: item.borrowed(),
        }
    }
}

/// Snapshot of one loan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: u32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl From<&LoanRecord> for LoanView {
    fn from(loan: &LoanRecord) -> Self {
        Self {
            id: loan.id(),
            actor_id: loan.actor_id().clone(),
            item_id: loan.item_id(),
            item_name: loan.item_name().to_string(),
            quantity: loan.quantity(),
            borrowed_at: loan.borrowed_at(),
            returned_at: loan.returned_at(),
            status: loan.status(),
        }
    }
}

/// Which loan records to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionFilter {
    #[default]
    All,
    ByActor(ActorId),
    OpenOnly,
}
