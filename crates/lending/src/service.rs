//! Lending service providing the borrow and return use cases.

use std::sync::Arc;

use chrono::Utc;
use common::{ActorId, ItemId};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::error::{DomainError, Result};
use crate::item::ensure_positive;
use crate::loan::LoanLedger;
use crate::policy::LendingPolicy;
use crate::view::{ItemView, LoanView, TransactionFilter};

/// Outcome of a successful borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowReceipt {
    /// The loan record that was opened.
    pub loan: LoanView,
    /// Item counts after the debit.
    pub item: ItemView,
}

/// Outcome of a successful return.
///
/// `accepted` can be lower than `requested` when over-return capping is on;
/// callers should surface that difference rather than assume everything
/// requested was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnReceipt {
    pub item: ItemView,
    pub requested: u32,
    pub accepted: u32,
    /// Amount the actor owed for the item before this return.
    pub owed: u32,
}

impl ReturnReceipt {
    /// True if part of the requested quantity was not accepted.
    pub fn is_capped(&self) -> bool {
        self.requested > self.accepted
    }

    /// Amount still owed after this return.
    pub fn still_owed(&self) -> u32 {
        self.owed - self.accepted
    }
}

#[derive(Debug, Default)]
struct LendingState {
    catalog: Catalog,
    ledger: LoanLedger,
}

/// Entry point for catalog maintenance and lending.
///
/// All mutations go through a single lock around the catalog and the ledger,
/// so an availability check and the ledger write that follows it are never
/// interleaved with another borrow or return. Cloning the service shares the
/// same state.
#[derive(Debug, Clone, Default)]
pub struct LoanService {
    state: Arc<RwLock<LendingState>>,
    policy: LendingPolicy,
}

impl LoanService {
    /// Creates an empty service with the given policy.
    pub fn new(policy: LendingPolicy) -> Self {
        Self {
            state: Arc::new(RwLock::new(LendingState::default())),
            policy,
        }
    }

    pub fn policy(&self) -> LendingPolicy {
        self.policy
    }

    // -- Catalog --

    /// Adds stock by name, merging into an existing record with the same
    /// name. Returns the item and whether it was merged.
    #[tracing::instrument(skip(self))]
    pub async fn add_or_increase(&self, name: &str, quantity: u32) -> Result<(ItemView, bool)> {
        let mut state = self.state.write().await;
        let outcome = state
            .catalog
            .add_or_increase(name, quantity)
            .map_err(rejected)?;
        let item = state
            .catalog
            .find_by_id(outcome.item_id)
            .map(ItemView::from)
            .ok_or(DomainError::NotFound {
                item_id: outcome.item_id,
            })?;

        if outcome.merged {
            metrics::counter!("catalog_items_merged_total").increment(1);
            tracing::info!(item_id = %item.id, quantity, total = item.total, "stock merged into existing item");
        } else {
            metrics::counter!("catalog_items_created_total").increment(1);
            tracing::info!(item_id = %item.id, name = %item.name, quantity, "item created");
        }

        Ok((item, outcome.merged))
    }

    /// Removes stock from an item without touching units on loan.
    #[tracing::instrument(skip(self))]
    pub async fn reduce_quantity(&self, item_id: ItemId, quantity: u32) -> Result<ItemView> {
        let mut state = self.state.write().await;
        let item = state
            .catalog
            .reduce_quantity(item_id, quantity)
            .map(ItemView::from)
            .map_err(rejected)?;
        tracing::info!(%item_id, quantity, total = item.total, "stock reduced");
        Ok(item)
    }

    /// Deletes an item that has no units on loan.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, item_id: ItemId) -> Result<ItemView> {
        let mut state = self.state.write().await;
        let removed = state.catalog.remove(item_id).map_err(rejected)?;
        tracing::info!(%item_id, name = removed.name(), "item removed");
        Ok(ItemView::from(&removed))
    }

    pub async fn find_item(&self, item_id: ItemId) -> Result<ItemView> {
        let state = self.state.read().await;
        state
            .catalog
            .find_by_id(item_id)
            .map(ItemView::from)
            .ok_or(DomainError::NotFound { item_id })
    }

    /// Case-insensitive name search, in insertion order.
    pub async fn search(&self, keyword: &str) -> Vec<ItemView> {
        let state = self.state.read().await;
        state
            .catalog
            .search_by_name(keyword)
            .into_iter()
            .map(ItemView::from)
            .collect()
    }

    pub async fn list_items(&self) -> Vec<ItemView> {
        let state = self.state.read().await;
        state
            .catalog
            .list_all()
            .into_iter()
            .map(ItemView::from)
            .collect()
    }

    // -- Lending --

    /// Lends `quantity` units of an item to an actor.
    #[tracing::instrument(skip(self), fields(actor = %actor_id))]
    pub async fn borrow(
        &self,
        actor_id: &ActorId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<BorrowReceipt> {
        ensure_actor(actor_id).map_err(rejected)?;
        ensure_positive(quantity).map_err(rejected)?;

        let mut state = self.state.write().await;
        let state = &mut *state;

        if self.policy.exclusive_loans && state.ledger.has_any_open(actor_id) {
            return Err(rejected(DomainError::policy(
                "must return outstanding items first",
            )));
        }

        let item = state
            .catalog
            .find_by_id_mut(item_id)
            .ok_or(DomainError::NotFound { item_id })
            .map_err(rejected)?;

        if !item.borrow(quantity) {
            return Err(rejected(DomainError::InsufficientStock {
                item_id,
                requested: quantity,
                available: item.available(),
            }));
        }

        let item = ItemView::from(&*item);
        let loan = LoanView::from(state.ledger.open(
            actor_id.clone(),
            item_id,
            item.name.clone(),
            quantity,
            Utc::now(),
        ));

        metrics::counter!("lending_borrows_total").increment(1);
        tracing::info!(%item_id, quantity, available = item.available, "loan opened");

        Ok(BorrowReceipt { loan, item })
    }

    /// Returns units of an item borrowed by an actor.
    ///
    /// Loans are closed most recent first. A request above what the actor
    /// owes is capped to the owed amount, or rejected when the policy
    /// disables capping.
    #[tracing::instrument(skip(self), fields(actor = %actor_id))]
    pub async fn return_items(
        &self,
        actor_id: &ActorId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<ReturnReceipt> {
        ensure_actor(actor_id).map_err(rejected)?;
        ensure_positive(quantity).map_err(rejected)?;

        let mut state = self.state.write().await;
        let state = &mut *state;

        let item = state
            .catalog
            .find_by_id_mut(item_id)
            .ok_or(DomainError::NotFound { item_id })
            .map_err(rejected)?;

        let owed = state.ledger.outstanding_for(actor_id, item_id);
        if owed == 0 {
            return Err(rejected(DomainError::NothingToReturn {
                actor_id: actor_id.clone(),
                item_id,
            }));
        }
        if quantity > owed && !self.policy.cap_over_returns {
            return Err(rejected(DomainError::ExceedsOutstanding {
                requested: quantity,
                owed,
            }));
        }

        let accepted = quantity.min(owed);
        item.give_back(accepted).map_err(rejected)?;
        let closed = state.ledger.close(actor_id, item_id, accepted, Utc::now());
        debug_assert_eq!(closed, accepted);

        metrics::counter!("lending_returns_total").increment(1);
        if accepted < quantity {
            metrics::counter!("lending_over_returns_capped_total").increment(1);
            tracing::warn!(%item_id, requested = quantity, accepted, owed, "over-return capped");
        } else {
            tracing::info!(%item_id, accepted, owed, "loan returned");
        }

        Ok(ReturnReceipt {
            item: ItemView::from(&*item),
            requested: quantity,
            accepted,
            owed,
        })
    }

    /// Amount `actor_id` currently owes for `item_id`.
    pub async fn outstanding_for(&self, actor_id: &ActorId, item_id: ItemId) -> u32 {
        self.state
            .read()
            .await
            .ledger
            .outstanding_for(actor_id, item_id)
    }

    /// Lists loan records in ledger order.
    pub async fn list_transactions(&self, filter: TransactionFilter) -> Vec<LoanView> {
        let state = self.state.read().await;
        let records = match &filter {
            TransactionFilter::All => state.ledger.list_all(),
            TransactionFilter::ByActor(actor_id) => state.ledger.list_by_actor(actor_id),
            TransactionFilter::OpenOnly => state.ledger.list_open(),
        };
        records.into_iter().map(LoanView::from).collect()
    }

    /// Checks that, for every item, the open loan quantities add up to the
    /// item's borrowed count and no open loan references a missing item.
    pub async fn verify_consistency(&self) -> Result<()> {
        let state = self.state.read().await;
        for item in state.catalog.list_all() {
            let open = state.ledger.open_quantity_for_item(item.id());
            if open != item.borrowed() {
                return Err(DomainError::invalid_state(format!(
                    "{}: open loans {open} != borrowed {}",
                    item.id(),
                    item.borrowed()
                )));
            }
        }
        if let Some(orphan) = state
            .ledger
            .list_open()
            .into_iter()
            .find(|loan| state.catalog.find_by_id(loan.item_id()).is_none())
        {
            return Err(DomainError::invalid_state(format!(
                "open loan {} references missing item {}",
                orphan.id(),
                orphan.item_id()
            )));
        }
        Ok(())
    }
}

fn ensure_actor(actor_id: &ActorId) -> Result<()> {
    if actor_id.is_blank() {
        return Err(DomainError::invalid_argument("actor id is required"));
    }
    Ok(())
}

/// Records a rejected request before handing the error back.
fn rejected(err: DomainError) -> DomainError {
    metrics::counter!("lending_rejections_total", "reason" => err.reason()).increment(1);
    if err.is_business_outcome() {
        tracing::warn!(error = %err, "request rejected");
    } else {
        tracing::debug!(error = %err, "request failed");
    }
    err
}
