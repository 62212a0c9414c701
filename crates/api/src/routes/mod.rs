//! HTTP route handlers.

pub mod health;
pub mod items;
pub mod loans;
pub mod metrics;

use common::ItemId;
use lending::LoanService;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: LoanService,
}

pub(crate) fn parse_item_id(id: &str) -> Result<ItemId, ApiError> {
    id.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .map(ItemId::new)
        .map_err(|e| ApiError::BadRequest(format!("Invalid item id '{id}': {e}")))
}
