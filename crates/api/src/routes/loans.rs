//! Borrow, return and transaction history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use common::{ActorId, ItemId};
use lending::{BorrowReceipt, ItemView, LoanView, TransactionFilter};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct LoanRequest {
    pub actor_id: String,
    pub item_id: u64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct TransactionQuery {
    pub actor: Option<String>,
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReturnResponse {
    pub item: ItemView,
    pub requested: u32,
    pub accepted: u32,
    pub owed: u32,
    pub capped: bool,
}

// -- Handlers --

/// POST /loans/borrow: lend units of an item to an actor.
#[tracing::instrument(skip(state, payload))]
pub async fn borrow(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BorrowReceipt>), ApiError> {
    let Json(req) = payload?;
    let actor_id = ActorId::new(req.actor_id);
    let receipt = state
        .service
        .borrow(&actor_id, ItemId::new(req.item_id), req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /loans/return: return units; over-returns report what was accepted.
#[tracing::instrument(skip(state, payload))]
pub async fn give_back(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> Result<Json<ReturnResponse>, ApiError> {
    let Json(req) = payload?;
    let actor_id = ActorId::new(req.actor_id);
    let receipt = state
        .service
        .return_items(&actor_id, ItemId::new(req.item_id), req.quantity)
        .await?;

    Ok(Json(ReturnResponse {
        capped: receipt.is_capped(),
        item: receipt.item,
        requested: receipt.requested,
        accepted: receipt.accepted,
        owed: receipt.owed,
    }))
}

/// GET /transactions: loan history, filtered by `?actor=` or `?status=open`.
#[tracing::instrument(skip(state, query))]
pub async fn transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<LoanView>>, ApiError> {
    let filter = transaction_filter(query)?;
    Ok(Json(state.service.list_transactions(filter).await))
}

fn transaction_filter(query: TransactionQuery) -> Result<TransactionFilter, ApiError> {
    if let Some(actor) = query.actor {
        return Ok(TransactionFilter::ByActor(ActorId::new(actor)));
    }
    match query.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("all") => Ok(TransactionFilter::All),
        Some("open") => Ok(TransactionFilter::OpenOnly),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid status filter '{other}': expected 'open' or 'all'"
        ))),
    }
}
