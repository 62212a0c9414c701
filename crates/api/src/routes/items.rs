//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use lending::ItemView;
use serde::{Deserialize, Serialize};

use super::{AppState, parse_item_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct ReduceRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct AddItemResponse {
    pub item: ItemView,
    pub merged: bool,
}

// -- Handlers --

/// GET /items: list all items, or search by name with `?q=`.
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<ItemView>> {
    let items = match query.q.as_deref() {
        Some(keyword) => state.service.search(keyword).await,
        None => state.service.list_items().await,
    };
    Json(items)
}

/// POST /items: add stock by name, merging into an existing item.
#[tracing::instrument(skip(state, payload))]
pub async fn add(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddItemResponse>), ApiError> {
    let Json(req) = payload?;
    let (item, merged) = state
        .service
        .add_or_increase(&req.name, req.quantity)
        .await?;
    let status = if merged {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(AddItemResponse { item, merged })))
}

/// GET /items/:id: fetch one item.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let item_id = parse_item_id(&id)?;
    Ok(Json(state.service.find_item(item_id).await?))
}

/// POST /items/:id/reduce: remove stock that is not on loan.
#[tracing::instrument(skip(state, payload))]
pub async fn reduce(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ReduceRequest>, JsonRejection>,
) -> Result<Json<ItemView>, ApiError> {
    let Json(req) = payload?;
    let item_id = parse_item_id(&id)?;
    Ok(Json(
        state.service.reduce_quantity(item_id, req.quantity).await?,
    ))
}

/// DELETE /items/:id: delete an item with nothing on loan.
#[tracing::instrument(skip(state))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let item_id = parse_item_id(&id)?;
    Ok(Json(state.service.remove_item(item_id).await?))
}
