//! /orders handlers. Order bodies carry product ids under `product_id` (create)
//! or `products` (update); either key is accepted on both, `products` wins if both are sent.

use super::{body_to_map, parse_id};
use crate::error::AppError;
use crate::response::{created, message};
use crate::service::{integer_list, OrderService, RequestValidator};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

const NOT_FOUND: &str = "Order Not Found";

fn product_ids(body: &HashMap<String, Value>) -> Option<Vec<i64>> {
    integer_list(body, "products").or_else(|| integer_list(body, "product_id"))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = OrderService::list(&state.pool, &state.model).await?;
    Ok(Json(rows))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let row = OrderService::read(&state.pool, &state.model, id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(row))
}

/// Unknown product ids are skipped, not rejected.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.orders;
    let body = RequestValidator::validate(&body_to_map(body)?, &entity.validation)?;
    let ids = product_ids(&body).unwrap_or_default();
    let row = OrderService::create(&state.pool, &state.model, &body, &ids).await?;
    Ok(created("Order added successfully!", &entity.pk_column, &row))
}

/// Unknown product ids fail the whole update with 404.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let body = RequestValidator::validate_partial(&body_to_map(body)?, &state.model.orders.validation)?;
    let ids = product_ids(&body);
    OrderService::update(&state.pool, &state.model, id, &body, ids.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(message("Order was successfully updated!"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    OrderService::delete(&state.pool, &state.model, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order with ID {} doesn't exist!", id)))?;
    Ok(message("Order deleted successfully!"))
}
