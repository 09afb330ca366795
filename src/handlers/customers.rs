//! /customers handlers.

use super::{body_to_map, parse_id};
use crate::error::AppError;
use crate::response::{created, message};
use crate::service::{CrudService, CustomerService, RequestValidator};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

const NOT_FOUND: &str = "Customer not found";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CrudService::list(&state.pool, &state.model.customers).await?;
    Ok(Json(rows))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let row = CrudService::read(&state.pool, &state.model.customers, id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.customers;
    let body = RequestValidator::validate(&body_to_map(body)?, &entity.validation)?;
    let row = CrudService::create(&state.pool, entity, &body).await?;
    Ok(created("New Customer successfully added!", &entity.pk_column, &row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.customers;
    let id = parse_id(&id)?;
    let body = RequestValidator::validate_partial(&body_to_map(body)?, &entity.validation)?;
    CrudService::update(&state.pool, entity, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(message("Customer details updated successfully"))
}

/// Removes the customer together with its account, orders and their product links.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CustomerService::delete_cascade(&state.pool, &state.model, id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(message("Customer and all associated data removed successfully!"))
}
