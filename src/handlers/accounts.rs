//! /customeraccounts handlers.
//!
//! Passwords are stored and returned exactly as received.

use super::{body_to_map, parse_id};
use crate::error::AppError;
use crate::response::{created, message};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

const NOT_FOUND: &str = "Customer Account not found";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CrudService::list(&state.pool, &state.model.customer_accounts).await?;
    Ok(Json(rows))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let row = CrudService::read(&state.pool, &state.model.customer_accounts, id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(row))
}

/// A taken username or a customer that already has an account is a 409.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.customer_accounts;
    let body = RequestValidator::validate(&body_to_map(body)?, &entity.validation)?;
    let row = CrudService::create(&state.pool, entity, &body).await?;
    Ok(created("New Customer Account successfully added!", &entity.pk_column, &row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.customer_accounts;
    let id = parse_id(&id)?;
    let body = RequestValidator::validate_partial(&body_to_map(body)?, &entity.validation)?;
    CrudService::update(&state.pool, entity, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(message("Customer Account details updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CrudService::delete(&state.pool, &state.model.customer_accounts, id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(message("Customer Account successfully deleted"))
}
