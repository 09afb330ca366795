//! /products handlers.

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

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CrudService::list(&state.pool, &state.model.products).await?;
    Ok(Json(rows))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let row = CrudService::read(&state.pool, &state.model.products, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.products;
    let body = RequestValidator::validate(&body_to_map(body)?, &entity.validation)?;
    let row = CrudService::create(&state.pool, entity, &body).await?;
    Ok(created("New product added successfully!", &entity.pk_column, &row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let entity = &state.model.products;
    let id = parse_id(&id)?;
    let body = RequestValidator::validate_partial(&body_to_map(body)?, &entity.validation)?;
    CrudService::update(&state.pool, entity, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(message(format!("Product with ID {} updated successfully", id)))
}

/// A product still linked to orders cannot be deleted (409).
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CrudService::delete(&state.pool, &state.model.products, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {} doesn't exist!", id)))?;
    Ok(message("Product deleted successfully!"))
}
