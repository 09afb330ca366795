//! Orders and their product associations.
//!
//! Create and update disagree on unknown product ids: create attaches the
//! products it finds and skips the rest, update fails the whole request.

use crate::config::ResolvedModel;
use crate::error::AppError;
use crate::service::CrudService;
use crate::sql::{
    delete_associations, insert_association, select_associations_in, select_by_id, select_by_id_for_update,
};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use std::collections::{BTreeMap, HashMap};

/// Key under which an order's product ids are embedded in responses.
pub const PRODUCTS_KEY: &str = "products";

pub struct OrderService;

impl OrderService {
    /// Every order with its product ids.
    pub async fn list(pool: &PgPool, model: &ResolvedModel) -> Result<Vec<Value>, AppError> {
        let mut orders = CrudService::list(pool, &model.orders).await?;
        let ids: Vec<i64> = orders.iter().filter_map(|o| order_id(model, o)).collect();
        let pairs = CrudService::fetch_all(pool, &select_associations_in(&model.order_products, &ids)).await?;

        let assoc = &model.order_products;
        let mut by_order: BTreeMap<i64, Vec<Value>> = BTreeMap::new();
        for pair in &pairs {
            if let (Some(o), Some(p)) = (
                pair.get(&assoc.left_column).and_then(Value::as_i64),
                pair.get(&assoc.right_column).cloned(),
            ) {
                by_order.entry(o).or_default().push(p);
            }
        }
        for order in &mut orders {
            let products = order_id(model, order)
                .and_then(|id| by_order.remove(&id))
                .unwrap_or_default();
            if let Value::Object(map) = order {
                map.insert(PRODUCTS_KEY.into(), Value::Array(products));
            }
        }
        Ok(orders)
    }

    /// One order with its product ids, or None.
    pub async fn read(pool: &PgPool, model: &ResolvedModel, id: i64) -> Result<Option<Value>, AppError> {
        let Some(mut order) = CrudService::read(pool, &model.orders, id).await? else {
            return Ok(None);
        };
        let products = product_ids(pool, model, id).await?;
        if let Value::Object(map) = &mut order {
            map.insert(PRODUCTS_KEY.into(), Value::Array(products.into_iter().map(Value::from).collect()));
        }
        Ok(Some(order))
    }

    /// Insert the order and attach each existing product once. Unknown product ids are
    /// skipped and logged. Returns the stored order row.
    pub async fn create(
        pool: &PgPool,
        model: &ResolvedModel,
        body: &HashMap<String, Value>,
        product_ids: &[i64],
    ) -> Result<Value, AppError> {
        let mut tx = pool.begin().await?;
        let row = CrudService::create(&mut *tx, &model.orders, body).await?;
        let id = order_id(model, &row).ok_or(AppError::Db(sqlx::Error::RowNotFound))?;

        let mut skipped = Vec::new();
        for &pid in &dedup(product_ids) {
            if product_exists(&mut tx, model, pid).await? {
                CrudService::execute(&mut *tx, &insert_association(&model.order_products, id, pid)).await?;
            } else {
                skipped.push(pid);
            }
        }
        tx.commit().await?;

        if !skipped.is_empty() {
            tracing::warn!(order_id = id, skipped = ?skipped, "order created without unknown products");
        }
        Ok(row)
    }

    /// Overwrite the supplied order fields and, when `product_ids` is given, replace the
    /// association set. An unknown product id rolls back everything and yields NotFound.
    /// Returns None when the order does not exist.
    pub async fn update(
        pool: &PgPool,
        model: &ResolvedModel,
        id: i64,
        body: &HashMap<String, Value>,
        product_ids: Option<&[i64]>,
    ) -> Result<Option<Value>, AppError> {
        let mut tx = pool.begin().await?;
        if CrudService::fetch_optional(&mut *tx, &select_by_id_for_update(&model.orders, id))
            .await?
            .is_none()
        {
            return Ok(None);
        }
        let row = CrudService::update(&mut *tx, &model.orders, id, body).await?;

        if let Some(ids) = product_ids {
            CrudService::execute(&mut *tx, &delete_associations(&model.order_products, id)).await?;
            for &pid in &dedup(ids) {
                if !product_exists(&mut tx, model, pid).await? {
                    return Err(AppError::NotFound(format!("Product with ID {} not found", pid)));
                }
                CrudService::execute(&mut *tx, &insert_association(&model.order_products, id, pid)).await?;
            }
        }
        tx.commit().await?;
        Ok(row)
    }

    /// Delete the order's association rows, then the order. Returns None if it did not exist.
    pub async fn delete(pool: &PgPool, model: &ResolvedModel, id: i64) -> Result<Option<Value>, AppError> {
        let mut tx = pool.begin().await?;
        if CrudService::fetch_optional(&mut *tx, &select_by_id_for_update(&model.orders, id))
            .await?
            .is_none()
        {
            return Ok(None);
        }
        CrudService::execute(&mut *tx, &delete_associations(&model.order_products, id)).await?;
        let row = CrudService::delete(&mut *tx, &model.orders, id).await?;
        tx.commit().await?;
        Ok(row)
    }
}

async fn product_ids(pool: &PgPool, model: &ResolvedModel, id: i64) -> Result<Vec<i64>, AppError> {
    let assoc = &model.order_products;
    let pairs = CrudService::fetch_all(pool, &select_associations_in(assoc, &[id])).await?;
    Ok(pairs
        .iter()
        .filter_map(|p| p.get(&assoc.right_column).and_then(Value::as_i64))
        .collect())
}

async fn product_exists(conn: &mut PgConnection, model: &ResolvedModel, id: i64) -> Result<bool, AppError> {
    Ok(CrudService::fetch_optional(conn, &select_by_id(&model.products, id))
        .await?
        .is_some())
}

fn order_id(model: &ResolvedModel, row: &Value) -> Option<i64> {
    row.get(&model.orders.pk_column).and_then(Value::as_i64)
}

/// Drop repeated ids, keeping first occurrence order.
fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
