//! Generic CRUD execution against PostgreSQL.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::sql::{delete, insert, select_by_id, select_list, update, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgExecutor, PgPool, Postgres};
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// List every row ordered by primary key.
    pub async fn list(pool: &PgPool, entity: &ResolvedEntity) -> Result<Vec<Value>, AppError> {
        Self::fetch_all(pool, &select_list(entity)).await
    }

    /// Fetch one row by primary key. Returns JSON object or None.
    pub async fn read<'e, E: PgExecutor<'e>>(
        executor: E,
        entity: &ResolvedEntity,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        Self::fetch_optional(executor, &select_by_id(entity, id)).await
    }

    /// Insert one row; the primary key is generated. Returns created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        entity: &ResolvedEntity,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        Self::fetch_optional(executor, &insert(entity, body))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Overwrite the supplied columns of one row. Returns the updated row, or None if absent.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        entity: &ResolvedEntity,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        Self::fetch_optional(executor, &update(entity, id, body)).await
    }

    /// Delete one row by id. Returns deleted row or None.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        entity: &ResolvedEntity,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        Self::fetch_optional(executor, &delete(entity, id)).await
    }

    pub(crate) async fn fetch_optional<'e, E: PgExecutor<'e>>(
        executor: E,
        q: &QueryBuf,
    ) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(executor).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    pub(crate) async fn fetch_all<'e, E: PgExecutor<'e>>(
        executor: E,
        q: &QueryBuf,
    ) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(executor).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Execute a statement without result rows. Returns the number of rows affected.
    pub(crate) async fn execute<'e, E: PgExecutor<'e>>(executor: E, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = bind_all(q).execute(executor).await?;
        Ok(done.rows_affected())
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    Value::Null
}
