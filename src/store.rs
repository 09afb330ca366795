//! Database bootstrap: create the database if missing and the tables if missing.
//! Foreign keys carry no ON DELETE action; cascades run in the services' transactions.

use crate::config::{CUSTOMERS_TABLE, CUSTOMER_ACCOUNTS_TABLE, ORDERS_TABLE, ORDER_PRODUCT_TABLE, PRODUCTS_TABLE};
use crate::error::{AppError, ConfigError};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// DDL in dependency order.
fn table_ddl() -> [String; 5] {
    [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {customers} (
                customer_id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(320) NOT NULL,
                phone VARCHAR(15)
            )
            "#,
            customers = CUSTOMERS_TABLE
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {accounts} (
                account_id BIGSERIAL PRIMARY KEY,
                username VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                customer_id BIGINT NOT NULL UNIQUE REFERENCES {customers} (customer_id)
            )
            "#,
            accounts = CUSTOMER_ACCOUNTS_TABLE,
            customers = CUSTOMERS_TABLE
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {products} (
                product_id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                price DOUBLE PRECISION NOT NULL
            )
            "#,
            products = PRODUCTS_TABLE
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {orders} (
                order_id BIGSERIAL PRIMARY KEY,
                date DATE NOT NULL,
                customer_id BIGINT NOT NULL REFERENCES {customers} (customer_id)
            )
            "#,
            orders = ORDERS_TABLE,
            customers = CUSTOMERS_TABLE
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {order_product} (
                order_id BIGINT NOT NULL REFERENCES {orders} (order_id),
                product_id BIGINT NOT NULL REFERENCES {products} (product_id),
                PRIMARY KEY (order_id, product_id)
            )
            "#,
            order_product = ORDER_PRODUCT_TABLE,
            orders = ORDERS_TABLE,
            products = PRODUCTS_TABLE
        ),
    ]
}

/// Create the five tables if they do not exist. Existing tables are left untouched.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in table_ddl() {
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!("tables ensured");
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database when missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

/// Split a URL into (same server's `postgres` database URL, target database name). Query string is kept.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let (without_query, query) = match url.split_once('?') {
        Some((u, q)) => (u, Some(q)),
        None => (url, None),
    };
    let path_start = without_query
        .rfind('/')
        .filter(|i| *i > without_query.find("://").map(|p| p + 2).unwrap_or(0))
        .ok_or_else(|| invalid_url("no database path".into()))?
        + 1;
    let db_name = without_query.get(path_start..).unwrap_or("").trim();
    let base = without_query.get(..path_start).unwrap_or(without_query);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn invalid_url(reason: String) -> AppError {
    ConfigError::InvalidEnvVar("DATABASE_URL".into(), reason).into()
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
