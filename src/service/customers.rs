//! Customer removal with its dependent rows.

use crate::config::ResolvedModel;
use crate::error::AppError;
use crate::service::CrudService;
use crate::sql::{delete_associations_of_owners, delete_where, select_by_id_for_update};
use serde_json::Value;
use sqlx::PgPool;

pub struct CustomerService;

impl CustomerService {
    /// Delete a customer and everything that references it, in one transaction:
    /// the order/product pairs of its orders, its orders, its account, then the customer row.
    /// Returns the deleted customer, or None if it did not exist.
    pub async fn delete_cascade(pool: &PgPool, model: &ResolvedModel, id: i64) -> Result<Option<Value>, AppError> {
        let customers = &model.customers;
        let mut tx = pool.begin().await?;

        if CrudService::fetch_optional(&mut *tx, &select_by_id_for_update(customers, id))
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let fk = customers.pk_column.as_str();
        let pairs = CrudService::execute(
            &mut *tx,
            &delete_associations_of_owners(&model.order_products, &model.orders, fk, id),
        )
        .await?;
        let orders = CrudService::execute(&mut *tx, &delete_where(&model.orders, fk, id)).await?;
        let accounts = CrudService::execute(&mut *tx, &delete_where(&model.customer_accounts, fk, id)).await?;
        let row = CrudService::delete(&mut *tx, customers, id).await?;
        tx.commit().await?;

        tracing::info!(customer_id = id, orders, accounts, order_products = pairs, "customer deleted");
        Ok(row)
    }
}
