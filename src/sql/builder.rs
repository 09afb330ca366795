//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from resolved entities and join tables.

use crate::config::{AssociationTable, ResolvedEntity};
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: only from the model).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value and return its placeholder cast to `pg_type`.
    fn placeholder(&mut self, v: Value, pg_type: &str) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, pg_type)
    }
}

fn select_column_list(entity: &ResolvedEntity) -> String {
    entity
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(id.into(), "bigint");
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(entity),
        quoted(&entity.table_name),
        quoted(&entity.pk_column),
        ph
    );
    q
}

/// SELECT by primary key with a row lock, for use inside a transaction.
pub fn select_by_id_for_update(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = select_by_id(entity, id);
    q.sql.push_str(" FOR UPDATE");
    q
}

/// SELECT all rows ORDER BY pk.
pub fn select_list(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(entity),
        quoted(&entity.table_name),
        quoted(&entity.pk_column)
    );
    q
}

/// INSERT the non-pk columns present in body; the pk is generated. RETURNING all columns.
pub fn insert(entity: &ResolvedEntity, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns.iter().filter(|c| !c.is_pk) {
        let Some(val) = body.get(&c.name) else { continue };
        placeholders.push(q.placeholder(val.clone(), &c.pg_type));
        cols.push(quoted(&c.name));
    }
    let table = quoted(&entity.table_name);
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only non-pk columns present in body, in column order.
/// With nothing to set this degrades to a SELECT by id so callers still learn whether the row exists.
pub fn update(entity: &ResolvedEntity, id: i64, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in entity.columns.iter().filter(|c| !c.is_pk) {
        let Some(val) = body.get(&c.name) else { continue };
        let rhs = q.placeholder(val.clone(), &c.pg_type);
        sets.push(format!("{} = {}", quoted(&c.name), rhs));
    }
    if sets.is_empty() {
        return select_by_id(entity, id);
    }
    let id_ph = q.placeholder(id.into(), "bigint");
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(&entity.table_name),
        sets.join(", "),
        quoted(&entity.pk_column),
        id_ph,
        select_column_list(entity)
    );
    q
}

/// DELETE by id, RETURNING the deleted row.
pub fn delete(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(id.into(), "bigint");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(&entity.table_name),
        quoted(&entity.pk_column),
        ph,
        select_column_list(entity)
    );
    q
}

/// DELETE every row whose foreign-key column equals `value`.
pub fn delete_where(entity: &ResolvedEntity, column: &str, value: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(value.into(), "bigint");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(&entity.table_name),
        quoted(column),
        ph
    );
    q
}

/// SELECT (left, right) pairs for the given owners, ordered by left then right.
pub fn select_associations_in(assoc: &AssociationTable, left_ids: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let left = quoted(&assoc.left_column);
    let right = quoted(&assoc.right_column);
    let table = quoted(&assoc.table_name);
    if left_ids.is_empty() {
        q.sql = format!("SELECT {}, {} FROM {} WHERE 1 = 0", left, right, table);
        return q;
    }
    let ph = q.placeholder(Value::from(left_ids.to_vec()), "bigint[]");
    q.sql = format!(
        "SELECT {l}, {r} FROM {t} WHERE {l} = ANY({}) ORDER BY {l}, {r}",
        ph,
        l = left,
        r = right,
        t = table
    );
    q
}

/// INSERT one (left, right) pair; an existing pair is left as is.
pub fn insert_association(assoc: &AssociationTable, left_id: i64, right_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.placeholder(left_id.into(), "bigint");
    let r = q.placeholder(right_id.into(), "bigint");
    q.sql = format!(
        "INSERT INTO {} ({}, {}) VALUES ({}, {}) ON CONFLICT DO NOTHING",
        quoted(&assoc.table_name),
        quoted(&assoc.left_column),
        quoted(&assoc.right_column),
        l,
        r
    );
    q
}

/// DELETE all pairs owned by one left id.
pub fn delete_associations(assoc: &AssociationTable, left_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(left_id.into(), "bigint");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(&assoc.table_name),
        quoted(&assoc.left_column),
        ph
    );
    q
}

/// DELETE all pairs whose owner row (in `owner`) has `owner_fk = value`,
/// e.g. every order_product row of a customer's orders.
pub fn delete_associations_of_owners(
    assoc: &AssociationTable,
    owner: &ResolvedEntity,
    owner_fk: &str,
    value: i64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(value.into(), "bigint");
    q.sql = format!(
        "DELETE FROM {} WHERE {} IN (SELECT {} FROM {} WHERE {} = {})",
        quoted(&assoc.table_name),
        quoted(&assoc.left_column),
        quoted(&owner.pk_column),
        quoted(&owner.table_name),
        quoted(owner_fk),
        ph
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    fn body(v: Value) -> HashMap<String, Value> {
        v.as_object().unwrap().clone().into_iter().collect()
    }

    #[test]
    fn insert_skips_pk_and_casts() {
        let model = resolve().unwrap();
        let q = insert(
            &model.orders,
            &body(json!({"order_id": 9, "date": "2024-01-02", "customer_id": 3, "products": [1]})),
        );
        assert_eq!(
            q.sql,
            r#"INSERT INTO "orders" ("date", "customer_id") VALUES ($1::date, $2::bigint) RETURNING "order_id", "date", "customer_id""#
        );
        assert_eq!(q.params, vec![json!("2024-01-02"), json!(3)]);
    }

    #[test]
    fn update_sets_only_present_columns() {
        let model = resolve().unwrap();
        let q = update(&model.customers, 4, &body(json!({"email": "a@b.co"})));
        assert_eq!(
            q.sql,
            r#"UPDATE "customers" SET "email" = $1::varchar WHERE "customer_id" = $2::bigint RETURNING "customer_id", "name", "email", "phone""#
        );
        assert_eq!(q.params, vec![json!("a@b.co"), json!(4)]);
    }

    #[test]
    fn empty_update_is_select() {
        let model = resolve().unwrap();
        let q = update(&model.products, 4, &HashMap::new());
        assert!(q.sql.starts_with("SELECT "));
        assert_eq!(q.params, vec![json!(4)]);
    }

    #[test]
    fn delete_returns_row() {
        let model = resolve().unwrap();
        let q = delete(&model.products, 2);
        assert_eq!(
            q.sql,
            r#"DELETE FROM "products" WHERE "product_id" = $1::bigint RETURNING "product_id", "name", "price""#
        );
    }

    #[test]
    fn association_queries() {
        let model = resolve().unwrap();
        let assoc = &model.order_products;
        let q = select_associations_in(assoc, &[1, 2]);
        assert_eq!(
            q.sql,
            r#"SELECT "order_id", "product_id" FROM "order_product" WHERE "order_id" = ANY($1::bigint[]) ORDER BY "order_id", "product_id""#
        );
        assert_eq!(q.params, vec![json!([1, 2])]);
        assert!(select_associations_in(assoc, &[]).sql.ends_with("WHERE 1 = 0"));

        let q = delete_associations_of_owners(assoc, &model.orders, "customer_id", 5);
        assert_eq!(
            q.sql,
            r#"DELETE FROM "order_product" WHERE "order_id" IN (SELECT "order_id" FROM "orders" WHERE "customer_id" = $1::bigint)"#
        );
        assert!(insert_association(assoc, 1, 2).sql.ends_with("ON CONFLICT DO NOTHING"));
    }

    #[test]
    fn association_lookup_uses_one_parameter_for_any_id_count() {
        let model = resolve().unwrap();
        let ids: Vec<i64> = (1..=70_000).collect();
        let q = select_associations_in(&model.order_products, &ids);
        assert_eq!(q.params.len(), 1);
        assert!(q.sql.contains("= ANY($1::bigint[])"));
        assert!(!q.sql.contains("$2"));
    }

    #[test]
    fn for_update_locks_row() {
        let model = resolve().unwrap();
        assert!(select_by_id_for_update(&model.customers, 1).sql.ends_with(" FOR UPDATE"));
    }
}
