//! Resolved entity model: tables, columns and compiled validation rules for runtime use.

use crate::config::{ColumnInfo, ValidationRule};
use regex::Regex;

pub const CUSTOMERS_TABLE: &str = "customers";
pub const CUSTOMER_ACCOUNTS_TABLE: &str = "customer_accounts";
pub const PRODUCTS_TABLE: &str = "products";
pub const ORDERS_TABLE: &str = "orders";
pub const ORDER_PRODUCT_TABLE: &str = "order_product";

/// A validation rule bound to its request field, with patterns compiled.
#[derive(Clone, Debug)]
pub struct FieldRule {
    pub field: String,
    pub rule: ValidationRule,
    pub patterns: Vec<Regex>,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub table_name: String,
    /// URL segment the entity is served under (`/{segment}` and `/{segment}/:id`).
    pub path_segment: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    /// Accepted request fields in declaration order. Fields that are not columns
    /// are input-only (e.g. an order's product ids).
    pub validation: Vec<FieldRule>,
}

impl ResolvedEntity {
    pub fn collection_path(&self) -> String {
        format!("/{}", self.path_segment)
    }

    pub fn item_path(&self) -> String {
        format!("/{}/:id", self.path_segment)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.validation.iter().find(|r| r.field == field)
    }
}

/// Join table realizing a many-to-many relationship, keyed by both columns.
#[derive(Clone, Debug)]
pub struct AssociationTable {
    pub table_name: String,
    /// Owning side (e.g. order_id).
    pub left_column: String,
    /// Referenced side (e.g. product_id).
    pub right_column: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub customers: ResolvedEntity,
    pub customer_accounts: ResolvedEntity,
    pub products: ResolvedEntity,
    pub orders: ResolvedEntity,
    pub order_products: AssociationTable,
}

impl ResolvedModel {
    pub fn entities(&self) -> [&ResolvedEntity; 4] {
        [&self.customers, &self.customer_accounts, &self.products, &self.orders]
    }
}
