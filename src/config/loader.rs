//! Builds the entity model: customers, accounts, products, orders and the order/product join table.

use crate::config::resolved::{
    AssociationTable, FieldRule, ResolvedEntity, ResolvedModel, CUSTOMERS_TABLE, CUSTOMER_ACCOUNTS_TABLE,
    ORDERS_TABLE, ORDER_PRODUCT_TABLE, PRODUCTS_TABLE,
};
use crate::config::types::{ColumnInfo, FieldKind, ValidationRule};
use crate::config::validate;
use crate::error::ConfigError;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}$";
const USERNAME_PATTERN: &str = r"^\w+$";
const PASSWORD_CHARSET_PATTERN: &str = r"^[A-Za-z\d]+$";

/// Build the resolved model and check it for consistency.
pub fn resolve() -> Result<ResolvedModel, ConfigError> {
    let model = ResolvedModel {
        customers: entity(
            CUSTOMERS_TABLE,
            "customers",
            "customer_id",
            vec![
                ColumnInfo::new("name", "varchar"),
                ColumnInfo::new("email", "varchar"),
                ColumnInfo::new("phone", "varchar"),
            ],
            vec![
                ("name", ValidationRule::of(FieldKind::String).required().length(Some(1), Some(255))),
                (
                    "email",
                    ValidationRule::of(FieldKind::String)
                        .required()
                        .length(None, Some(320))
                        .pattern(EMAIL_PATTERN)
                        .pattern_message("Not a valid email address."),
                ),
                (
                    "phone",
                    ValidationRule::of(FieldKind::String)
                        .required()
                        .length(Some(10), Some(15))
                        .pattern(PHONE_PATTERN)
                        .pattern_message(
                            "Invalid phone number. Must be in the format +123456789, 123-456-7890, or similar.",
                        ),
                ),
            ],
        )?,
        customer_accounts: entity(
            CUSTOMER_ACCOUNTS_TABLE,
            "customeraccounts",
            "account_id",
            vec![
                ColumnInfo::new("username", "varchar"),
                ColumnInfo::new("password", "varchar"),
                ColumnInfo::new("customer_id", "bigint"),
            ],
            vec![
                (
                    "username",
                    ValidationRule::of(FieldKind::String)
                        .required()
                        .length(Some(4), Some(255))
                        .pattern(USERNAME_PATTERN)
                        .pattern_message("Username must contain only letters, numbers, and underscores."),
                ),
                (
                    "password",
                    ValidationRule::of(FieldKind::String)
                        .required()
                        .length(Some(6), Some(255))
                        .pattern(PASSWORD_CHARSET_PATTERN)
                        .pattern("[A-Za-z]")
                        .pattern(r"\d")
                        .pattern_message(
                            "Password must be at least 6 characters long and contain at least one letter and one number.",
                        ),
                ),
                ("customer_id", ValidationRule::of(FieldKind::Integer).required()),
            ],
        )?,
        products: entity(
            PRODUCTS_TABLE,
            "products",
            "product_id",
            vec![
                ColumnInfo::new("name", "varchar"),
                ColumnInfo::new("price", "double precision"),
            ],
            vec![
                ("name", ValidationRule::of(FieldKind::String).required().length(Some(1), Some(255))),
                ("price", ValidationRule::of(FieldKind::Number).required().minimum(0.0)),
            ],
        )?,
        orders: entity(
            ORDERS_TABLE,
            "orders",
            "order_id",
            vec![
                ColumnInfo::new("date", "date"),
                ColumnInfo::new("customer_id", "bigint"),
            ],
            vec![
                ("customer_id", ValidationRule::of(FieldKind::Integer).required()),
                ("date", ValidationRule::of(FieldKind::Date).required()),
                ("products", ValidationRule::of(FieldKind::IntegerList)),
                ("product_id", ValidationRule::of(FieldKind::IntegerList)),
            ],
        )?,
        order_products: AssociationTable {
            table_name: ORDER_PRODUCT_TABLE.into(),
            left_column: "order_id".into(),
            right_column: "product_id".into(),
        },
    };
    validate(&model)?;
    Ok(model)
}

fn entity(
    table_name: &str,
    path_segment: &str,
    pk_column: &str,
    columns: Vec<ColumnInfo>,
    rules: Vec<(&str, ValidationRule)>,
) -> Result<ResolvedEntity, ConfigError> {
    let mut all_columns = vec![ColumnInfo::pk(pk_column)];
    all_columns.extend(columns);
    let validation = rules
        .into_iter()
        .map(|(field, rule)| compile(field, rule))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedEntity {
        table_name: table_name.to_string(),
        path_segment: path_segment.to_string(),
        pk_column: pk_column.to_string(),
        columns: all_columns,
        validation,
    })
}

fn compile(field: &str, rule: ValidationRule) -> Result<FieldRule, ConfigError> {
    let patterns = rule
        .patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                field: field.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FieldRule {
        field: field.to_string(),
        rule,
        patterns,
    })
}
