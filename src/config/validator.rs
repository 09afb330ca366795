//! Model validation: primary keys, path segments and rule/column consistency.

use crate::config::{FieldKind, ResolvedModel};
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(model: &ResolvedModel) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    for entity in model.entities() {
        if !path_segments.insert(entity.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(entity.path_segment.clone()));
        }
        match entity.column(&entity.pk_column) {
            Some(c) if c.is_pk => {}
            _ => {
                return Err(ConfigError::InvalidPrimaryKey {
                    table: entity.table_name.clone(),
                    column: entity.pk_column.clone(),
                })
            }
        }
        let mut seen = HashSet::new();
        for r in &entity.validation {
            if !seen.insert(r.field.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{}: duplicate rule for field {}",
                    entity.table_name, r.field
                )));
            }
            if r.field == entity.pk_column {
                return Err(ConfigError::Validation(format!(
                    "{}: primary key {} cannot be an input field",
                    entity.table_name, r.field
                )));
            }
            // Input-only fields never reach a column.
            if r.rule.kind != FieldKind::IntegerList && entity.column(&r.field).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", entity.table_name, r.field),
                });
            }
            if r.patterns.len() != r.rule.patterns.len() {
                return Err(ConfigError::InvalidPattern {
                    field: r.field.clone(),
                    reason: "pattern not compiled".into(),
                });
            }
        }
    }
    let assoc = &model.order_products;
    if assoc.left_column != model.orders.pk_column || assoc.right_column != model.products.pk_column {
        return Err(ConfigError::MissingReference {
            kind: "association column",
            id: format!("{}({}, {})", assoc.table_name, assoc.left_column, assoc.right_column),
        });
    }
    Ok(())
}
