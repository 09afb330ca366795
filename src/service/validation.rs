//! Request validation from the entity's field rules.
//!
//! Every field is checked and every failure is collected, so one 400 response
//! lists all invalid fields. On success the body comes back normalized: integers
//! and numbers parsed from strings, dates re-rendered as `YYYY-MM-DD`.

use crate::config::{FieldKind, FieldRule};
use crate::error::{AppError, FieldErrors};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const UNKNOWN: &str = "Unknown field.";

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. All required fields must be present.
    pub fn validate(
        body: &HashMap<String, Value>,
        rules: &[FieldRule],
    ) -> Result<HashMap<String, Value>, AppError> {
        check(body, rules, false)
    }

    /// Validate only the fields present in body (updates). Required is not enforced for missing fields.
    pub fn validate_partial(
        body: &HashMap<String, Value>,
        rules: &[FieldRule],
    ) -> Result<HashMap<String, Value>, AppError> {
        check(body, rules, true)
    }
}

fn check(
    body: &HashMap<String, Value>,
    rules: &[FieldRule],
    partial: bool,
) -> Result<HashMap<String, Value>, AppError> {
    let mut errors = FieldErrors::new();
    let mut out = HashMap::with_capacity(body.len());

    for key in body.keys() {
        if !rules.iter().any(|r| r.field == *key) {
            errors.entry(key.clone()).or_default().push(UNKNOWN.into());
        }
    }

    for r in rules {
        match body.get(&r.field) {
            None => {
                if r.rule.required && !partial {
                    errors.entry(r.field.clone()).or_default().push(MISSING.into());
                }
            }
            Some(Value::Null) => errors.entry(r.field.clone()).or_default().push(NULL.into()),
            Some(v) => match validate_field(v, r) {
                Ok(normalized) => {
                    out.insert(r.field.clone(), normalized);
                }
                Err(msgs) => errors.entry(r.field.clone()).or_default().extend(msgs),
            },
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn validate_field(v: &Value, r: &FieldRule) -> Result<Value, Vec<String>> {
    let normalized = coerce(v, r.rule.kind)?;
    let mut msgs = Vec::new();

    if let Some(s) = normalized.as_str() {
        let len = s.chars().count() as u32;
        let too_short = r.rule.min_length.is_some_and(|min| len < min);
        let too_long = r.rule.max_length.is_some_and(|max| len > max);
        if too_short || too_long {
            msgs.push(length_message(r.rule.min_length, r.rule.max_length));
        }
        if !r.patterns.iter().all(|re| re.is_match(s)) {
            let m = r
                .rule
                .pattern_message
                .clone()
                .unwrap_or_else(|| "String does not match expected pattern.".into());
            msgs.push(m);
        }
    }
    if let (Some(min), Some(n)) = (r.rule.minimum, normalized.as_f64()) {
        if n < min {
            msgs.push(format!("Must be greater than or equal to {}.", min));
        }
    }

    if msgs.is_empty() {
        Ok(normalized)
    } else {
        Err(msgs)
    }
}

fn length_message(min: Option<u32>, max: Option<u32>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("Length must be between {} and {}.", min, max),
        (Some(min), None) => format!("Shorter than minimum length {}.", min),
        (None, Some(max)) => format!("Longer than maximum length {}.", max),
        (None, None) => "Invalid length.".into(),
    }
}

fn coerce(v: &Value, kind: FieldKind) -> Result<Value, Vec<String>> {
    match kind {
        FieldKind::String => match v {
            Value::String(_) => Ok(v.clone()),
            _ => Err(vec!["Not a valid string.".into()]),
        },
        FieldKind::Integer => coerce_integer(v)
            .map(Value::from)
            .ok_or_else(|| vec!["Not a valid integer.".into()]),
        FieldKind::Number => coerce_number(v)
            .map(Value::from)
            .ok_or_else(|| vec!["Not a valid number.".into()]),
        FieldKind::Date => v
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| vec!["Not a valid date.".into()]),
        FieldKind::IntegerList => {
            let Value::Array(items) = v else {
                return Err(vec!["Not a valid list.".into()]);
            };
            let mut ids = Vec::with_capacity(items.len());
            let mut msgs = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match coerce_integer(item) {
                    Some(n) => ids.push(Value::from(n)),
                    None => msgs.push(format!("Item {}: Not a valid integer.", i)),
                }
            }
            if msgs.is_empty() {
                Ok(Value::Array(ids))
            } else {
                Err(msgs)
            }
        }
    }
}

fn coerce_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integer ids of an already-normalized list field, or None when absent.
pub fn integer_list(body: &HashMap<String, Value>, field: &str) -> Option<Vec<i64>> {
    body.get(field)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
}
