//! Column metadata and per-field validation rules for the entity model.

/// Shape a request field must have before any other rule is checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    /// ISO 8601 calendar date (`YYYY-MM-DD`).
    Date,
    IntegerList,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub is_pk: bool,
    /// PostgreSQL type name used for parameter casts (e.g. "bigint", "date").
    pub pg_type: String,
}

impl ColumnInfo {
    pub fn pk(name: &str) -> Self {
        ColumnInfo {
            name: name.to_string(),
            is_pk: true,
            pg_type: "bigint".into(),
        }
    }

    pub fn new(name: &str, pg_type: &str) -> Self {
        ColumnInfo {
            name: name.to_string(),
            is_pk: false,
            pg_type: pg_type.to_string(),
        }
    }
}

/// Declarative rule for one request field. Patterns must all match; a failure
/// reports `pattern_message` once.
#[derive(Clone, Debug)]
pub struct ValidationRule {
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub minimum: Option<f64>,
    pub patterns: Vec<String>,
    pub pattern_message: Option<String>,
}

impl ValidationRule {
    pub fn of(kind: FieldKind) -> Self {
        ValidationRule {
            kind,
            required: false,
            min_length: None,
            max_length: None,
            minimum: None,
            patterns: Vec::new(),
            pattern_message: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    pub fn pattern_message(mut self, message: &str) -> Self {
        self.pattern_message = Some(message.to_string());
        self
    }
}
