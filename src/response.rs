//! Response body helpers: message bodies for mutations, bare rows for reads.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

pub fn message(message: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    (
        StatusCode::OK,
        Json(MessageBody {
            message: message.into(),
        }),
    )
}

/// 201 with the message and the generated id under the entity's key column (e.g. `customer_id`).
pub fn created(message: &str, id_key: &str, row: &Value) -> (StatusCode, Json<Value>) {
    let mut body = Map::new();
    body.insert("message".into(), Value::String(message.to_string()));
    body.insert(id_key.to_string(), row.get(id_key).cloned().unwrap_or(Value::Null));
    (StatusCode::CREATED, Json(Value::Object(body)))
}
