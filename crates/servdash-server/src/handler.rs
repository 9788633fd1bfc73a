use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/data`: the stored collection, or `[]` when nothing is stored.
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.kv.get(&state.data_key).await? {
        Some(text) => {
            let value: Value = serde_json::from_str(&text).map_err(ApiError::CorruptData)?;
            debug!(key = %state.data_key, bytes = text.len(), "data read");
            Ok(Json(value))
        }
        None => Ok(Json(Value::Array(Vec::new()))),
    }
}

/// `PUT /api/data`: replace the stored collection with the request body.
///
/// The body must be a JSON array. Its elements are stored as sent.
pub async fn put_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidBody)?;
    let Value::Array(items) = &value else {
        return Err(ApiError::InvalidBody);
    };
    let count = items.len();
    state.kv.put(&state.data_key, value.to_string()).await?;
    info!(key = %state.data_key, items = count, "data saved");
    Ok(Json(json!({ "success": true, "message": "data saved" })))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "servdash-server",
        "version": env!("CARGO_PKG_VERSION"),
        "dataKey": &*state.data_key,
    }))
}
