//! REST API handlers.
//!
//! Handlers follow the response envelope of the public API: CRUD endpoints
//! answer `{"success": bool, "message"?, "data"?}`, while login/refresh
//! answer with the bare token pair object.

pub mod auth;
pub mod cafe;
pub mod categories;
pub mod foods;

mod error;
mod form;

pub use error::ApiError;
pub(crate) use form::FormData;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Standard success envelope.
pub(crate) fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope with a human-readable message.
pub(crate) fn success_message<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": data }))
}
