//! Café profile endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde_json::Value;

use menucard_core::validation::{limits, sanitize_text};

use crate::auth::{RequireCafe, hash_password};
use crate::server::GatewayState;
use crate::uploads;

use super::{ApiError, FormData, success, success_message};

/// `GET /cafe/my-cafe`
///
/// The authenticated café's own profile.
pub async fn my_cafe(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
) -> Result<Json<Value>, ApiError> {
    let cafe = state
        .store
        .cafes()
        .get(auth.cafe_id())?
        .ok_or(ApiError::NotFound("Cafe"))?;

    Ok(success(cafe.to_profile()))
}

/// `PUT /cafe/update`
///
/// Partial profile update: any of `name`, `password`, `phone_numbers`, and
/// a `logo` file may be present; absent fields are left untouched. A new
/// logo replaces the stored file on disk.
pub async fn update_my_cafe(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut cafe = state
        .store
        .cafes()
        .get(auth.cafe_id())?
        .ok_or(ApiError::NotFound("Cafe"))?;

    let form = FormData::read(multipart).await?;

    if let Some(file) = form.file("logo") {
        let name = uploads::save_image(
            &state.config.upload_dir,
            "cafe",
            cafe.id.value(),
            &file.filename,
            &file.data,
        )
        .await?;

        if let Some(old) = cafe.logo.replace(name) {
            uploads::remove_image(&state.config.upload_dir, &old).await;
        }
    }

    if let Some(name) = form.value("name") {
        let name = sanitize_text(name, limits::MAX_NAME_LENGTH)?;
        if !name.is_empty() {
            cafe.name = name;
        }
    }

    if let Some(password) = form.value("password") {
        if !password.is_empty() {
            cafe.password_hash = hash_password(password)?;
        }
    }

    let phones: Vec<String> = form
        .values("phone_numbers")
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().to_string())
        .collect();
    if !phones.is_empty() {
        cafe.phone_numbers = phones;
    }

    state.store.cafes().update(&cafe)?;
    tracing::debug!(cafe_id = %cafe.id, "Cafe profile updated");

    Ok(success_message(
        "Cafe updated successfully",
        cafe.to_profile(),
    ))
}
