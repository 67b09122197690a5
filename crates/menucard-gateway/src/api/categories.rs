//! Food category endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use menucard_core::types::{CafeId, CategoryId, Food, FoodCategory, LocalizedText};
use menucard_core::validation::{limits, sanitize_text};

use crate::auth::RequireCafe;
use crate::server::GatewayState;
use crate::uploads;

use super::{ApiError, FormData, success, success_message};

/// Read the localized name fields from a form, requiring at least one
/// language to be present.
fn read_name(form: &FormData, existing: Option<&LocalizedText>) -> Result<LocalizedText, ApiError> {
    let field = |name: &str, current: &str| -> Result<String, ApiError> {
        match form.value(name) {
            Some(value) => Ok(sanitize_text(value, limits::MAX_NAME_LENGTH)?),
            None => Ok(current.to_string()),
        }
    };

    let current = existing.cloned().unwrap_or_default();
    let name = LocalizedText::new(
        field("name_tm", &current.tm)?,
        field("name_ru", &current.ru)?,
        field("name_en", &current.en)?,
    );

    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Category name is required in at least one language".to_string(),
        ));
    }

    Ok(name)
}

/// Load a category and check it belongs to the authenticated café.
///
/// A foreign category is reported as not found, never as forbidden — the
/// existence of other cafés' records is not disclosed.
fn owned_category(
    state: &GatewayState,
    auth: &RequireCafe,
    id: u64,
) -> Result<FoodCategory, ApiError> {
    let category = state
        .store
        .categories()
        .get(CategoryId::new(id))?
        .filter(|c| c.cafe_id == auth.cafe_id())
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(category)
}

/// `POST /cafe/category/add`
pub async fn add_category(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(multipart).await?;
    let name = read_name(&form, None)?;

    let mut category = state
        .store
        .categories()
        .create(auth.cafe_id(), name, None)?;

    if let Some(file) = form.file("image") {
        let image = uploads::save_image(
            &state.config.upload_dir,
            "category",
            category.id.value(),
            &file.filename,
            &file.data,
        )
        .await?;
        category.image = Some(image);
        state.store.categories().update(&category)?;
    }

    Ok(success_message("Category created successfully", category))
}

/// `PUT /cafe/category/update/{id}`
pub async fn update_category(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut category = owned_category(&state, &auth, id)?;

    let form = FormData::read(multipart).await?;
    category.name = read_name(&form, Some(&category.name))?;

    if let Some(file) = form.file("image") {
        let image = uploads::save_image(
            &state.config.upload_dir,
            "category",
            category.id.value(),
            &file.filename,
            &file.data,
        )
        .await?;

        if let Some(old) = category.image.replace(image) {
            uploads::remove_image(&state.config.upload_dir, &old).await;
        }
    }

    state.store.categories().update(&category)?;
    Ok(success_message("Category updated successfully", category))
}

/// `DELETE /cafe/category/delete/{id}`
///
/// Removes the category and every menu item under it, along with their
/// stored images.
pub async fn delete_category(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let category = owned_category(&state, &auth, id)?;

    let removed = state.store.foods().delete_by_category(category.id)?;
    for food in &removed {
        if let Some(image) = &food.image {
            uploads::remove_image(&state.config.upload_dir, image).await;
        }
    }

    state.store.categories().delete(category.id)?;
    if let Some(image) = &category.image {
        uploads::remove_image(&state.config.upload_dir, image).await;
    }

    tracing::debug!(
        category_id = %category.id,
        deleted_foods = removed.len(),
        "Category deleted"
    );

    Ok(success_message(
        "Category deleted successfully",
        json!({ "deleted_foods": removed.len() }),
    ))
}

/// `GET /cafe/categories/get-my`
pub async fn my_categories(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
) -> Result<Json<Value>, ApiError> {
    let categories = state.store.categories().list_by_cafe(auth.cafe_id())?;
    Ok(success(categories))
}

/// `GET /cafe/categories/{cafe_id}` (public)
pub async fn categories_by_cafe(
    State(state): State<Arc<GatewayState>>,
    Path(cafe_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let categories = state
        .store
        .categories()
        .list_by_cafe(CafeId::new(cafe_id))?;
    Ok(success(categories))
}

/// Query parameters selecting a café.
#[derive(Debug, Deserialize)]
pub struct CafeQuery {
    /// Café to browse.
    pub cafe_id: u64,
}

/// A category with its menu items nested.
#[derive(Debug, Serialize)]
struct CategoryWithFoods {
    #[serde(flatten)]
    category: FoodCategory,
    foods: Vec<Food>,
}

/// `GET /cafe/categories/foods?cafe_id=` (public)
///
/// The full browsable menu: every category of the café with its items.
pub async fn categories_with_foods(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<CafeQuery>,
) -> Result<Json<Value>, ApiError> {
    let cafe_id = CafeId::new(query.cafe_id);
    let categories = state.store.categories().list_by_cafe(cafe_id)?;

    let mut menu = Vec::with_capacity(categories.len());
    for category in categories {
        let foods = state.store.foods().list_by_category(category.id)?;
        menu.push(CategoryWithFoods { category, foods });
    }

    Ok(success(menu))
}
