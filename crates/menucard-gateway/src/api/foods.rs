//! Menu item endpoints, including bulk import.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use menucard_core::types::{CategoryId, Food, FoodId, LocalizedText};
use menucard_core::validation::{self, limits, parse_price, sanitize_text};

use crate::auth::RequireCafe;
use crate::server::GatewayState;
use crate::uploads;

use super::{ApiError, FormData, success, success_message};

/// Load a menu item and check it belongs to the authenticated café.
fn owned_food(state: &GatewayState, auth: &RequireCafe, id: u64) -> Result<Food, ApiError> {
    let food = state
        .store
        .foods()
        .get(FoodId::new(id))?
        .filter(|f| f.cafe_id == auth.cafe_id())
        .ok_or(ApiError::NotFound("Food"))?;
    Ok(food)
}

/// Resolve a form's `category_id` against the café's own categories.
fn owned_category_id(
    state: &GatewayState,
    auth: &RequireCafe,
    raw: &str,
) -> Result<CategoryId, ApiError> {
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid category_id".to_string()))?;

    state
        .store
        .categories()
        .get(CategoryId::new(id))?
        .filter(|c| c.cafe_id == auth.cafe_id())
        .map(|c| c.id)
        .ok_or(ApiError::NotFound("Category"))
}

fn read_text(
    form: &FormData,
    tm_field: &str,
    ru_field: &str,
    current: &LocalizedText,
    max_len: usize,
) -> Result<LocalizedText, ApiError> {
    let field = |name: &str, current: &str| -> Result<String, ApiError> {
        match form.value(name) {
            Some(value) => Ok(sanitize_text(value, max_len)?),
            None => Ok(current.to_string()),
        }
    };

    Ok(LocalizedText::new(
        field(tm_field, &current.tm)?,
        field(ru_field, &current.ru)?,
        current.en.clone(),
    ))
}

/// `POST /cafe/foods/add`
pub async fn add_food(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(multipart).await?;

    let category_id = owned_category_id(&state, &auth, form.require("category_id")?)?;
    let price = parse_price(form.require("price")?)?;

    let name = read_text(
        &form,
        "name_tm",
        "name_ru",
        &LocalizedText::default(),
        limits::MAX_NAME_LENGTH,
    )?;
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Food name is required in at least one language".to_string(),
        ));
    }

    let description = read_text(
        &form,
        "description_tm",
        "description_ru",
        &LocalizedText::default(),
        limits::MAX_DESCRIPTION_LENGTH,
    )?;

    let mut food = state.store.foods().create(
        auth.cafe_id(),
        category_id,
        name,
        description,
        price,
        None,
    )?;

    if let Some(file) = form.file("image") {
        let image = uploads::save_image(
            &state.config.upload_dir,
            "food",
            food.id.value(),
            &file.filename,
            &file.data,
        )
        .await?;
        food.image = Some(image);
        state.store.foods().update(&food)?;
    }

    Ok(success_message("Food created successfully", food))
}

/// `PUT /cafe/foods/update/{id}`
pub async fn update_food(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut food = owned_food(&state, &auth, id)?;

    let form = FormData::read(multipart).await?;

    if let Some(raw) = form.value("category_id") {
        food.category_id = owned_category_id(&state, &auth, raw)?;
    }

    if let Some(raw) = form.value("price") {
        food.price = parse_price(raw)?;
    }

    let name = read_text(&form, "name_tm", "name_ru", &food.name, limits::MAX_NAME_LENGTH)?;
    let description = read_text(
        &form,
        "description_tm",
        "description_ru",
        &food.description,
        limits::MAX_DESCRIPTION_LENGTH,
    )?;
    food.name = name;
    food.description = description;

    if let Some(file) = form.file("image") {
        let image = uploads::save_image(
            &state.config.upload_dir,
            "food",
            food.id.value(),
            &file.filename,
            &file.data,
        )
        .await?;

        if let Some(old) = food.image.replace(image) {
            uploads::remove_image(&state.config.upload_dir, &old).await;
        }
    }

    state.store.foods().update(&food)?;
    Ok(success_message("Food updated successfully", food))
}

/// `DELETE /cafe/foods/delete/{id}`
pub async fn delete_food(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let food = owned_food(&state, &auth, id)?;

    state.store.foods().delete(food.id)?;
    if let Some(image) = &food.image {
        uploads::remove_image(&state.config.upload_dir, image).await;
    }

    Ok(success_message(
        "Food deleted successfully",
        json!({ "id": food.id }),
    ))
}

/// `GET /cafe/foods/get-my`
pub async fn my_foods(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
) -> Result<Json<Value>, ApiError> {
    let foods = state.store.foods().list_by_cafe(auth.cafe_id())?;
    Ok(success(foods))
}

/// `POST /cafe/foods/add/bulk`
///
/// CSV bulk import. The payload is the `file` multipart field; see
/// [`menucard_core::validation::IMPORT_HEADER`] for the expected columns.
/// Unknown category names are created on the fly. Bad rows are skipped and
/// reported; good rows still import.
pub async fn bulk_import(
    State(state): State<Arc<GatewayState>>,
    auth: RequireCafe,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(multipart).await?;
    let file = form
        .file("file")
        .ok_or_else(|| ApiError::BadRequest("Field \"file\" is required".to_string()))?;

    let payload = std::str::from_utf8(&file.data)
        .map_err(|_| ApiError::BadRequest("Import file must be UTF-8 text".to_string()))?;

    let import = validation::parse_menu_import(payload)?;

    let mut imported = 0usize;
    for row in import.rows {
        let category = match state
            .store
            .categories()
            .find_by_name(auth.cafe_id(), &row.category)?
        {
            Some(category) => category,
            None => state.store.categories().create(
                auth.cafe_id(),
                LocalizedText::new(row.category.clone(), "", ""),
                None,
            )?,
        };

        state.store.foods().create(
            auth.cafe_id(),
            category.id,
            row.name,
            row.description,
            row.price,
            None,
        )?;
        imported += 1;
    }

    tracing::info!(
        cafe_id = %auth.cafe_id(),
        imported,
        failed = import.errors.len(),
        "Bulk menu import finished"
    );

    Ok(success_message(
        "Import finished",
        json!({ "imported": imported, "failed": import.errors }),
    ))
}

/// Query parameters selecting a category.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    /// Category to list.
    pub category_id: u64,
}

/// `GET /cafe/foods/by-category?category_id=` (public)
pub async fn foods_by_category(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let foods = state
        .store
        .foods()
        .list_by_category(CategoryId::new(query.category_id))?;
    Ok(success(foods))
}

/// `GET /cafe/foods/{id}` (public)
pub async fn food_by_id(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let food = state
        .store
        .foods()
        .get(FoodId::new(id))?
        .ok_or(ApiError::NotFound("Food"))?;
    Ok(success(food))
}
