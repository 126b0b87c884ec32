use crate::api::ErrorResponse;
use crate::casing;
use crate::error::ApiError;
use crate::models::{Ingredient, Recipe};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// A recipe with its ingredients embedded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(store): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = super::recipe_id(&raw_id).ok_or_else(|| ApiError::NotFound(raw_id.clone()))?;
    let recipe = store
        .find_recipe(id)
        .await?
        .ok_or(ApiError::NotFound(raw_id))?;
    let ingredients = store.list_ingredients(id).await?;

    Ok(Json(casing::to_api(&RecipeResponse {
        recipe,
        ingredients,
    })?))
}
