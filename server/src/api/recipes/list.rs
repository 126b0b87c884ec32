use crate::casing;
use crate::error::ApiError;
use crate::models::Recipe;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub items: Vec<Recipe>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes", body = ListRecipesResponse),
        (status = 500, description = "Store failure", body = crate::api::ErrorResponse)
    )
)]
pub async fn list_recipes(State(store): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = store.list_recipes().await?;

    let response = ListRecipesResponse {
        count: items.len(),
        items,
    };

    Ok(Json(casing::to_api(&response)?))
}
