use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::validate::{self, IngredientDraft, RecipeDraft, ValidationError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::whole_number")]
    pub prep_time: Option<i64>,
    #[serde(default, deserialize_with = "super::whole_number")]
    pub cooking_time: Option<i64>,
    #[serde(default, deserialize_with = "super::whole_number")]
    pub servings: Option<i64>,
    #[serde(default)]
    pub ingredients: Vec<CreateIngredientRequest>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateIngredientRequest {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    /// Accepted for symmetry with the response shape; the new recipe's id is
    /// always used.
    #[allow(dead_code)]
    pub recipe_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: i32,
}

impl From<CreateRecipeRequest> for RecipeDraft {
    fn from(request: CreateRecipeRequest) -> Self {
        RecipeDraft {
            title: request.title,
            author: request.author,
            description: request.description,
            prep_time: request.prep_time,
            cooking_time: request.cooking_time,
            servings: request.servings,
            ingredients: request
                .ingredients
                .into_iter()
                .map(|i| IngredientDraft {
                    name: i.name,
                    quantity: i.quantity,
                    unit: i.unit,
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Title already in use", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(store): State<AppState>,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ValidationError::Malformed(e.body_text()))?;
    let valid = validate::recipe(request.into())?;

    let title = valid.fields.title.clone();
    let id = store
        .create_recipe(valid.fields, valid.ingredients)
        .await
        .map_err(|e| ApiError::from_store(e, &title))?;

    tracing::info!("Created recipe {} ({})", id, title);

    Ok((StatusCode::CREATED, Json(CreateRecipeResponse { id })))
}
