use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

/// Deleting a recipe that does not exist still succeeds.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    State(store): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(id) = super::recipe_id(&raw_id) else {
        tracing::debug!("Delete of recipe {:?} skipped, not a recipe id", raw_id);
        return Ok(StatusCode::NO_CONTENT);
    };

    let removed = store.delete_recipe(id).await?;
    if removed == 0 {
        tracing::debug!("Delete of recipe {} matched no rows", id);
    }

    Ok(StatusCode::NO_CONTENT)
}
