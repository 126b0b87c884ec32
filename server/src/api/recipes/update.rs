use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::models::Recipe;
use crate::reconcile::{self, IngredientPatch};
use crate::validate::{self, RecipeDraft, ValidationError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use super::create::CreateRecipeResponse;

/// Partial update. Omitted fields keep their stored value; an explicit `null`
/// clears an optional field. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_whole_number")]
    #[schema(value_type = Option<i64>)]
    pub prep_time: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable_whole_number")]
    #[schema(value_type = Option<i64>)]
    pub cooking_time: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable_whole_number")]
    #[schema(value_type = Option<i64>)]
    pub servings: Option<Option<i64>>,
    /// When present, replaces the recipe's ingredient list: entries with a
    /// known id are updated, the rest are created, and stored ingredients
    /// missing from the list are deleted.
    pub ingredients: Option<Vec<UpdateIngredientRequest>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl From<UpdateIngredientRequest> for IngredientPatch {
    fn from(request: UpdateIngredientRequest) -> Self {
        IngredientPatch {
            id: request.id,
            name: request.name,
            quantity: request.quantity,
            unit: request.unit,
        }
    }
}

/// Present-but-null deserializes to `Some(None)`, absent stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_whole_number<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    super::whole_number(deserializer).map(Some)
}

impl UpdateRecipeRequest {
    /// Lay the submitted fields over the stored recipe.
    fn merge(&self, current: &Recipe) -> RecipeDraft {
        fn pick<T: Clone>(submitted: &Option<Option<T>>, stored: Option<T>) -> Option<T> {
            match submitted {
                Some(value) => value.clone(),
                None => stored,
            }
        }

        RecipeDraft {
            title: pick(&self.title, Some(current.title.clone())),
            author: pick(&self.author, Some(current.author.clone())),
            description: pick(&self.description, Some(current.description.clone())),
            prep_time: pick(&self.prep_time, current.prep_time.map(i64::from)),
            cooking_time: pick(&self.cooking_time, current.cooking_time.map(i64::from)),
            servings: pick(&self.servings, current.servings.map(i64::from)),
            ingredients: Vec::new(),
        }
    }
}

#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Title already in use", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(store): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = super::recipe_id(&raw_id).ok_or_else(|| ApiError::NotFound(raw_id.clone()))?;
    let current = store
        .find_recipe(id)
        .await?
        .ok_or(ApiError::NotFound(raw_id))?;

    let Json(request) = payload.map_err(|e| ValidationError::Malformed(e.body_text()))?;
    let valid = validate::recipe(request.merge(&current))?;

    let plan = match request.ingredients {
        Some(submitted) => {
            let stored = store.list_ingredients(id).await?;
            let plan = reconcile::plan(
                &stored,
                submitted.into_iter().map(IngredientPatch::from).collect(),
            )?;
            tracing::debug!(
                "Recipe {}: {} ingredient changes, {} deletions",
                id,
                plan.changes.len(),
                plan.deletes.len()
            );
            Some(plan).filter(|p| !p.is_empty())
        }
        None => None,
    };

    let title = valid.fields.title.clone();
    store
        .update_recipe(id, valid.fields, plan)
        .await
        .map_err(|e| ApiError::from_store(e, &title))?;

    Ok(Json(CreateRecipeResponse { id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Recipe {
        Recipe {
            id: 1,
            title: "Soup".to_string(),
            author: "Ada".to_string(),
            description: "Warm".to_string(),
            prep_time: Some(10),
            cooking_time: Some(30),
            servings: Some(2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_omitted_fields_keep_stored_values() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"title": "Stew", "somethingElse": 1}"#).unwrap();
        let draft = request.merge(&stored());

        assert_eq!(draft.title.as_deref(), Some("Stew"));
        assert_eq!(draft.author.as_deref(), Some("Ada"));
        assert_eq!(draft.prep_time, Some(10));
        assert!(request.ingredients.is_none());
    }

    #[test]
    fn test_explicit_null_clears_field() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"servings": null, "author": null}"#).unwrap();
        let draft = request.merge(&stored());

        assert_eq!(draft.servings, None);
        assert_eq!(draft.cooking_time, Some(30));
        assert_eq!(
            validate::recipe(draft),
            Err(ValidationError::Missing("author"))
        );
    }

    #[test]
    fn test_empty_ingredient_list_is_kept() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"ingredients": []}"#).unwrap();
        assert_eq!(request.ingredients.map(|i| i.len()), Some(0));
    }

    #[test]
    fn test_whole_float_times_are_integers() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"servings": 3.0, "prepTime": null}"#).unwrap();
        let draft = request.merge(&stored());
        assert_eq!(draft.servings, Some(3));
        assert_eq!(draft.prep_time, None);

        let result = serde_json::from_str::<UpdateRecipeRequest>(r#"{"servings": 2.5}"#);
        assert!(result.is_err());
    }
}
