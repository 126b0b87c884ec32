pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::error::ApiError;
use crate::AppState;
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Deserializer};
use utoipa::OpenApi;

const COLLECTION_METHODS: &[&str] = &["GET", "POST"];
const ITEM_METHODS: &[&str] = &["GET", "PATCH", "DELETE"];

/// Returns the router for the /recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(list::list_recipes)
                .post(create::create_recipe)
                .head(collection_not_allowed)
                .fallback(collection_not_allowed),
        )
        .route(
            "/recipes/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe)
                .head(item_not_allowed)
                .fallback(item_not_allowed),
        )
}

/// Ids are taken from the path as text: anything that is not an `i32`
/// cannot name a stored recipe.
fn recipe_id(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

/// Accept any JSON number with no fractional part, so `5` and `5.0` both
/// read as 5.
pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {number}")))
}

async fn collection_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed {
        method,
        allowed: COLLECTION_METHODS,
    }
}

async fn item_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed {
        method,
        allowed: ITEM_METHODS,
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        create::CreateIngredientRequest,
        create::CreateRecipeResponse,
        list::ListRecipesResponse,
        get::RecipeResponse,
        update::UpdateRecipeRequest,
        update::UpdateIngredientRequest,
        crate::models::Recipe,
        crate::models::Ingredient,
    ))
)]
pub struct ApiDoc;
