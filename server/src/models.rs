use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// A stored recipe row. Serializes with storage (snake_case) names; the API
/// layer camelizes it on the way out.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[schema(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub prep_time: Option<i32>,
    pub cooking_time: Option<i32>,
    pub servings: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ingredient row as exposed to clients (timestamps are not selected).
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, ToSchema)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[schema(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub recipe_id: i32,
    pub quantity: f64,
    pub unit: String,
}

/// Validated scalar recipe fields, used for both insert and full update.
#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeFields {
    pub title: String,
    pub author: String,
    pub description: String,
    pub prep_time: Option<i32>,
    pub cooking_time: Option<i32>,
    pub servings: Option<i32>,
}

/// Validated ingredient fields. Used as the changeset when updating an
/// existing ingredient row.
#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct IngredientFields {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub recipe_id: i32,
    pub name: &'a str,
    pub quantity: f64,
    pub unit: &'a str,
}

impl<'a> NewIngredient<'a> {
    pub fn new(recipe_id: i32, fields: &'a IngredientFields) -> Self {
        Self {
            recipe_id,
            name: &fields.name,
            quantity: fields.quantity,
            unit: &fields.unit,
        }
    }
}
