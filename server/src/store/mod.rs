//! Persistence seam for the recipe handlers.
//!
//! Handlers only talk to a [`RecipeStore`]. [`PgStore`] is the production
//! implementation; tests swap in an in-memory store with the same behaviour.

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Ingredient, IngredientFields, Recipe, RecipeFields};
use crate::reconcile::IngredientPlan;
use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate entry: {0}")]
    UniqueViolation(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Database task failed: {0}")]
    Task(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::UniqueViolation(info.message().to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}

/// Recipe persistence.
///
/// Every method is one logical store operation. Implementations must apply
/// `create_recipe` and `update_recipe` atomically.
#[async_trait]
pub trait RecipeStore: Send + Sync + fmt::Debug {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError>;

    async fn list_ingredients(&self, recipe_id: i32) -> Result<Vec<Ingredient>, StoreError>;

    /// Insert the recipe and all of its ingredients, returning the new id.
    async fn create_recipe(
        &self,
        recipe: RecipeFields,
        ingredients: Vec<IngredientFields>,
    ) -> Result<i32, StoreError>;

    /// Overwrite the recipe's scalar fields, then apply `ingredients` if
    /// given: inserts and updates in plan order, then deletes.
    async fn update_recipe(
        &self,
        id: i32,
        recipe: RecipeFields,
        ingredients: Option<IngredientPlan>,
    ) -> Result<(), StoreError>;

    /// Delete the recipe (its ingredients cascade). Returns rows removed.
    async fn delete_recipe(&self, id: i32) -> Result<usize, StoreError>;
}
