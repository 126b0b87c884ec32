use super::{RecipeStore, StoreError};
use crate::db::{self, DbPool};
use crate::models::{Ingredient, IngredientFields, NewIngredient, Recipe, RecipeFields};
use crate::reconcile::{IngredientChange, IngredientPlan};
use crate::schema::{ingredients, recipes};
use async_trait::async_trait;
use diesel::prelude::*;

/// PostgreSQL-backed store. Each call checks a connection out of the pool
/// for the duration of one logical operation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        db::with_conn(&self.pool, "list_recipes", |conn| {
            recipes::table
                .select(Recipe::as_select())
                .order(recipes::id.asc())
                .load(conn)
        })
        .await
    }

    async fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        db::with_conn(&self.pool, "find_recipe", move |conn| {
            recipes::table
                .find(id)
                .select(Recipe::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn list_ingredients(&self, recipe_id: i32) -> Result<Vec<Ingredient>, StoreError> {
        db::with_conn(&self.pool, "list_ingredients", move |conn| {
            ingredients::table
                .filter(ingredients::recipe_id.eq(recipe_id))
                .select(Ingredient::as_select())
                .order(ingredients::id.asc())
                .load(conn)
        })
        .await
    }

    async fn create_recipe(
        &self,
        recipe: RecipeFields,
        new_ingredients: Vec<IngredientFields>,
    ) -> Result<i32, StoreError> {
        db::with_conn(&self.pool, "create_recipe", move |conn| {
            conn.transaction(|conn| {
                let recipe_id: i32 = diesel::insert_into(recipes::table)
                    .values(&recipe)
                    .returning(recipes::id)
                    .get_result(conn)?;

                if !new_ingredients.is_empty() {
                    let rows: Vec<NewIngredient> = new_ingredients
                        .iter()
                        .map(|i| NewIngredient::new(recipe_id, i))
                        .collect();

                    diesel::insert_into(ingredients::table)
                        .values(&rows)
                        .execute(conn)?;
                }

                Ok(recipe_id)
            })
        })
        .await
    }

    async fn update_recipe(
        &self,
        id: i32,
        recipe: RecipeFields,
        plan: Option<IngredientPlan>,
    ) -> Result<(), StoreError> {
        db::with_conn(&self.pool, "update_recipe", move |conn| {
            conn.transaction(|conn| {
                diesel::update(recipes::table.find(id))
                    .set(&recipe)
                    .execute(conn)?;

                let Some(plan) = plan else {
                    return Ok(());
                };

                for change in &plan.changes {
                    match change {
                        IngredientChange::Insert(fields) => {
                            diesel::insert_into(ingredients::table)
                                .values(NewIngredient::new(id, fields))
                                .execute(conn)?;
                        }
                        IngredientChange::Update {
                            id: ingredient_id,
                            fields,
                        } => {
                            diesel::update(
                                ingredients::table
                                    .filter(ingredients::id.eq(*ingredient_id))
                                    .filter(ingredients::recipe_id.eq(id)),
                            )
                            .set(fields)
                            .execute(conn)?;
                        }
                    }
                }

                if !plan.deletes.is_empty() {
                    diesel::delete(
                        ingredients::table
                            .filter(ingredients::id.eq_any(plan.deletes))
                            .filter(ingredients::recipe_id.eq(id)),
                    )
                    .execute(conn)?;
                }

                Ok(())
            })
        })
        .await
    }

    async fn delete_recipe(&self, id: i32) -> Result<usize, StoreError> {
        db::with_conn(&self.pool, "delete_recipe", move |conn| {
            diesel::delete(recipes::table.find(id)).execute(conn)
        })
        .await
    }
}
