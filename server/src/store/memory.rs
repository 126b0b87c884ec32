//! In-memory store for handler tests.

use super::{RecipeStore, StoreError};
use crate::models::{Ingredient, IngredientFields, Recipe, RecipeFields};
use crate::reconcile::{IngredientChange, IngredientPlan};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Debug, Default, Clone)]
struct Tables {
    recipes: Vec<Recipe>,
    ingredients: Vec<Ingredient>,
    next_recipe_id: i32,
    next_ingredient_id: i32,
}

impl Tables {
    fn check_title(&self, title: &str, except: Option<i32>) -> Result<(), StoreError> {
        let taken = self
            .recipes
            .iter()
            .any(|r| r.title == title && Some(r.id) != except);
        if taken {
            return Err(StoreError::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"recipes_title_key\": {title}"
            )));
        }
        Ok(())
    }

    fn insert_ingredient(&mut self, recipe_id: i32, fields: &IngredientFields) {
        self.next_ingredient_id += 1;
        self.ingredients.push(Ingredient {
            id: self.next_ingredient_id,
            name: fields.name.clone(),
            recipe_id,
            quantity: fields.quantity,
            unit: fields.unit.clone(),
        });
    }
}

/// Behaves like [`super::PgStore`]: unique titles, cascading deletes and
/// all-or-nothing writes. `fail_with` makes every call return a query error.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(message: &str) -> Self {
        Self {
            tables: Mutex::default(),
            failure: Some(message.to_string()),
        }
    }

    /// Number of ingredient rows across all recipes.
    pub fn ingredient_count(&self) -> usize {
        self.tables.lock().unwrap().ingredients.len()
    }

    /// Every call is one query, as with the database-backed store.
    fn check(&self) -> Result<(), StoreError> {
        let _span = tracing::info_span!("db.query", store = "memory").entered();
        match &self.failure {
            Some(message) => Err(StoreError::Query(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().recipes.clone())
    }

    async fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_ingredients(&self, recipe_id: i32) -> Result<Vec<Ingredient>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .ingredients
            .iter()
            .filter(|i| i.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    async fn create_recipe(
        &self,
        recipe: RecipeFields,
        ingredients: Vec<IngredientFields>,
    ) -> Result<i32, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.check_title(&recipe.title, None)?;

        tables.next_recipe_id += 1;
        let id = tables.next_recipe_id;
        let now = Utc::now();
        tables.recipes.push(Recipe {
            id,
            title: recipe.title,
            author: recipe.author,
            description: recipe.description,
            prep_time: recipe.prep_time,
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            created_at: now,
            updated_at: now,
        });
        for fields in &ingredients {
            tables.insert_ingredient(id, fields);
        }

        Ok(id)
    }

    async fn update_recipe(
        &self,
        id: i32,
        recipe: RecipeFields,
        plan: Option<IngredientPlan>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.check_title(&recipe.title, Some(id))?;

        if let Some(row) = tables.recipes.iter_mut().find(|r| r.id == id) {
            row.title = recipe.title;
            row.author = recipe.author;
            row.description = recipe.description;
            row.prep_time = recipe.prep_time;
            row.cooking_time = recipe.cooking_time;
            row.servings = recipe.servings;
            row.updated_at = Utc::now();
        }

        let Some(plan) = plan else {
            return Ok(());
        };

        for change in &plan.changes {
            match change {
                IngredientChange::Insert(fields) => tables.insert_ingredient(id, fields),
                IngredientChange::Update {
                    id: ingredient_id,
                    fields,
                } => {
                    if let Some(row) = tables
                        .ingredients
                        .iter_mut()
                        .find(|i| i.id == *ingredient_id && i.recipe_id == id)
                    {
                        row.name = fields.name.clone();
                        row.quantity = fields.quantity;
                        row.unit = fields.unit.clone();
                    }
                }
            }
        }
        tables
            .ingredients
            .retain(|i| !(i.recipe_id == id && plan.deletes.contains(&i.id)));

        Ok(())
    }

    async fn delete_recipe(&self, id: i32) -> Result<usize, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != id);
        tables.ingredients.retain(|i| i.recipe_id != id);
        Ok(before - tables.recipes.len())
    }
}
