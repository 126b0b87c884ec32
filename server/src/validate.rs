//! Request payload validation.
//!
//! Handlers turn their deserialized request bodies into a [`RecipeDraft`] and
//! call [`recipe`] before any store access. A draft either becomes a
//! [`ValidRecipe`] ready to persist or is rejected with the first violation
//! found.

use crate::models::{IngredientFields, RecipeFields};
use thiserror::Error;

/// Maximum length of the `author` field, in characters.
pub const MAX_AUTHOR_LEN: usize = 255;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Field cannot be empty: {0}")]
    Empty(&'static str),

    #[error("Field {field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Field {0} must be a non-negative integer")]
    NotNonNegative(&'static str),

    #[error("Ingredient {index} is missing required field: {field}")]
    IngredientMissing { index: usize, field: &'static str },

    #[error("Ingredient {index} quantity must be greater than 0")]
    IngredientQuantity { index: usize },
}

/// Candidate recipe, with every field optional so that absence is reported
/// by validation rather than by deserialization.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<i64>,
    pub cooking_time: Option<i64>,
    pub servings: Option<i64>,
    pub ingredients: Vec<IngredientDraft>,
}

#[derive(Debug, Clone, Default)]
pub struct IngredientDraft {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecipe {
    pub fields: RecipeFields,
    pub ingredients: Vec<IngredientFields>,
}

pub fn recipe(draft: RecipeDraft) -> Result<ValidRecipe, ValidationError> {
    let title = required_text("title", draft.title)?;
    let author = required_text("author", draft.author)?;
    if author.chars().count() > MAX_AUTHOR_LEN {
        return Err(ValidationError::TooLong {
            field: "author",
            max: MAX_AUTHOR_LEN,
        });
    }
    let description = required_text("description", draft.description)?;

    let fields = RecipeFields {
        title,
        author,
        description,
        prep_time: non_negative("prepTime", draft.prep_time)?,
        cooking_time: non_negative("cookingTime", draft.cooking_time)?,
        servings: non_negative("servings", draft.servings)?,
    };

    let ingredients = draft
        .ingredients
        .into_iter()
        .enumerate()
        .map(|(index, i)| ingredient(index, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidRecipe {
        fields,
        ingredients,
    })
}

/// Validate a single ingredient that is about to be created.
pub fn ingredient(index: usize, draft: IngredientDraft) -> Result<IngredientFields, ValidationError> {
    let name = present_text(draft.name).ok_or(ValidationError::IngredientMissing {
        index,
        field: "name",
    })?;
    let unit = present_text(draft.unit).ok_or(ValidationError::IngredientMissing {
        index,
        field: "unit",
    })?;
    let quantity = draft.quantity.ok_or(ValidationError::IngredientMissing {
        index,
        field: "quantity",
    })?;
    if !is_positive(quantity) {
        return Err(ValidationError::IngredientQuantity { index });
    }

    Ok(IngredientFields {
        name,
        quantity,
        unit,
    })
}

/// Quantities must be finite and strictly positive.
pub fn is_positive(quantity: f64) -> bool {
    quantity.is_finite() && quantity > 0.0
}

fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        None => Err(ValidationError::Missing(field)),
        Some(v) if v.trim().is_empty() => Err(ValidationError::Empty(field)),
        Some(v) => Ok(v),
    }
}

fn non_negative(field: &'static str, value: Option<i64>) -> Result<Option<i32>, ValidationError> {
    value
        .map(|v| {
            i32::try_from(v)
                .ok()
                .filter(|v| *v >= 0)
                .ok_or(ValidationError::NotNonNegative(field))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            title: Some("Pancakes".to_string()),
            author: Some("Ada".to_string()),
            description: Some("Fluffy".to_string()),
            prep_time: Some(5),
            cooking_time: None,
            servings: Some(4),
            ingredients: vec![IngredientDraft {
                name: Some("flour".to_string()),
                quantity: Some(1.5),
                unit: Some("cup".to_string()),
            }],
        }
    }

    #[test]
    fn test_valid_recipe() {
        let valid = recipe(draft()).unwrap();
        assert_eq!(valid.fields.title, "Pancakes");
        assert_eq!(valid.fields.prep_time, Some(5));
        assert_eq!(valid.fields.cooking_time, None);
        assert_eq!(valid.ingredients.len(), 1);
        assert_eq!(valid.ingredients[0].quantity, 1.5);
    }

    #[test]
    fn test_missing_title() {
        let mut d = draft();
        d.title = None;
        assert_eq!(recipe(d), Err(ValidationError::Missing("title")));
    }

    #[test]
    fn test_empty_description() {
        let mut d = draft();
        d.description = Some("   ".to_string());
        assert_eq!(recipe(d), Err(ValidationError::Empty("description")));
    }

    #[test]
    fn test_author_length_limit() {
        let mut d = draft();
        d.author = Some("a".repeat(MAX_AUTHOR_LEN));
        assert!(recipe(d.clone()).is_ok());

        d.author = Some("a".repeat(MAX_AUTHOR_LEN + 1));
        assert_eq!(
            recipe(d),
            Err(ValidationError::TooLong {
                field: "author",
                max: MAX_AUTHOR_LEN
            })
        );
    }

    #[test]
    fn test_negative_and_overflowing_times() {
        let mut d = draft();
        d.servings = Some(-1);
        assert_eq!(recipe(d), Err(ValidationError::NotNonNegative("servings")));

        let mut d = draft();
        d.cooking_time = Some(i64::from(i32::MAX) + 1);
        assert_eq!(
            recipe(d),
            Err(ValidationError::NotNonNegative("cookingTime"))
        );

        let mut d = draft();
        d.prep_time = Some(0);
        assert!(recipe(d).is_ok());
    }

    #[test]
    fn test_ingredient_quantity_must_be_positive() {
        let mut d = draft();
        d.ingredients[0].quantity = Some(0.0);
        assert_eq!(
            recipe(d),
            Err(ValidationError::IngredientQuantity { index: 0 })
        );
    }

    #[test]
    fn test_ingredient_missing_fields() {
        let mut d = draft();
        d.ingredients.push(IngredientDraft {
            name: Some("egg".to_string()),
            quantity: Some(2.0),
            unit: None,
        });
        assert_eq!(
            recipe(d),
            Err(ValidationError::IngredientMissing {
                index: 1,
                field: "unit"
            })
        );
    }
}
