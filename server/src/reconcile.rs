//! Ingredient reconciliation for recipe updates.
//!
//! Given the ingredients currently stored for a recipe and the list a client
//! submitted, [`plan`] works out which rows to insert, update and delete. The
//! plan is computed up front so that a bad entry rejects the whole request
//! before anything is written.

use crate::models::{Ingredient, IngredientFields};
use crate::validate::{self, IngredientDraft, ValidationError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("New ingredients are missing required fields: name, quantity, or unit")]
    MissingFields { index: usize },

    #[error("Ingredient quantity must be greater than 0")]
    InvalidQuantity { index: usize },
}

/// One submitted ingredient entry. Entries whose `id` matches a stored
/// ingredient update it; everything else is a new ingredient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientPatch {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngredientChange {
    Insert(IngredientFields),
    Update { id: i32, fields: IngredientFields },
}

/// Ordered writes for a recipe's ingredients: `changes` in submission order,
/// then `deletes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientPlan {
    pub changes: Vec<IngredientChange>,
    pub deletes: Vec<i32>,
}

impl IngredientPlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletes.is_empty()
    }
}

pub fn plan(
    current: &[Ingredient],
    submitted: Vec<IngredientPatch>,
) -> Result<IngredientPlan, ReconcileError> {
    let existing: HashMap<i32, &Ingredient> = current.iter().map(|i| (i.id, i)).collect();

    let kept: HashSet<i32> = submitted
        .iter()
        .filter_map(|p| p.id)
        .filter(|id| existing.contains_key(id))
        .collect();

    let mut changes = Vec::with_capacity(submitted.len());
    for (index, patch) in submitted.into_iter().enumerate() {
        match patch.id.and_then(|id| existing.get(&id).copied()) {
            Some(stored) => changes.push(IngredientChange::Update {
                id: stored.id,
                fields: merge(index, stored, patch)?,
            }),
            None => {
                let draft = IngredientDraft {
                    name: patch.name,
                    quantity: patch.quantity,
                    unit: patch.unit,
                };
                let fields = validate::ingredient(index, draft).map_err(|e| match e {
                    ValidationError::IngredientQuantity { .. } => {
                        ReconcileError::InvalidQuantity { index }
                    }
                    _ => ReconcileError::MissingFields { index },
                })?;
                changes.push(IngredientChange::Insert(fields));
            }
        }
    }

    let deletes = current
        .iter()
        .map(|i| i.id)
        .filter(|id| !kept.contains(id))
        .collect();

    Ok(IngredientPlan { changes, deletes })
}

/// Fill fields the client left out from the stored row.
fn merge(
    index: usize,
    stored: &Ingredient,
    patch: IngredientPatch,
) -> Result<IngredientFields, ReconcileError> {
    let quantity = match patch.quantity {
        Some(q) if !validate::is_positive(q) => {
            return Err(ReconcileError::InvalidQuantity { index })
        }
        Some(q) => q,
        None => stored.quantity,
    };

    Ok(IngredientFields {
        name: patch
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| stored.name.clone()),
        quantity,
        unit: patch
            .unit
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| stored.unit.clone()),
    })
}
