//! Persistence gateway for saved recipes
//!
//! Recipes are keyed by lower-cased name plus category. The backend must
//! provide an atomic insert-if-absent; `SqliteStore` maps it onto
//! `INSERT ... ON CONFLICT DO NOTHING`.

mod sqlite;

pub use sqlite::{SqliteStore, DEFAULT_TABLE_NAME};

use async_trait::async_trait;

use crate::data::{Category, Recipe};
use crate::error::RecipeError;

/// Storage operations the resolver and HTTP surface rely on
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Looks up a saved recipe by name (case-insensitive), Beer first when
    /// both categories exist
    async fn get(&self, name: &str) -> Result<Option<Recipe>, RecipeError>;

    /// Saves a recipe, stamping `added_at`
    ///
    /// Fails with `Conflict` if the key already exists; the stored record is
    /// left untouched.
    async fn put_if_absent(&self, recipe: &Recipe) -> Result<Recipe, RecipeError>;

    /// Deletes a saved recipe, failing with `NotFound` if it didn't exist
    async fn delete(&self, name: &str, category: Category) -> Result<(), RecipeError>;

    /// All saved recipes of a category, oldest save first
    async fn scan_by_category(&self, category: Category) -> Result<Vec<Recipe>, RecipeError>;
}
