//! Error taxonomy shared by the normalizers, the store and the resolver

use thiserror::Error;

/// Errors that can occur while resolving, normalizing or persisting recipes
#[derive(Debug, Error)]
pub enum RecipeError {
    /// No matching recipe in the store or in either upstream API
    #[error("No such recipe!")]
    NotFound,

    /// Upstream responded but the payload broke our schema assumptions
    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    /// A recipe with the same name and category is already saved
    #[error("Recipe already in the DB!")]
    Conflict,

    /// Network failure talking to an upstream API
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The persistence backend failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Name or category missing on a recipe submitted for saving
    #[error("Not valid name or category!")]
    InvalidRecipe(String),
}

impl From<serde_json::Error> for RecipeError {
    fn from(err: serde_json::Error) -> Self {
        RecipeError::MalformedUpstreamData(err.to_string())
    }
}

impl From<rusqlite::Error> for RecipeError {
    fn from(err: rusqlite::Error) -> Self {
        RecipeError::StoreUnavailable(err.to_string())
    }
}
