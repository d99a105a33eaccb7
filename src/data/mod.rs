//! Core data models for Gal Bar
//!
//! This module contains the canonical `Recipe` representation that every
//! upstream format is normalized into, plus the beer and cocktail API clients.

pub mod beer;
pub mod cocktail;

pub use beer::{normalize_beer, BeerClient, BeerRecord};
pub use cocktail::{normalize_cocktail, CocktailClient, CocktailSearch, Drink};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecipeError;

/// Outcome of a single upstream GET
#[derive(Debug)]
pub(crate) enum Fetched {
    Body(String),
    /// Upstream answered 404
    Missing,
    /// Request exceeded its timeout
    TimedOut,
}

/// Sends an upstream request and reads the body
///
/// Timeouts and 404s are reported as values so callers can treat them as
/// "no match"; other failures become `UpstreamUnavailable`.
pub(crate) async fn fetch(request: reqwest::RequestBuilder) -> Result<Fetched, RecipeError> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) if err.is_timeout() => return Ok(Fetched::TimedOut),
        Err(err) => return Err(RecipeError::UpstreamUnavailable(err.to_string())),
    };

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(Fetched::Missing);
    }
    if !status.is_success() {
        return Err(RecipeError::UpstreamUnavailable(format!(
            "{} answered {}",
            response.url(),
            status
        )));
    }

    match response.text().await {
        Ok(body) => Ok(Fetched::Body(body)),
        Err(err) if err.is_timeout() => Ok(Fetched::TimedOut),
        Err(err) => Err(RecipeError::UpstreamUnavailable(err.to_string())),
    }
}

/// Recipe category; together with the lower-cased name it forms the store key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Beer,
    Cocktail,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beer => "Beer",
            Category::Cocktail => "Cocktail",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beer" => Ok(Category::Beer),
            "cocktail" => Ok(Category::Cocktail),
            other => Err(format!("Unknown category: '{}'. Valid categories: Beer, Cocktail", other)),
        }
    }
}

/// Ordered ingredient label to quantity mapping
///
/// Keeps source order. Inserting an existing label replaces its value in
/// place, so the last write wins while the first position is kept. Values are
/// JSON so upstream fields with no fixed type (beer yeast, empty cocktail
/// measures) pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredients(Map<String, Value>);

impl Ingredients {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Inserts or overwrites an ingredient
    pub fn insert(&mut self, label: impl Into<String>, quantity: impl Into<Value>) {
        self.0.insert(label.into(), quantity.into());
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0.get(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates ingredients in source order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// The canonical recipe record
///
/// Field names on the wire follow the service's JSON format (`Name`,
/// `Category`, `Description`, `Ingredients`, `Added_At`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recipe {
    /// Display name; stored lower-cased
    pub name: String,
    pub category: Category,
    /// Brewing or preparation instructions
    pub description: String,
    pub ingredients: Ingredients,
    /// Set only once the recipe has been saved
    #[serde(rename = "Added_At", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

/// Normalizes a recipe name into its store key form
///
/// Surrounding whitespace is dropped and the rest lower-cased, so lookups,
/// saves and deletes all agree on the key.
pub fn store_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Recipe {
    /// Builds a transient (unsaved) recipe
    pub fn new(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        ingredients: Ingredients,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            ingredients,
            added_at: None,
        }
    }

    /// Store key: normalized name plus category
    pub fn key(&self) -> (String, Category) {
        (store_name(&self.name), self.category)
    }

    pub fn is_saved(&self) -> bool {
        self.added_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_parsing_is_case_insensitive() {
        assert_eq!("Beer".parse::<Category>().unwrap(), Category::Beer);
        assert_eq!("cocktail".parse::<Category>().unwrap(), Category::Cocktail);
        assert_eq!(" COCKTAIL ".parse::<Category>().unwrap(), Category::Cocktail);
        assert!("wine".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Beer.to_string(), "Beer");
        assert_eq!(Category::Cocktail.to_string(), "Cocktail");
    }

    #[test]
    fn test_ingredients_overwrite_keeps_first_position() {
        let mut ingredients = Ingredients::new();
        ingredients.insert("Amarillo", "1 kg");
        ingredients.insert("Simcoe", "25 g add in start for bitter");
        ingredients.insert("Amarillo", "10 g add in end for flavour");

        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients.labels(), vec!["Amarillo", "Simcoe"]);
        assert_eq!(
            ingredients.get("Amarillo"),
            Some(&json!("10 g add in end for flavour"))
        );
    }

    #[test]
    fn test_recipe_json_field_names() {
        let mut ingredients = Ingredients::new();
        ingredients.insert("Rum", "2 oz");
        let recipe = Recipe::new("Mojito", Category::Cocktail, "Muddle.", ingredients);

        let value = serde_json::to_value(&recipe).expect("serialize");
        assert_eq!(value["Name"], "Mojito");
        assert_eq!(value["Category"], "Cocktail");
        assert_eq!(value["Description"], "Muddle.");
        assert_eq!(value["Ingredients"]["Rum"], "2 oz");
        assert!(value.get("Added_At").is_none(), "transient recipes have no Added_At");
    }

    #[test]
    fn test_recipe_parses_saved_record() {
        let value = json!({
            "Name": "punk ipa",
            "Category": "Beer",
            "Description": "Hoppy",
            "Ingredients": {"Pale": "1 kg", "yeast": "Ale"},
            "Added_At": "2024-07-15T05:30:00Z"
        });

        let recipe: Recipe = serde_json::from_value(value).expect("deserialize");
        assert!(recipe.is_saved());
        assert_eq!(recipe.category, Category::Beer);
        assert_eq!(recipe.ingredients.labels(), vec!["Pale", "yeast"]);
    }

    #[test]
    fn test_key_lowercases_name() {
        let recipe = Recipe::new("Punk IPA", Category::Beer, "", Ingredients::new());
        assert_eq!(recipe.key(), ("punk ipa".to_string(), Category::Beer));
    }
}
