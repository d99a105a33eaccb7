//! TheCocktailDB client and cocktail normalization
//!
//! Cocktail responses wrap zero or more drinks in a `drinks` list (or `null`).
//! Each drink spells its ingredients as numbered field pairs
//! `strIngredient1..15` / `strMeasure1..15`, filled contiguously from 1.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{fetch, Category, Fetched, Ingredients, Recipe};
use crate::error::RecipeError;

/// Default base URL for TheCocktailDB (free tier key `1`)
pub const COCKTAIL_API_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";

/// Number of numbered ingredient slots a drink can carry
pub const MAX_INGREDIENT_SLOTS: usize = 15;

/// Search or random-pick response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CocktailSearch {
    /// `null` upstream when nothing matched
    #[serde(default)]
    pub drinks: Option<Vec<Drink>>,
}

/// One drink entry
#[derive(Debug, Clone, Deserialize)]
pub struct Drink {
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    /// Every other field, including the numbered ingredient slots
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl Drink {
    /// Iterates `(ingredient, measure)` pairs from slot 1 up to the first gap
    pub fn ingredient_slots(&self) -> IngredientSlots<'_> {
        IngredientSlots {
            drink: self,
            next_slot: 1,
        }
    }

    fn slot_ingredient(&self, slot: usize) -> Option<&str> {
        match self.fields.get(&format!("strIngredient{}", slot)) {
            Some(Value::String(ingredient)) if !ingredient.is_empty() => Some(ingredient.as_str()),
            _ => None,
        }
    }

    fn slot_measure(&self, slot: usize) -> Value {
        self.fields
            .get(&format!("strMeasure{}", slot))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Iterator over a drink's numbered ingredient slots
///
/// Stops at the first slot whose ingredient is absent, null or empty, even if
/// later slots are filled, and never goes past `MAX_INGREDIENT_SLOTS`.
#[derive(Debug)]
pub struct IngredientSlots<'a> {
    drink: &'a Drink,
    next_slot: usize,
}

impl<'a> Iterator for IngredientSlots<'a> {
    type Item = (&'a str, Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_slot > MAX_INGREDIENT_SLOTS {
            return None;
        }
        let slot = self.next_slot;
        match self.drink.slot_ingredient(slot) {
            Some(ingredient) => {
                self.next_slot += 1;
                Some((ingredient, self.drink.slot_measure(slot)))
            }
            None => {
                self.next_slot = MAX_INGREDIENT_SLOTS + 1;
                None
            }
        }
    }
}

impl CocktailSearch {
    /// Picks the drink to normalize
    ///
    /// With a target name, the first drink whose name matches it ignoring case;
    /// without one, the first drink.
    pub fn select(&self, target: Option<&str>) -> Option<&Drink> {
        let drinks = self.drinks.as_deref().unwrap_or(&[]);
        match target {
            Some(target) => {
                let target = target.to_lowercase();
                drinks.iter().find(|drink| drink.name.to_lowercase() == target)
            }
            None => drinks.first(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drinks.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Converts a cocktail response into a canonical recipe
///
/// # Returns
/// * `Ok(Recipe)` for the selected drink
/// * `Err(RecipeError::NotFound)` if no drink was selected
/// * `Err(RecipeError::MalformedUpstreamData)` if the drink has no
///   instructions or no ingredient in slot 1
pub fn normalize_cocktail(
    search: &CocktailSearch,
    target: Option<&str>,
) -> Result<Recipe, RecipeError> {
    let drink = search.select(target).ok_or(RecipeError::NotFound)?;
    let description = drink.instructions.as_deref().ok_or_else(|| {
        RecipeError::MalformedUpstreamData(format!(
            "drink '{}' is missing 'strInstructions'",
            drink.name
        ))
    })?;

    let mut ingredients = Ingredients::new();
    for (ingredient, measure) in drink.ingredient_slots() {
        ingredients.insert(ingredient, measure);
    }
    if ingredients.is_empty() {
        return Err(RecipeError::MalformedUpstreamData(format!(
            "drink '{}' has no ingredients",
            drink.name
        )));
    }

    Ok(Recipe::new(
        drink.name.as_str(),
        Category::Cocktail,
        description,
        ingredients,
    ))
}

/// Client for TheCocktailDB
#[derive(Debug, Clone)]
pub struct CocktailClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl CocktailClient {
    /// Creates a client against the given base URL (e.g. `COCKTAIL_API_BASE_URL`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Searches drinks by name
    ///
    /// A timed-out or 404 search yields an empty response.
    pub async fn search(&self, name: &str) -> Result<CocktailSearch, RecipeError> {
        let url = format!("{}/search.php", self.base_url);
        let request = self
            .http_client
            .get(&url)
            .query(&[("s", name)])
            .timeout(self.timeout);

        let search: CocktailSearch = match fetch(request).await? {
            Fetched::Body(body) => serde_json::from_str(&body)?,
            Fetched::Missing => CocktailSearch::default(),
            Fetched::TimedOut => {
                warn!(query = name, "cocktail search timed out, treating as no match");
                CocktailSearch::default()
            }
        };
        debug!(
            query = name,
            count = search.drinks.as_ref().map_or(0, Vec::len),
            "cocktail search returned"
        );
        Ok(search)
    }

    /// Fetches one random drink
    pub async fn random(&self) -> Result<CocktailSearch, RecipeError> {
        let url = format!("{}/random.php", self.base_url);
        let request = self.http_client.get(&url).timeout(self.timeout);

        match fetch(request).await? {
            Fetched::Body(body) => Ok(serde_json::from_str(&body)?),
            Fetched::Missing => Err(RecipeError::NotFound),
            Fetched::TimedOut => Err(RecipeError::UpstreamUnavailable(
                "random cocktail request timed out".to_string(),
            )),
        }
    }
}
