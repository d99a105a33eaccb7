//! Recipe resolution: saved recipes first, then both upstream APIs
//!
//! Beer always wins when the beer search has a match; the cocktail result is
//! only used once the beer search has definitely come back empty.

use std::sync::Arc;

use futures::future;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::data::{
    normalize_beer, normalize_cocktail, BeerClient, BeerRecord, Category, CocktailClient,
    CocktailSearch, Recipe,
};
use crate::error::RecipeError;
use crate::store::RecipeStore;

/// Resolves recipe names against the store and the upstream APIs
#[derive(Clone)]
pub struct RecipeResolver {
    store: Arc<dyn RecipeStore>,
    beers: BeerClient,
    cocktails: CocktailClient,
}

impl RecipeResolver {
    pub fn new(store: Arc<dyn RecipeStore>, beers: BeerClient, cocktails: CocktailClient) -> Self {
        Self {
            store,
            beers,
            cocktails,
        }
    }

    /// Builds upstream clients from the configured URLs and timeout
    pub fn from_config(config: &ServiceConfig, store: Arc<dyn RecipeStore>) -> Self {
        Self::new(
            store,
            BeerClient::new(config.beer_api_base.as_str(), config.upstream_timeout),
            CocktailClient::new(config.cocktail_api_base.as_str(), config.upstream_timeout),
        )
    }

    /// Looks a recipe up by name
    ///
    /// # Returns
    /// * the saved recipe, unchanged, if one exists under this name
    /// * otherwise the normalized beer match, or failing that the cocktail
    ///   whose name equals `name` ignoring case
    /// * `Err(RecipeError::NotFound)` if nothing matches anywhere
    pub async fn resolve(&self, name: &str) -> Result<Recipe, RecipeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecipeError::NotFound);
        }

        if let Some(saved) = self.store.get(name).await? {
            debug!(recipe = name, "resolved from store");
            return Ok(saved);
        }

        let (beer, cocktail) =
            future::join(self.beers.search(name), self.cocktails.search(name)).await;
        let recipe = arbitrate(name, beer, cocktail)?;
        info!(recipe = name, category = %recipe.category, "resolved from upstream");
        Ok(recipe)
    }

    /// Fetches a fresh random recipe of the given category; never reads the store
    pub async fn resolve_random(&self, category: Category) -> Result<Recipe, RecipeError> {
        match category {
            Category::Beer => normalize_beer(&self.beers.random().await?),
            Category::Cocktail => normalize_cocktail(&self.cocktails.random().await?, None),
        }
    }

    /// Saved recipes of a category, oldest first
    ///
    /// Returns `NotFound` when nothing of that category has been saved.
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Recipe>, RecipeError> {
        let recipes = self.store.scan_by_category(category).await?;
        if recipes.is_empty() {
            return Err(RecipeError::NotFound);
        }
        Ok(recipes)
    }

    pub async fn save(&self, recipe: &Recipe) -> Result<Recipe, RecipeError> {
        self.store.put_if_absent(recipe).await
    }

    pub async fn delete(&self, name: &str, category: Category) -> Result<(), RecipeError> {
        self.store.delete(name, category).await
    }
}

/// Applies beer priority to the two upstream outcomes
///
/// A failed or malformed beer search is reported as is, never masked by a
/// cocktail match.
fn arbitrate(
    name: &str,
    beer: Result<Option<BeerRecord>, RecipeError>,
    cocktail: Result<CocktailSearch, RecipeError>,
) -> Result<Recipe, RecipeError> {
    if let Some(record) = beer? {
        return normalize_beer(&record);
    }

    let search = cocktail?;
    if search.is_empty() {
        return Err(RecipeError::NotFound);
    }
    normalize_cocktail(&search, Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn beer() -> BeerRecord {
        serde_json::from_value(json!({
            "name": "Mojito Gose",
            "description": "Sour.",
            "ingredients": {
                "malt": [{"name": "Wheat", "amount": {"value": 2, "unit": "kg"}}],
                "hops": [],
                "yeast": "Lacto"
            }
        }))
        .expect("beer")
    }

    fn cocktails() -> CocktailSearch {
        serde_json::from_value(json!({"drinks": [{
            "strDrink": "Mojito",
            "strInstructions": "Muddle.",
            "strIngredient1": "Rum",
            "strMeasure1": "2 oz"
        }]}))
        .expect("cocktails")
    }

    #[test]
    fn test_beer_wins_over_cocktail() {
        let recipe = arbitrate("mojito", Ok(Some(beer())), Ok(cocktails())).expect("resolved");
        assert_eq!(recipe.category, Category::Beer);
        assert_eq!(recipe.name, "Mojito Gose");
    }

    #[test]
    fn test_cocktail_used_when_beer_empty() {
        let recipe = arbitrate("mojito", Ok(None), Ok(cocktails())).expect("resolved");
        assert_eq!(recipe.category, Category::Cocktail);
        assert_eq!(recipe.name, "Mojito");
    }

    #[test]
    fn test_nothing_anywhere_is_not_found() {
        let result = arbitrate("mojito", Ok(None), Ok(CocktailSearch::default()));
        assert!(matches!(result, Err(RecipeError::NotFound)));
    }

    #[test]
    fn test_malformed_beer_not_masked_by_cocktail() {
        let result = arbitrate(
            "mojito",
            Err(RecipeError::MalformedUpstreamData("bad".to_string())),
            Ok(cocktails()),
        );
        assert!(matches!(result, Err(RecipeError::MalformedUpstreamData(_))));
    }

    #[test]
    fn test_beer_record_missing_fields_is_malformed() {
        let broken: BeerRecord =
            serde_json::from_value(json!({"name": "Broken", "description": "x"})).expect("parses");
        let result = arbitrate("broken", Ok(Some(broken)), Ok(cocktails()));
        assert!(matches!(result, Err(RecipeError::MalformedUpstreamData(_))));
    }

    #[test]
    fn test_unavailable_beer_blocks_fallback() {
        let result = arbitrate(
            "mojito",
            Err(RecipeError::UpstreamUnavailable("connection refused".to_string())),
            Ok(cocktails()),
        );
        assert!(matches!(result, Err(RecipeError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_unavailable_cocktail_ignored_when_beer_matches() {
        let result = arbitrate(
            "mojito",
            Ok(Some(beer())),
            Err(RecipeError::UpstreamUnavailable("down".to_string())),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_cocktail_list_without_exact_name_is_not_found() {
        let result = arbitrate("mojito #3", Ok(None), Ok(cocktails()));
        assert!(matches!(result, Err(RecipeError::NotFound)));
    }
}
