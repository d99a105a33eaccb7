//! Punk API beer client and beer normalization
//!
//! Beer records carry a structured ingredient graph (malt list, hop list and a
//! yeast field). Normalization flattens it into the canonical ingredient map:
//! malts first, then hops, then a single `yeast` entry.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::{debug, warn};

use super::{fetch, Category, Fetched, Ingredients, Recipe};
use crate::error::RecipeError;

/// Default base URL for the Punk API
pub const PUNK_API_BASE_URL: &str = "https://punkapi.online/v3/beers";

/// Fixed ingredient label for the yeast entry
pub const YEAST_KEY: &str = "yeast";

/// One beer object as returned by the Punk API
///
/// Only the fields normalization needs are modelled. The ones whose absence
/// makes a record unusable are optional here so the normalizer can report
/// exactly which one is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct BeerRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<BeerIngredients>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeerIngredients {
    pub malt: Option<Vec<Malt>>,
    pub hops: Option<Vec<Hop>>,
    /// Shape varies between API versions (string or object); passed through
    pub yeast: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Malt {
    pub name: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hop {
    pub name: String,
    pub amount: Amount,
    /// Brewing stage the hop goes in at (start, middle, end, dry hop)
    pub add: String,
    pub attribute: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amount {
    pub value: Number,
    pub unit: String,
}

impl Amount {
    fn describe(&self) -> String {
        format!("{} {}", self.value, self.unit)
    }
}

fn missing(field: &str) -> RecipeError {
    RecipeError::MalformedUpstreamData(format!("beer record is missing '{}'", field))
}

/// Converts one upstream beer object into a canonical recipe
///
/// # Returns
/// * `Ok(Recipe)` with `malt + hops + 1` ingredient entries (fewer only when
///   a hop name collides with an earlier label)
/// * `Err(RecipeError::MalformedUpstreamData)` if the name, description,
///   ingredients object, malt list, hop list or yeast field is absent
pub fn normalize_beer(record: &BeerRecord) -> Result<Recipe, RecipeError> {
    let name = record.name.as_deref().ok_or_else(|| missing("name"))?;
    let description = record
        .description
        .as_deref()
        .ok_or_else(|| missing("description"))?;
    let source = record
        .ingredients
        .as_ref()
        .ok_or_else(|| missing("ingredients"))?;
    let malts = source.malt.as_ref().ok_or_else(|| missing("ingredients.malt"))?;
    let hops = source.hops.as_ref().ok_or_else(|| missing("ingredients.hops"))?;
    let yeast = source
        .yeast
        .as_ref()
        .ok_or_else(|| missing("ingredients.yeast"))?;

    let mut ingredients = Ingredients::new();
    for malt in malts {
        ingredients.insert(malt.name.as_str(), malt.amount.describe());
    }
    for hop in hops {
        ingredients.insert(
            hop.name.as_str(),
            format!(
                "{} add in {} for {}",
                hop.amount.describe(),
                hop.add,
                hop.attribute
            ),
        );
    }
    ingredients.insert(YEAST_KEY, yeast.clone());

    Ok(Recipe::new(name, Category::Beer, description, ingredients))
}

/// Client for the Punk API
#[derive(Debug, Clone)]
pub struct BeerClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl BeerClient {
    /// Creates a client against the given base URL (e.g. `PUNK_API_BASE_URL`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Searches beers by name and returns the first match
    ///
    /// A timed-out or 404 search counts as "no match". Only the first record
    /// is decoded, so a broken record further down the list is ignored.
    pub async fn search(&self, name: &str) -> Result<Option<BeerRecord>, RecipeError> {
        let request = self
            .http_client
            .get(&self.base_url)
            .query(&[("beer_name", name), ("page", "1")])
            .timeout(self.timeout);

        let body = match fetch(request).await? {
            Fetched::Body(body) => body,
            Fetched::Missing => return Ok(None),
            Fetched::TimedOut => {
                warn!(query = name, "beer search timed out, treating as no match");
                return Ok(None);
            }
        };

        let matches: Vec<Value> = serde_json::from_str(&body)?;
        debug!(query = name, count = matches.len(), "beer search returned");
        match matches.into_iter().next() {
            Some(first) => Ok(Some(serde_json::from_value(first)?)),
            None => Ok(None),
        }
    }

    /// Fetches one random beer
    pub async fn random(&self) -> Result<BeerRecord, RecipeError> {
        let url = format!("{}/random", self.base_url);
        let request = self.http_client.get(&url).timeout(self.timeout);

        match fetch(request).await? {
            Fetched::Body(body) => Ok(serde_json::from_str(&body)?),
            Fetched::Missing => Err(RecipeError::NotFound),
            Fetched::TimedOut => Err(RecipeError::UpstreamUnavailable(
                "random beer request timed out".to_string(),
            )),
        }
    }
}
