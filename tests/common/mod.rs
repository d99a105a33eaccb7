//! Shared helpers for integration tests
//!
//! Runs a fake Punk API and a fake TheCocktailDB on a local port so the
//! resolver and HTTP surface can be exercised without the network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use galbar::data::{BeerClient, CocktailClient};
use galbar::resolver::RecipeResolver;
use galbar::server;
use galbar::store::{SqliteStore, DEFAULT_TABLE_NAME};

/// Upstream timeout used by test resolvers
pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);

pub fn punk_ipa() -> Value {
    json!({
        "id": 192,
        "name": "Punk IPA 2007 - 2010",
        "description": "Our flagship beer that kick started the craft beer revolution.",
        "ingredients": {
            "malt": [{"name": "Extra Pale", "amount": {"value": 5.3, "unit": "kilograms"}}],
            "hops": [
                {"name": "Ahtanum", "amount": {"value": 17.5, "unit": "grams"}, "add": "start", "attribute": "bitter"},
                {"name": "Chinook", "amount": {"value": 15, "unit": "grams"}, "add": "middle", "attribute": "flavour"}
            ],
            "yeast": "Wyeast 1056 - American Ale"
        }
    })
}

fn mojito_beer() -> Value {
    json!({
        "name": "Mojito Sour",
        "description": "A beer that borrows a cocktail's name.",
        "ingredients": {
            "malt": [{"name": "Pilsner", "amount": {"value": 4, "unit": "kilograms"}}],
            "hops": [],
            "yeast": "Lager"
        }
    })
}

pub fn drink(name: &str, ingredients: &[(&str, &str)]) -> Value {
    let mut drink = json!({
        "strDrink": name,
        "strInstructions": format!("Make a {}.", name),
    });
    let fields = drink.as_object_mut().expect("object");
    for (slot, (ingredient, measure)) in ingredients.iter().enumerate() {
        fields.insert(format!("strIngredient{}", slot + 1), json!(ingredient));
        fields.insert(format!("strMeasure{}", slot + 1), json!(measure));
    }
    drink
}

async fn beer_search(Query(params): Query<HashMap<String, String>>) -> Response {
    let name = params.get("beer_name").cloned().unwrap_or_default().to_lowercase();
    match name.as_str() {
        "punk ipa" => Json(json!([punk_ipa()])).into_response(),
        "mojito" => Json(json!([mojito_beer()])).into_response(),
        "broken" => Json(json!([{"name": "Broken", "description": "No ingredients"}])).into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!([punk_ipa()])).into_response()
        }
        "down" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn beer_random() -> Json<Value> {
    Json(punk_ipa())
}

async fn cocktail_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let name = params.get("s").cloned().unwrap_or_default().to_lowercase();
    let drinks = match name.as_str() {
        "mojito" => json!([
            drink("Mojito #3", &[("Rum", "1 oz")]),
            drink("Mojito", &[("Light rum", "2 oz"), ("Lime", "1"), ("Mint", "4 leaves")]),
        ]),
        "old fashioned" => json!([
            drink("Old Fashioned #2", &[("Rye", "2 oz")]),
            drink("Old Fashioned", &[("Bourbon", "2 oz"), ("Angostura bitters", "2 dashes"), ("Sugar", "1 cube")]),
        ]),
        "broken" | "slow" | "down" => json!([drink(&name, &[("Gin", "1 oz")])]),
        "margarita" => json!([drink("Margarita", &[("Tequila", "1 1/2 oz"), ("Triple sec", "1/2 oz")])]),
        "negroni" => json!([drink("Negroni", &[("Gin", "1 oz"), ("Campari", "1 oz"), ("Sweet Vermouth", "1 oz")])]),
        "daiquiri" => json!([drink("Daiquiri", &[("Light rum", "1 1/2 oz"), ("Lime", "Juice of 1/2")])]),
        "gimlet" => json!([drink("Gimlet", &[("Gin", "1 1/2 oz"), ("Lime juice", "1/2 oz")])]),
        "sidecar" => json!([drink("Sidecar", &[("Cognac", "2 oz"), ("Cointreau", "1 oz")])]),
        _ => Value::Null,
    };
    Json(json!({ "drinks": drinks }))
}

async fn cocktail_random() -> Json<Value> {
    Json(json!({"drinks": [drink("Negroni", &[("Gin", "1 oz"), ("Campari", "1 oz")])]}))
}

/// Starts the fake upstream APIs, returning their address
pub async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/beers", get(beer_search))
        .route("/beers/random", get(beer_random))
        .route("/cocktails/search.php", get(cocktail_search))
        .route("/cocktails/random.php", get(cocktail_random));
    spawn(app).await
}

/// Serves `app` on an ephemeral local port
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

/// Resolver wired to the fake upstreams and a fresh in-memory store
pub async fn test_resolver() -> (RecipeResolver, Arc<SqliteStore>) {
    let upstream = spawn_upstream().await;
    let store = Arc::new(SqliteStore::open_in_memory(DEFAULT_TABLE_NAME).expect("store"));
    let resolver = RecipeResolver::new(
        store.clone(),
        BeerClient::new(format!("http://{}/beers", upstream), TEST_TIMEOUT),
        CocktailClient::new(format!("http://{}/cocktails", upstream), TEST_TIMEOUT),
    );
    (resolver, store)
}

/// Runs the full recipe service on a local port and returns its base URL
pub async fn spawn_service() -> (String, Arc<SqliteStore>) {
    let (resolver, store) = test_resolver().await;
    let addr = spawn(server::router(resolver)).await;
    (format!("http://{}/", addr), store)
}
