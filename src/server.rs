//! HTTP surface
//!
//! Routes:
//! - `GET /alive` liveness probe
//! - `GET /recipe?name=` resolve a recipe
//! - `POST /recipe` save a recipe (JSON body)
//! - `DELETE /recipe?name=&category=` delete a saved recipe
//! - `GET /random?category=` fresh random recipe
//! - `GET /category?category=` saved recipes of a category, oldest first
//!
//! Save and delete always answer 200 with a human-readable status line,
//! which the console client prints as is.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};

use crate::data::{Category, Ingredients, Recipe};
use crate::error::RecipeError;
use crate::resolver::RecipeResolver;

pub const RECIPE_ADDED: &str = "Recipe was added!";
pub const RECIPE_EXISTS: &str = "Recipe already in the DB!";
pub const RECIPE_INVALID: &str = "Not valid name or category!";
pub const RECIPE_DELETED: &str = "Recipe was deleted!";
pub const RECIPE_MISSING: &str = "Recipe does not exist!";

/// Error wrapper mapping the recipe error taxonomy onto HTTP statuses
#[derive(Debug)]
pub struct ApiError(pub RecipeError);

/// HTTP status for each error kind
pub fn status_for(err: &RecipeError) -> StatusCode {
    match err {
        RecipeError::NotFound => StatusCode::NOT_FOUND,
        RecipeError::MalformedUpstreamData(_) => StatusCode::BAD_GATEWAY,
        RecipeError::Conflict => StatusCode::CONFLICT,
        RecipeError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecipeError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RecipeError::InvalidRecipe(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, message.into()).into_response()
}

/// Parses a required `category` query value
fn parse_category(raw: Option<&str>) -> Result<Category, Response> {
    match raw {
        None => Err(bad_request("Missing 'category' query parameter")),
        Some(raw) => raw.parse().map_err(|e: String| bad_request(e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    name: Option<String>,
    category: Option<String>,
}

/// Body of `POST /recipe`
///
/// Everything is optional so a missing name or category gets the service's
/// own status line instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveRecipeRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Ingredients>,
}

impl SaveRecipeRequest {
    fn into_recipe(self) -> Option<Recipe> {
        let name = self.name.filter(|name| !name.trim().is_empty())?;
        let category = self.category?.parse::<Category>().ok()?;
        Some(Recipe::new(
            name,
            category,
            self.description.unwrap_or_default(),
            self.ingredients.unwrap_or_default(),
        ))
    }
}

/// GET /alive
async fn alive() -> &'static str {
    "ALIVE!"
}

/// GET /recipe?name=
async fn get_recipe(
    State(resolver): State<RecipeResolver>,
    Query(query): Query<NameQuery>,
) -> Response {
    let Some(name) = query.name else {
        return bad_request("Missing 'name' query parameter");
    };

    match resolver.resolve(&name).await {
        Ok(recipe) => Json(recipe).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// POST /recipe
async fn save_recipe(
    State(resolver): State<RecipeResolver>,
    Json(request): Json<SaveRecipeRequest>,
) -> Response {
    let Some(recipe) = request.into_recipe() else {
        return (StatusCode::OK, RECIPE_INVALID).into_response();
    };

    let message = match resolver.save(&recipe).await {
        Ok(_) => RECIPE_ADDED.to_string(),
        Err(RecipeError::Conflict) => RECIPE_EXISTS.to_string(),
        Err(RecipeError::InvalidRecipe(_)) => RECIPE_INVALID.to_string(),
        Err(err) => {
            warn!(error = %err, "save failed");
            format!("Error: {}", err)
        }
    };
    (StatusCode::OK, message).into_response()
}

/// DELETE /recipe?name=&category=
async fn delete_recipe(
    State(resolver): State<RecipeResolver>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let Some(name) = query.name else {
        return bad_request("Missing 'name' query parameter");
    };
    let category = match parse_category(query.category.as_deref()) {
        Ok(category) => category,
        Err(response) => return response,
    };

    match resolver.delete(&name, category).await {
        Ok(()) => (StatusCode::OK, RECIPE_DELETED).into_response(),
        Err(RecipeError::NotFound) => (StatusCode::OK, RECIPE_MISSING).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// GET /random?category=
async fn random_recipe(
    State(resolver): State<RecipeResolver>,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let category = match parse_category(query.category.as_deref()) {
        Ok(category) => category,
        Err(response) => return response,
    };

    match resolver.resolve_random(category).await {
        Ok(recipe) => Json(recipe).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// GET /category?category=
async fn category_recipes(
    State(resolver): State<RecipeResolver>,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let category = match parse_category(query.category.as_deref()) {
        Ok(category) => category,
        Err(response) => return response,
    };

    match resolver.list_by_category(category).await {
        Ok(recipes) => Json(recipes).into_response(),
        Err(RecipeError::NotFound) => (
            StatusCode::NOT_FOUND,
            format!("You haven't saved any recipes of {} yet!", category),
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// Builds the router with request tracing
pub fn router(resolver: RecipeResolver) -> Router {
    Router::new()
        .route("/alive", get(alive))
        .route(
            "/recipe",
            get(get_recipe).post(save_recipe).delete(delete_recipe),
        )
        .route("/random", get(random_recipe))
        .route("/category", get(category_recipes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(resolver)
}

/// Serves the router until Ctrl-C
pub async fn serve(listener: TcpListener, resolver: RecipeResolver) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "recipe service listening");
    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}
