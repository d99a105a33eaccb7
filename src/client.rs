//! HTTP client for the recipe service, used by the console app

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::data::{Category, Recipe};

/// Default service URL for local development
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000/";

/// Errors that can occur when talking to the recipe service
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service answered with a non-success status; `message` is its body
    #[error("{message}")]
    Server { status: u16, message: String },
}

/// Client for the recipe service's HTTP surface
#[derive(Debug, Clone)]
pub struct RecipeApiClient {
    http_client: Client,
    base_url: String,
}

impl RecipeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Returns the body of a successful response, or the service's message
    async fn text(response: Response) -> Result<String, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Server {
                status: status.as_u16(),
                message: body,
            })
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::Server {
                status: status.as_u16(),
                message: response.text().await?,
            })
        }
    }

    /// Checks the liveness probe
    pub async fn alive(&self) -> bool {
        match self.http_client.get(self.url("alive")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// `GET /recipe?name=`
    pub async fn get_recipe(&self, name: &str) -> Result<Recipe, ClientError> {
        let response = self
            .http_client
            .get(self.url("recipe"))
            .query(&[("name", name)])
            .send()
            .await?;
        Self::json(response).await
    }

    /// `POST /recipe`; returns the service's status line
    pub async fn save_recipe(&self, recipe: &Recipe) -> Result<String, ClientError> {
        let response = self
            .http_client
            .post(self.url("recipe"))
            .json(recipe)
            .send()
            .await?;
        Self::text(response).await
    }

    /// `DELETE /recipe?name=&category=`; returns the service's status line
    pub async fn delete_recipe(
        &self,
        name: &str,
        category: Category,
    ) -> Result<String, ClientError> {
        let response = self
            .http_client
            .delete(self.url("recipe"))
            .query(&[("name", name), ("category", category.as_str())])
            .send()
            .await?;
        Self::text(response).await
    }

    /// `GET /random?category=`
    pub async fn random(&self, category: Category) -> Result<Recipe, ClientError> {
        let response = self
            .http_client
            .get(self.url("random"))
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        Self::json(response).await
    }

    /// `GET /category?category=`
    pub async fn saved_recipes(&self, category: Category) -> Result<Vec<Recipe>, ClientError> {
        let response = self
            .http_client
            .get(self.url("category"))
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        Self::json(response).await
    }
}
