//! Service configuration
//!
//! Every endpoint, path and timeout the server talks to is passed in here at
//! startup. `Default` holds values meant for local development only.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::beer::PUNK_API_BASE_URL;
use crate::data::cocktail::COCKTAIL_API_BASE_URL;
use crate::store::DEFAULT_TABLE_NAME;

/// Default per-upstream request timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Default address the HTTP surface binds to
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "galbar.db";

/// Configuration for the recipe service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the HTTP surface listens on
    pub bind_addr: SocketAddr,
    /// Punk API beers endpoint
    pub beer_api_base: String,
    /// TheCocktailDB API root
    pub cocktail_api_base: String,
    /// Timeout applied to each upstream request
    pub upstream_timeout: Duration,
    /// SQLite database file for saved recipes
    pub database_path: PathBuf,
    /// Table holding saved recipes
    pub table_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            beer_api_base: PUNK_API_BASE_URL.to_string(),
            cocktail_api_base: COCKTAIL_API_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_local_dev() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.beer_api_base, "https://punkapi.online/v3/beers");
        assert_eq!(
            config.cocktail_api_base,
            "https://www.thecocktaildb.com/api/json/v1/1"
        );
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.table_name, "Gal_Bar");
    }
}
