//! Command-line interface parsing for Gal Bar
//!
//! This module handles parsing of CLI arguments using clap for both binaries:
//! the interactive client (`galbar`) and the recipe service (`galbar-server`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::client::DEFAULT_SERVER_URL;
use crate::config::{
    ServiceConfig, DEFAULT_BIND_ADDR, DEFAULT_DATABASE_PATH, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::data::beer::PUNK_API_BASE_URL;
use crate::data::cocktail::COCKTAIL_API_BASE_URL;
use crate::store::DEFAULT_TABLE_NAME;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The service URL is not an http(s) URL
    #[error("Invalid server URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidServerUrl(String),

    /// The upstream timeout must be positive
    #[error("Invalid timeout: upstream timeout must be at least 1 second")]
    InvalidTimeout,
}

/// Gal Bar - look up, save and browse beer and cocktail recipes
#[derive(Parser, Debug)]
#[command(name = "galbar")]
#[command(about = "Interactive beer and cocktail recipe client")]
#[command(version)]
pub struct Cli {
    /// Base URL of the recipe service
    #[arg(long, env = "GALBAR_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Directory for the recent-lookups cache (defaults to the XDG cache dir)
    #[arg(long, env = "GALBAR_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for client startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Service URL the console client talks to
    pub server_url: String,
    /// Where recent lookups are kept between runs
    pub cache: CacheManager,
}

/// Checks that a service URL is http(s)
///
/// # Returns
/// * `Ok(String)` with the URL unchanged
/// * `Err(CliError::InvalidServerUrl)` otherwise
pub fn parse_server_url(s: &str) -> Result<String, CliError> {
    let lower = s.to_lowercase();
    let has_host = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"))
        .map_or(false, |rest| !rest.is_empty());
    if has_host {
        Ok(s.to_string())
    } else {
        Err(CliError::InvalidServerUrl(s.to_string()))
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Falls back to the current directory when no cache directory is given
    /// and no home directory can be found.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let server_url = parse_server_url(&cli.server_url)?;
        let cache = match &cli.cache_dir {
            Some(dir) => CacheManager::with_dir(dir.clone()),
            None => CacheManager::new().unwrap_or_else(|| CacheManager::with_dir(PathBuf::from("."))),
        };
        Ok(StartupConfig { server_url, cache })
    }
}

/// Gal Bar recipe service
#[derive(Parser, Debug)]
#[command(name = "galbar-server")]
#[command(about = "Beer and cocktail recipe service")]
#[command(version)]
pub struct ServerCli {
    #[command(flatten)]
    pub options: ServerOptions,

    #[command(subcommand)]
    pub command: Option<ServerCommand>,
}

/// Server subcommands; `serve` is the default
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// Run the HTTP service
    Serve,
    /// Create the saved-recipes table, then exit
    CreateTable,
}

/// Settings shared by all server subcommands
#[derive(Args, Debug, Clone)]
pub struct ServerOptions {
    /// Address to listen on
    #[arg(long, env = "GALBAR_BIND", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Punk API beers endpoint
    #[arg(long, env = "GALBAR_BEER_API", default_value = PUNK_API_BASE_URL)]
    pub beer_api: String,

    /// TheCocktailDB API root
    #[arg(long, env = "GALBAR_COCKTAIL_API", default_value = COCKTAIL_API_BASE_URL)]
    pub cocktail_api: String,

    /// Per-request timeout for upstream APIs, in seconds
    #[arg(long, env = "GALBAR_UPSTREAM_TIMEOUT", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout: u64,

    /// SQLite database file holding saved recipes
    #[arg(long, env = "GALBAR_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Table holding saved recipes
    #[arg(long, env = "GALBAR_TABLE", default_value = DEFAULT_TABLE_NAME)]
    pub table: String,

    /// Log filter (e.g. info, debug, galbar=trace)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerOptions {
    /// Builds the service configuration
    pub fn to_config(&self) -> Result<ServiceConfig, CliError> {
        if self.upstream_timeout == 0 {
            return Err(CliError::InvalidTimeout);
        }
        Ok(ServiceConfig {
            bind_addr: self.bind,
            beer_api_base: self.beer_api.clone(),
            cocktail_api_base: self.cocktail_api.clone(),
            upstream_timeout: Duration::from_secs(self.upstream_timeout),
            database_path: self.database.clone(),
            table_name: self.table.clone(),
        })
    }
}
