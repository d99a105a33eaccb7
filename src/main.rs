//! Gal Bar - interactive recipe client
//!
//! A console menu that looks recipes up through the recipe service, keeps the
//! last few lookups in a local cache, and saves or deletes recipes.

use std::io;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use galbar::app::App;
use galbar::cli::{Cli, StartupConfig};
use galbar::client::RecipeApiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    // Quiet by default so log lines don't interleave with the menu
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let api = RecipeApiClient::new(config.server_url.as_str());
    if !api.alive().await {
        eprintln!("Recipe service at {} is not responding", api.base_url());
    }
    debug!(cache_dir = %config.cache.dir().display(), "using recent-lookups cache");

    let stdin = io::stdin();
    let mut app = App::new(api, config.cache, stdin.lock(), io::stdout());
    app.run().await?;

    Ok(())
}
