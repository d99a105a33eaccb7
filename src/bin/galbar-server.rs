//! Gal Bar recipe service
//!
//! Serves recipe lookups over HTTP, or with `create-table` prepares the
//! saved-recipes table once before first use.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use galbar::cli::{ServerCli, ServerCommand};
use galbar::resolver::RecipeResolver;
use galbar::server;
use galbar::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = ServerCli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.options.log_level)?)
        .init();

    let config = cli.options.to_config()?;

    match cli.command.unwrap_or(ServerCommand::Serve) {
        ServerCommand::CreateTable => {
            SqliteStore::create_table(&config.database_path, &config.table_name)?;
            info!(
                table = %config.table_name,
                database = %config.database_path.display(),
                "saved-recipes table ready"
            );
        }
        ServerCommand::Serve => {
            let store = SqliteStore::open(&config.database_path, &config.table_name)
                .map_err(|e| {
                    error!(error = %e, "cannot open recipe store");
                    e
                })?;
            let resolver = RecipeResolver::from_config(&config, Arc::new(store));
            let listener = TcpListener::bind(config.bind_addr).await?;
            server::serve(listener, resolver).await?;
        }
    }

    Ok(())
}
