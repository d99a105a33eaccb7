//! Gal Bar Library
//!
//! Recipe aggregation over the Punk API (beer) and TheCocktailDB (cocktails):
//! normalization into one `Recipe` shape, a saved-recipes store, the HTTP
//! service, and the console client's building blocks.

pub mod app;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod resolver;
pub mod server;
pub mod store;
