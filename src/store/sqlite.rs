//! SQLite-backed recipe store

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::RecipeStore;
use crate::data::{store_name, Category, Ingredients, Recipe};
use crate::error::RecipeError;

/// Table used when none is configured
pub const DEFAULT_TABLE_NAME: &str = "Gal_Bar";

/// Recipe store on a single SQLite connection
///
/// Calls run on the blocking thread pool; the connection is shared behind a
/// mutex so the store can be cloned into request handlers.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

/// A row as stored: ingredients are a JSON blob, `added_at` an RFC 3339 string
struct StoredRow {
    name: String,
    category: String,
    description: String,
    ingredients: String,
    added_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            category: row.get(1)?,
            description: row.get(2)?,
            ingredients: row.get(3)?,
            added_at: row.get(4)?,
        })
    }

    fn into_recipe(self) -> Result<Recipe, RecipeError> {
        let corrupt = |what: String| {
            RecipeError::StoreUnavailable(format!("corrupt record '{}': {}", self.name, what))
        };
        let category: Category = self.category.parse().map_err(corrupt)?;
        let ingredients: Ingredients =
            serde_json::from_str(&self.ingredients).map_err(|e| corrupt(e.to_string()))?;
        let added_at = DateTime::parse_from_rfc3339(&self.added_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Recipe {
            name: self.name.clone(),
            category,
            description: self.description.clone(),
            ingredients,
            added_at: Some(added_at),
        })
    }
}

/// Rejects table names that can't be spliced into SQL safely
fn validate_table_name(table: &str) -> Result<(), RecipeError> {
    let valid = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(RecipeError::StoreUnavailable(format!(
            "invalid table name '{}'",
            table
        )))
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, RecipeError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn create_table_on(conn: &Connection, table: &str) -> Result<(), RecipeError> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                ingredients TEXT NOT NULL,
                added_at TEXT NOT NULL,
                PRIMARY KEY (name, category)
            )",
            table
        ),
        [],
    )?;
    conn.execute(
        &format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_category ON {}(category, added_at)",
            table.to_lowercase(),
            table
        ),
        [],
    )?;
    Ok(())
}

impl SqliteStore {
    /// Opens an existing store
    ///
    /// Fails if the table hasn't been created yet (see `create_table`).
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, RecipeError> {
        validate_table_name(table)?;
        let conn = Connection::open(path.as_ref())?;
        if !table_exists(&conn, table)? {
            return Err(RecipeError::StoreUnavailable(format!(
                "table '{}' does not exist in {}, run `galbar-server create-table` first",
                table,
                path.as_ref().display()
            )));
        }
        Ok(Self::from_connection(conn, table))
    }

    /// Creates the recipe table (idempotent) and returns a store on it
    ///
    /// Setup helper, run once before the server is first started.
    pub fn create_table(path: impl AsRef<Path>, table: &str) -> Result<Self, RecipeError> {
        validate_table_name(table)?;
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!(table, path = %path.as_ref().display(), "Creating table");
        create_table_on(&conn, table)?;
        info!(table, "Table is now active");

        Ok(Self::from_connection(conn, table))
    }

    /// In-memory store with the table already created
    pub fn open_in_memory(table: &str) -> Result<Self, RecipeError> {
        validate_table_name(table)?;
        let conn = Connection::open_in_memory()?;
        create_table_on(&conn, table)?;
        Ok(Self::from_connection(conn, table))
    }

    fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Runs `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, RecipeError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> Result<T, RecipeError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| RecipeError::StoreUnavailable("store lock poisoned".to_string()))?;
            f(&guard, &table)
        })
        .await
        .map_err(|e| RecipeError::StoreUnavailable(e.to_string()))?
    }
}

#[async_trait]
impl RecipeStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<Recipe>, RecipeError> {
        let name = store_name(name);
        self.with_conn(move |conn, table| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT name, category, description, ingredients, added_at
                         FROM {} WHERE name = ?1 ORDER BY category LIMIT 1",
                        table
                    ),
                    params![name],
                    StoredRow::from_row,
                )
                .optional()?;
            row.map(StoredRow::into_recipe).transpose()
        })
        .await
    }

    async fn put_if_absent(&self, recipe: &Recipe) -> Result<Recipe, RecipeError> {
        if recipe.name.trim().is_empty() {
            return Err(RecipeError::InvalidRecipe("name is empty".to_string()));
        }

        // Stored at microsecond precision; the returned record must match a read
        let (name, category) = recipe.key();
        let stored = Recipe {
            name,
            category,
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            added_at: Some(Utc::now().trunc_subsecs(6)),
        };
        let ingredients = serde_json::to_string(&stored.ingredients)
            .map_err(|e| RecipeError::StoreUnavailable(e.to_string()))?;
        let added_at = stored
            .added_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_default();

        let row = stored.clone();
        let inserted = self
            .with_conn(move |conn, table| {
                let changed = conn.execute(
                    &format!(
                        "INSERT INTO {} (name, category, description, ingredients, added_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT(name, category) DO NOTHING",
                        table
                    ),
                    params![
                        row.name,
                        row.category.as_str(),
                        row.description,
                        ingredients,
                        added_at
                    ],
                )?;
                Ok(changed)
            })
            .await?;

        if inserted == 0 {
            debug!(name = %stored.name, category = %stored.category, "recipe already saved");
            return Err(RecipeError::Conflict);
        }
        info!(name = %stored.name, category = %stored.category, "recipe saved");
        Ok(stored)
    }

    async fn delete(&self, name: &str, category: Category) -> Result<(), RecipeError> {
        let name = store_name(name);
        let deleted = self
            .with_conn(move |conn, table| {
                Ok(conn.execute(
                    &format!("DELETE FROM {} WHERE name = ?1 AND category = ?2", table),
                    params![name, category.as_str()],
                )?)
            })
            .await?;

        if deleted == 0 {
            Err(RecipeError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn scan_by_category(&self, category: Category) -> Result<Vec<Recipe>, RecipeError> {
        self.with_conn(move |conn, table| {
            let mut stmt = conn.prepare(&format!(
                "SELECT name, category, description, ingredients, added_at
                 FROM {} WHERE category = ?1 ORDER BY added_at ASC",
                table
            ))?;
            let rows = stmt
                .query_map(params![category.as_str()], StoredRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(StoredRow::into_recipe).collect()
        })
        .await
    }
}
