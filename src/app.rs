//! Console menu for Gal Bar
//!
//! This module holds the interactive client's state: the service client, the
//! recent-lookups cache, and the menu loop reading choices from any `BufRead`
//! and printing to any `Write`, so the loop can be driven from tests.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheManager, RecentLookups, RECENT_CAPACITY};
use crate::client::{ClientError, RecipeApiClient};
use crate::data::{Category, Recipe};
use crate::server::RECIPE_ADDED;

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    FetchByName,
    LastSearched,
    Random,
    Delete,
    BeerRecipes,
    CocktailRecipes,
    Exit,
}

impl MenuChoice {
    /// Parses a menu number (1-7)
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(MenuChoice::FetchByName),
            "2" => Some(MenuChoice::LastSearched),
            "3" => Some(MenuChoice::Random),
            "4" => Some(MenuChoice::Delete),
            "5" => Some(MenuChoice::BeerRecipes),
            "6" => Some(MenuChoice::CocktailRecipes),
            "7" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "1. Fetch a recipe by name (exact name!!!)
2. Get last recipe(s) searched
3. Get a Random recipe
4. Delete a recipe
5. Get all your beer recipes
6. Get all your cocktail recipes
7. exit
";

/// Formats an ingredient quantity for display
fn quantity_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Writes a recipe in the console layout
pub fn print_recipe<W: Write>(out: &mut W, recipe: &Recipe) -> io::Result<()> {
    writeln!(out, "{} {}", "Recipe name:".bold(), recipe.name)?;
    writeln!(out, "{} {}", "Category:".bold(), recipe.category)?;
    writeln!(out, "{} {}", "Description:".bold(), recipe.description)?;
    writeln!(out, "{}", "Ingredients:".bold())?;
    for (ingredient, quantity) in recipe.ingredients.iter() {
        writeln!(out, "{}: {}", ingredient, quantity_text(quantity))?;
    }
    if let Some(added_at) = recipe.added_at {
        writeln!(out, "{} {}", "Added_At:".bold(), added_at.to_rfc3339())?;
    }
    writeln!(out)
}

/// Interactive client state
pub struct App<R, W> {
    api: RecipeApiClient,
    cache: CacheManager,
    recent: RecentLookups,
    input: R,
    output: W,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl<R: BufRead, W: Write> App<R, W> {
    /// Creates the app, loading recent lookups from `cache`
    pub fn new(api: RecipeApiClient, cache: CacheManager, input: R, output: W) -> Self {
        let recent = RecentLookups::load(&cache);
        Self {
            api,
            cache,
            recent,
            input,
            output,
            should_quit: false,
        }
    }

    pub fn recent(&self) -> &RecentLookups {
        &self.recent
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Prints `message` and reads one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.should_quit = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks for Beer or Cocktail until one is picked
    fn prompt_category(&mut self) -> io::Result<Option<Category>> {
        loop {
            let Some(answer) = self.prompt("Choose category (press 1 or 2) \n 1. Beer \n 2. Cocktail")?
            else {
                return Ok(None);
            };
            match answer.as_str() {
                "1" => return Ok(Some(Category::Beer)),
                "2" => return Ok(Some(Category::Cocktail)),
                _ => writeln!(self.output, "Press 1 or 2 only!")?,
            }
        }
    }

    /// Prints a service failure; non-success responses are shown verbatim
    fn report(&mut self, err: &ClientError) -> io::Result<()> {
        match err {
            ClientError::Server { message, .. } => writeln!(self.output, "{}", message),
            ClientError::RequestFailed(_) => {
                writeln!(self.output, "There's a problem with the server: {}", err)
            }
        }
    }

    /// Runs the menu loop until exit or end of input
    pub async fn run(&mut self) -> io::Result<()> {
        while !self.should_quit {
            let Some(answer) = self.prompt(&format!("{}\nPlease enter your choice (1-7)", MENU))?
            else {
                break;
            };
            match MenuChoice::from_input(&answer) {
                Some(choice) => self.handle_choice(choice).await?,
                None => {
                    writeln!(self.output, "Invalid input! Please enter a number between 1-7.\n")?;
                    continue;
                }
            }
            if let Err(e) = self.recent.save(&self.cache) {
                warn!(error = %e, "could not write recent lookups");
            }
        }
        Ok(())
    }

    /// Performs one menu action
    pub async fn handle_choice(&mut self, choice: MenuChoice) -> io::Result<()> {
        match choice {
            MenuChoice::FetchByName => self.fetch_by_name().await,
            MenuChoice::LastSearched => self.show_last_searched(),
            MenuChoice::Random => self.random_recipe().await,
            MenuChoice::Delete => self.delete_recipe().await,
            MenuChoice::BeerRecipes => self.saved_recipes(Category::Beer).await,
            MenuChoice::CocktailRecipes => self.saved_recipes(Category::Cocktail).await,
            MenuChoice::Exit => {
                writeln!(self.output, "Exiting program...")?;
                self.should_quit = true;
                Ok(())
            }
        }
    }

    async fn fetch_by_name(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Enter the recipe name:")? else {
            return Ok(());
        };
        writeln!(self.output, "Fetching recipe by name...")?;

        let recipe = match self.recent.find(&name).cloned() {
            Some(cached) => cached,
            None => match self.api.get_recipe(&name).await {
                Ok(recipe) => recipe,
                Err(err) => return self.report(&err),
            },
        };

        self.recent.record(&name, &recipe);
        print_recipe(&mut self.output, &recipe)?;

        if recipe.is_saved() {
            return Ok(());
        }
        let Some(answer) = self.prompt("Do you want to save this recipe? (Enter Y as a yes)")?
        else {
            return Ok(());
        };
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(());
        }
        match self.api.save_recipe(&recipe).await {
            Ok(message) => {
                writeln!(self.output, "{}", message)?;
                if message == RECIPE_ADDED {
                    self.refresh_cached(&recipe).await;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }

    /// Replaces cached copies of a just-saved recipe with the stored record
    async fn refresh_cached(&mut self, recipe: &Recipe) {
        match self.api.get_recipe(&recipe.name).await {
            Ok(saved) if saved.key() == recipe.key() => self.recent.replace(&saved),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not refresh saved recipe in cache"),
        }
    }

    fn show_last_searched(&mut self) -> io::Result<()> {
        writeln!(self.output, "Fetching last recipe(s)...")?;
        let count = loop {
            let Some(answer) = self.prompt(&format!(
                "Enter the number of last recipes to fetch (1-{}), or press 'q' to quit:",
                RECENT_CAPACITY
            ))?
            else {
                return Ok(());
            };
            if answer.eq_ignore_ascii_case("q") {
                return Ok(());
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=RECENT_CAPACITY).contains(&n) => break n,
                _ => writeln!(
                    self.output,
                    "Invalid input! Please enter a number between 1 and {}.",
                    RECENT_CAPACITY
                )?,
            }
        };

        if self.recent.is_empty() {
            writeln!(self.output, "You haven't searched for any recipes yet!")?;
            return Ok(());
        }
        let recipes: Vec<Recipe> = self.recent.latest(count).cloned().collect();
        for recipe in &recipes {
            print_recipe(&mut self.output, recipe)?;
        }
        Ok(())
    }

    async fn random_recipe(&mut self) -> io::Result<()> {
        writeln!(self.output, "Fetching a random recipe...")?;
        let Some(category) = self.prompt_category()? else {
            return Ok(());
        };

        match self.api.random(category).await {
            Ok(recipe) => print_recipe(&mut self.output, &recipe),
            Err(err) => self.report(&err),
        }
    }

    async fn delete_recipe(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Enter the recipe name:")? else {
            return Ok(());
        };
        let Some(category) = self.prompt_category()? else {
            return Ok(());
        };

        writeln!(self.output, "Deleting the recipe...")?;
        match self.api.delete_recipe(&name, category).await {
            Ok(message) => writeln!(self.output, "{}", message),
            Err(err) => self.report(&err),
        }
    }

    async fn saved_recipes(&mut self, category: Category) -> io::Result<()> {
        writeln!(
            self.output,
            "Fetching all {} recipes...\n",
            category.as_str().to_lowercase()
        )?;
        match self.api.saved_recipes(category).await {
            Ok(recipes) => {
                for recipe in &recipes {
                    print_recipe(&mut self.output, recipe)?;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }
}
