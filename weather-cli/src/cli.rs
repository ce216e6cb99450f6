use std::{fmt, sync::Arc};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use weather_core::{
    Config, Coordinates, Event, ForecastProvider, ForecastResult, OpenMeteoProvider, Session,
    Suggestion, provider_from_config, suggest,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Search places and show their weather forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the geocoding and forecast endpoints.
    Configure,

    /// Look up a place by name and show its forecast.
    Search {
        /// City or address, at least two characters.
        query: String,

        /// Take the best match instead of asking.
        #[arg(long)]
        first: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the forecast for explicit coordinates.
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search, pick and refresh in a loop.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query, first, json } => {
                let provider = load_provider()?;
                search(&provider, &query, first, json).await
            }
            Command::Forecast {
                latitude,
                longitude,
                json,
            } => {
                let provider = load_provider()?;
                let coordinates = Coordinates::new(latitude, longitude)?;
                let forecast = provider.forecast(coordinates).await?;
                print_forecast(None, &forecast, json)
            }
            Command::Interactive => interactive(load_provider()?).await,
        }
    }
}

fn load_provider() -> anyhow::Result<OpenMeteoProvider> {
    let config = Config::load()?;
    provider_from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let geocoding_url = Text::new("Geocoding endpoint:")
        .with_default(&config.geocoding_url)
        .prompt()?;
    let forecast_url = Text::new("Forecast endpoint:")
        .with_default(&config.forecast_url)
        .prompt()?;

    config.geocoding_url = geocoding_url;
    config.forecast_url = forecast_url;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(provider: &OpenMeteoProvider, query: &str, first: bool, json: bool) -> anyhow::Result<()> {
    if !suggest::is_searchable(query) {
        bail!("Search text must be at least {} characters long.", suggest::MIN_QUERY_CHARS);
    }

    let mut suggestions = suggest::lookup(provider, query).await?;
    if suggestions.is_empty() {
        bail!("No places found for '{query}'.");
    }

    let choice = if first || suggestions.len() == 1 {
        suggestions.swap_remove(0)
    } else {
        let index = pick(&suggestions)?;
        suggestions.swap_remove(index)
    };

    let forecast = provider.forecast(choice.coordinates()?).await?;
    print_forecast(Some(choice.label().as_str()), &forecast, json)
}

fn print_forecast(location: Option<&str>, forecast: &ForecastResult, json: bool) -> anyhow::Result<()> {
    let week = forecast.week(Utc::now());
    if json {
        let out = render::render_json(location, forecast, &week)
            .context("Failed to serialize forecast to JSON")?;
        println!("{out}");
    } else {
        println!("{}", render::render_forecast(location, forecast, &week));
    }
    Ok(())
}

/// One row in the suggestion picker.
struct Choice<'a>(&'a Suggestion);

impl fmt::Display for Choice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        match s.admin1.as_deref() {
            Some(admin1) => write!(f, "{}, {} ({})", s.name, admin1, s.country_code),
            None => write!(f, "{} ({})", s.name, s.country_code),
        }
    }
}

fn pick(suggestions: &[Suggestion]) -> anyhow::Result<usize> {
    let options: Vec<Choice<'_>> = suggestions.iter().map(Choice).collect();
    let picked = Select::new("Choose a location:", options).raw_prompt()?;
    Ok(picked.index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Refresh,
    NewSearch,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::Refresh => "Refresh",
            MenuAction::NewSearch => "New search",
            MenuAction::Quit => "Quit",
        })
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

async fn interactive(provider: OpenMeteoProvider) -> anyhow::Result<()> {
    let provider = Arc::new(provider);
    let mut session = Session::new(provider.clone(), provider);

    'search: loop {
        let query = match Text::new("Search location:")
            .with_placeholder("Enter city or address")
            .prompt()
        {
            Ok(query) => query,
            Err(err) if is_cancel(&err) => break,
            Err(err) => return Err(err.into()),
        };

        session.dispatch(Event::QueryChanged(query));
        let state = session.settle_suggestions().await;
        if let Some(error) = &state.error {
            eprintln!("{error}");
        }
        if state.suggestions.is_empty() {
            println!("No matching places.");
            continue;
        }

        match pick(&state.suggestions) {
            Ok(index) => session.dispatch(Event::SuggestionSelected(index)),
            Err(err) if err.downcast_ref::<InquireError>().is_some_and(is_cancel) => continue,
            Err(err) => return Err(err),
        }

        loop {
            let state = session.settle_forecast().await;
            match (&state.forecast, &state.error) {
                (Some(forecast), _) => {
                    let week = state.week(Utc::now());
                    println!("{}", render::render_forecast(Some(state.query.as_str()), forecast, &week));
                }
                (None, Some(error)) => eprintln!("{error}"),
                (None, None) => {}
            }

            let mut actions = Vec::new();
            if state.can_refresh() {
                actions.push(MenuAction::Refresh);
            }
            actions.extend([MenuAction::NewSearch, MenuAction::Quit]);

            match Select::new("Next:", actions).prompt() {
                Ok(MenuAction::Refresh) => session.dispatch(Event::RefreshRequested),
                Ok(MenuAction::NewSearch) => continue 'search,
                Ok(MenuAction::Quit) => break 'search,
                Err(err) if is_cancel(&err) => break 'search,
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}
