//! Session state as a value plus a pure transition function.
//!
//! [`SessionState::reduce`] never performs I/O; it returns the [`Effect`]s the caller has to
//! run. [`driver::Session`] is the async runtime that does so.

use chrono::{DateTime, Utc};

use crate::{
    error::WeatherError,
    model::{Coordinates, DailyBlock, ForecastResult, Suggestion},
    projector,
    suggest::{self, SuggestionResult},
};

pub mod driver;

pub use driver::Session;

/// Something that happened: user input or a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The search text changed.
    QueryChanged(String),
    /// A suggestion lookup finished.
    SuggestionsArrived {
        generation: u64,
        result: SuggestionResult,
    },
    /// The user picked the suggestion at this index.
    SuggestionSelected(usize),
    /// The user confirmed the search text; picks the first suggestion if there is one.
    QuerySubmitted,
    /// Manual refresh of the current location.
    RefreshRequested,
    /// A forecast request finished.
    ForecastArrived {
        generation: u64,
        result: Result<ForecastResult, WeatherError>,
    },
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a debounced lookup, replacing any pending one.
    ScheduleSuggestions { query: String, generation: u64 },
    /// Drop any pending lookup.
    CancelSuggestions,
    FetchForecast {
        coordinates: Coordinates,
        generation: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub coordinates: Option<Coordinates>,
    pub forecast: Option<ForecastResult>,
    /// Single-slot user-facing error, overwritten by the next failure.
    pub error: Option<String>,
    pub loading: bool,
    /// A suggestion lookup is scheduled or in flight.
    pub searching: bool,
    pub suggestion_generation: u64,
    pub forecast_generation: u64,
}

impl SessionState {
    pub fn reduce(self, event: Event) -> (SessionState, Vec<Effect>) {
        match event {
            Event::QueryChanged(query) => self.query_changed(query),
            Event::SuggestionsArrived { generation, result } => {
                (self.suggestions_arrived(generation, result), Vec::new())
            }
            Event::SuggestionSelected(index) => self.select(index),
            Event::QuerySubmitted => self.select(0),
            Event::RefreshRequested => self.refresh(),
            Event::ForecastArrived { generation, result } => {
                (self.forecast_arrived(generation, result), Vec::new())
            }
        }
    }

    /// Refresh is offered only with a location chosen and nothing loading.
    pub fn can_refresh(&self) -> bool {
        self.coordinates.is_some() && !self.loading
    }

    /// The week to display, starting today at the forecast location.
    pub fn week(&self, now: DateTime<Utc>) -> DailyBlock {
        match &self.forecast {
            Some(forecast) => forecast.week(now),
            None => projector::project(None, "UTC", now),
        }
    }

    fn query_changed(mut self, query: String) -> (SessionState, Vec<Effect>) {
        self.suggestion_generation += 1;
        let searchable = suggest::is_searchable(&query);
        self.query = query;

        if !searchable {
            self.suggestions.clear();
            self.searching = false;
            return (self, vec![Effect::CancelSuggestions]);
        }

        self.searching = true;
        let effect = Effect::ScheduleSuggestions {
            query: self.query.clone(),
            generation: self.suggestion_generation,
        };
        (self, vec![effect])
    }

    fn suggestions_arrived(mut self, generation: u64, result: SuggestionResult) -> SessionState {
        if generation != self.suggestion_generation {
            tracing::debug!(generation, current = self.suggestion_generation, "dropping stale suggestions");
            return self;
        }

        self.searching = false;
        match result {
            Ok(suggestions) if suggestions.is_empty() => self.suggestions.clear(),
            Ok(suggestions) => {
                self.suggestions = suggestions;
                self.error = None;
            }
            Err(err) => {
                self.suggestions.clear();
                self.error = Some(err.to_string());
            }
        }
        self
    }

    fn select(mut self, index: usize) -> (SessionState, Vec<Effect>) {
        let Some(choice) = self.suggestions.get(index) else {
            return (self, Vec::new());
        };

        let coordinates = match choice.coordinates() {
            Ok(coordinates) => coordinates,
            Err(err) => {
                self.error = Some(err.to_string());
                return (self, Vec::new());
            }
        };

        self.query = choice.label();
        self.suggestions.clear();
        self.searching = false;
        // Invalidates a lookup that may still be on its way.
        self.suggestion_generation += 1;
        self.coordinates = Some(coordinates);

        let (state, fetch) = self.start_fetch(coordinates);
        (state, vec![Effect::CancelSuggestions, fetch])
    }

    fn refresh(self) -> (SessionState, Vec<Effect>) {
        match self.coordinates {
            Some(coordinates) if !self.loading => {
                let (state, fetch) = self.start_fetch(coordinates);
                (state, vec![fetch])
            }
            _ => (self, Vec::new()),
        }
    }

    fn start_fetch(mut self, coordinates: Coordinates) -> (SessionState, Effect) {
        self.forecast_generation += 1;
        self.loading = true;
        let effect = Effect::FetchForecast {
            coordinates,
            generation: self.forecast_generation,
        };
        (self, effect)
    }

    fn forecast_arrived(
        mut self,
        generation: u64,
        result: Result<ForecastResult, WeatherError>,
    ) -> SessionState {
        if generation != self.forecast_generation {
            tracing::debug!(generation, current = self.forecast_generation, "dropping stale forecast");
            return self;
        }

        self.loading = false;
        match result {
            Ok(forecast) => {
                self.forecast = Some(forecast);
                self.error = None;
            }
            Err(err) => {
                self.forecast = None;
                self.error = Some(err.to_string());
            }
        }
        self
    }
}
