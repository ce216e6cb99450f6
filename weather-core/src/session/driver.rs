use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    provider::{ForecastProvider, Geocoder},
    suggest::SuggestionResolver,
};

use super::{Effect, Event, SessionState};

/// Owns the session state and runs the effects its transitions ask for.
///
/// Completions come back through a channel and are applied one at a time by
/// [`next`](Session::next), so the state is only ever touched from the caller's task.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    resolver: SuggestionResolver,
    forecaster: Arc<dyn ForecastProvider>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl Session {
    pub fn new(geocoder: Arc<dyn Geocoder>, forecaster: Arc<dyn ForecastProvider>) -> Self {
        Self::with_resolver(SuggestionResolver::new(geocoder), forecaster)
    }

    pub fn with_resolver(resolver: SuggestionResolver, forecaster: Arc<dyn ForecastProvider>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::default(),
            resolver,
            forecaster,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply an event and start whatever work it requires.
    pub fn dispatch(&mut self, event: Event) {
        let (state, effects) = std::mem::take(&mut self.state).reduce(event);
        self.state = state;
        for effect in effects {
            self.run(effect);
        }
    }

    /// Wait for the next completed request and apply it.
    pub async fn next(&mut self) -> &SessionState {
        // The session keeps a sender alive, so the channel never closes.
        if let Some(event) = self.events_rx.recv().await {
            self.dispatch(event);
        }
        &self.state
    }

    /// Process completions until the suggestion lookup settles.
    pub async fn settle_suggestions(&mut self) -> &SessionState {
        while self.state.searching {
            self.next().await;
        }
        &self.state
    }

    /// Process completions until no forecast is loading.
    pub async fn settle_forecast(&mut self) -> &SessionState {
        while self.state.loading {
            self.next().await;
        }
        &self.state
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleSuggestions { query, generation } => {
                let rx = self.resolver.resolve(&query);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    // A superseded lookup closes its channel without a result.
                    if let Ok(result) = rx.await {
                        let _ = tx.send(Event::SuggestionsArrived { generation, result });
                    }
                });
            }
            Effect::CancelSuggestions => self.resolver.cancel(),
            Effect::FetchForecast {
                coordinates,
                generation,
            } => {
                tracing::info!(%coordinates, generation, "fetching forecast");
                let forecaster = Arc::clone(&self.forecaster);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = forecaster.forecast(coordinates).await;
                    if let Err(err) = &result {
                        tracing::warn!(error = %err, "forecast request failed");
                    }
                    let _ = tx.send(Event::ForecastArrived { generation, result });
                });
            }
        }
    }
}
