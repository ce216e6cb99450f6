//! Search-as-you-type place suggestions.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::oneshot, task::JoinHandle};

use crate::{error::WeatherError, model::Suggestion, provider::Geocoder};

/// Quiet period a query must survive before it is sent.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;

pub type SuggestionResult = Result<Vec<Suggestion>, WeatherError>;

pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// One undebounced lookup, keeping only candidates with in-range coordinates.
pub async fn lookup(geocoder: &dyn Geocoder, query: &str) -> SuggestionResult {
    if !is_searchable(query) {
        return Ok(Vec::new());
    }

    let candidates = geocoder.search(query).await?;
    let total = candidates.len();
    let valid: Vec<Suggestion> = candidates
        .into_iter()
        .filter(Suggestion::has_valid_coordinates)
        .collect();

    tracing::debug!(query, total, kept = valid.len(), "place suggestions received");
    Ok(valid)
}

/// A single cancelable scheduled task.
///
/// Scheduling replaces (aborts) whatever was pending; dropping the debouncer aborts it too.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced front of [`lookup`].
#[derive(Debug)]
pub struct SuggestionResolver {
    geocoder: Arc<dyn Geocoder>,
    debouncer: Debouncer,
}

impl SuggestionResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_delay(geocoder, DEBOUNCE)
    }

    pub fn with_delay(geocoder: Arc<dyn Geocoder>, delay: Duration) -> Self {
        Self {
            geocoder,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Schedule a lookup for `query`, cancelling the previous one.
    ///
    /// The receiver yields at most one result set. It resolves to an error when a later
    /// call (or [`cancel`](Self::cancel)) superseded this one.
    pub fn resolve(&mut self, query: &str) -> oneshot::Receiver<SuggestionResult> {
        let (tx, rx) = oneshot::channel();

        if !is_searchable(query) {
            self.debouncer.cancel();
            let _ = tx.send(Ok(Vec::new()));
            return rx;
        }

        if self.debouncer.is_pending() {
            tracing::trace!(query, "superseding pending place lookup");
        }
        let geocoder = Arc::clone(&self.geocoder);
        let query = query.to_owned();
        self.debouncer.schedule(async move {
            let result = lookup(geocoder.as_ref(), &query).await;
            if let Err(err) = &result {
                tracing::warn!(query = %query, error = %err, "place lookup failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        calls: Mutex<Vec<String>>,
        results: Vec<Suggestion>,
        fail: bool,
    }

    impl FakeGeocoder {
        fn returning(results: Vec<Suggestion>) -> Self {
            Self {
                results,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> SuggestionResult {
            self.calls.lock().expect("lock").push(query.to_string());
            if self.fail {
                return Err(WeatherError::SuggestionService("Location service unavailable".into()));
            }
            Ok(self.results.clone())
        }
    }

    fn place(id: u64, latitude: f64, longitude: f64) -> Suggestion {
        Suggestion {
            id,
            name: format!("Place {id}"),
            admin1: None,
            country_code: "US".into(),
            latitude,
            longitude,
        }
    }

    #[tokio::test]
    async fn short_queries_never_hit_the_network() {
        let geocoder = FakeGeocoder::returning(vec![place(1, 1.0, 1.0)]);

        for query in ["", " ", "a", "  b  ", "é"] {
            assert_eq!(lookup(&geocoder, query).await, Ok(vec![]));
        }
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_candidates_are_dropped() {
        let geocoder = FakeGeocoder::returning(vec![
            place(1, 39.8, -89.6),
            place(2, 91.0, 0.0),
            place(3, 0.0, -181.0),
            place(4, -90.0, 180.0),
        ]);

        let ids: Vec<u64> = lookup(&geocoder, "Spr")
            .await
            .expect("lookup succeeds")
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn service_failure_is_reported() {
        let geocoder = FakeGeocoder {
            fail: true,
            ..FakeGeocoder::default()
        };
        let err = lookup(&geocoder, "Berlin").await.unwrap_err();
        assert_eq!(err.to_string(), "Location service unavailable");
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_sends_only_the_last_query() {
        let geocoder = Arc::new(FakeGeocoder::returning(vec![place(1, 39.8, -89.6)]));
        let mut resolver = SuggestionResolver::new(geocoder.clone());

        let first = resolver.resolve("Sp");
        tokio::time::advance(Duration::from_millis(100)).await;
        let second = resolver.resolve("Spr");
        tokio::time::advance(Duration::from_millis(299)).await;
        let third = resolver.resolve("Spri");

        let result = third.await.expect("latest query resolves");
        assert_eq!(result.map(|s| s.len()), Ok(1));
        assert!(first.await.is_err());
        assert!(second.await.is_err());
        assert_eq!(geocoder.calls(), vec!["Spri".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_keystrokes_each_send_a_request() {
        let geocoder = Arc::new(FakeGeocoder::returning(vec![]));
        let mut resolver = SuggestionResolver::new(geocoder.clone());

        let first = resolver.resolve("Be");
        assert_eq!(first.await.expect("resolves"), Ok(vec![]));
        let second = resolver.resolve("Ber");
        assert_eq!(second.await.expect("resolves"), Ok(vec![]));

        assert_eq!(geocoder.calls(), vec!["Be".to_string(), "Ber".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_cancels_pending_lookup() {
        let geocoder = Arc::new(FakeGeocoder::returning(vec![place(1, 0.0, 0.0)]));
        let mut resolver = SuggestionResolver::new(geocoder.clone());

        let pending = resolver.resolve("Par");
        assert!(resolver.debouncer.is_pending());
        let cleared = resolver.resolve("P");
        assert!(!resolver.debouncer.is_pending());

        assert_eq!(cleared.await.expect("resolves immediately"), Ok(vec![]));
        assert!(pending.await.is_err());
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_resolver_cancels_the_timer() {
        let geocoder = Arc::new(FakeGeocoder::returning(vec![]));
        let mut resolver = SuggestionResolver::new(geocoder.clone());

        let pending = resolver.resolve("Lisbon");
        drop(resolver);

        assert!(pending.await.is_err());
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_reports_pending_state() {
        let mut debouncer = Debouncer::new(DEBOUNCE);
        assert!(!debouncer.is_pending());

        debouncer.schedule(async {});
        assert!(debouncer.is_pending());

        debouncer.cancel();
        assert!(!debouncer.is_pending());
    }
}
