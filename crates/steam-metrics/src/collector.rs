//! Scrape-time collection of owned-games metrics.
//!
//! [`SteamCollector::collect`] is the pre-gather hook: the `/metrics` handler
//! awaits it before rendering the registry. A cycle fetches once and only
//! writes gauges after the whole response decoded, so a failed cycle leaves
//! the last successful values in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use steam_webapi::{OwnedGamesData, OwnedGamesOptions, OwnedGamesSource, Platform};
use tracing::{debug, error, info, warn};

use crate::registry::SteamMetrics;

/// Credentials for the single exported account.
///
/// Empty strings count as absent.
#[derive(Clone, Default)]
pub struct SteamCredentials {
    pub api_key: Option<String>,
    pub steam_id: Option<String>,
}

impl SteamCredentials {
    pub fn new(api_key: Option<String>, steam_id: Option<String>) -> Self {
        Self { api_key, steam_id }
    }

    /// `(api_key, steam_id)` when both are set and non-empty.
    pub fn resolve(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let steam_id = self.steam_id.as_deref().filter(|s| !s.is_empty())?;
        Some((api_key, steam_id))
    }

    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }
}

impl std::fmt::Debug for SteamCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("steam_id", &self.steam_id)
            .finish()
    }
}

/// Whether a collection cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Collecting,
}

/// Result of one collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Credentials missing; the registry was not touched.
    Disabled,
    /// The fetch failed; the registry keeps its previous values.
    Failed,
    /// Gauges were overwritten from a fresh response.
    Updated { games: usize },
}

/// Refreshes [`SteamMetrics`] from an [`OwnedGamesSource`] on demand.
pub struct SteamCollector {
    source: Arc<dyn OwnedGamesSource>,
    metrics: Arc<SteamMetrics>,
    credentials: SteamCredentials,
    app_ids_filter: Vec<u32>,
    /// Cycles in progress; concurrent scrapes each run their own.
    in_flight: AtomicUsize,
}

impl SteamCollector {
    pub fn new(
        source: Arc<dyn OwnedGamesSource>,
        metrics: Arc<SteamMetrics>,
        credentials: SteamCredentials,
    ) -> Self {
        Self {
            source,
            metrics,
            credentials,
            app_ids_filter: Vec::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Restrict fetches to the given app ids.
    pub fn with_app_ids_filter(mut self, app_ids: Vec<u32>) -> Self {
        self.app_ids_filter = app_ids;
        self
    }

    pub fn credentials(&self) -> &SteamCredentials {
        &self.credentials
    }

    pub fn state(&self) -> CollectorState {
        if self.in_flight.load(Ordering::Acquire) > 0 {
            CollectorState::Collecting
        } else {
            CollectorState::Idle
        }
    }

    /// Options sent with every fetch.
    pub fn request_options(&self) -> OwnedGamesOptions {
        OwnedGamesOptions {
            include_app_info: true,
            include_played_free_games: true,
            app_ids_filter: self.app_ids_filter.clone(),
        }
    }

    /// Run one collection cycle.
    pub async fn collect(&self) -> CollectionOutcome {
        let _guard = InFlightGuard::enter(&self.in_flight);

        let Some((api_key, steam_id)) = self.credentials.resolve() else {
            warn!("Steam API key or Steam ID not configured, skipping collection");
            return CollectionOutcome::Disabled;
        };

        let options = self.request_options();
        let response = match self.source.owned_games(api_key, steam_id, &options).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    %steam_id,
                    call = "IPlayerService/GetOwnedGames",
                    transport = e.is_transport(),
                    error = %e,
                    "error fetching owned games"
                );
                return CollectionOutcome::Failed;
            }
        };

        let games = self.publish(steam_id, &response.response);
        info!(
            %steam_id,
            game_count = response.response.game_count,
            games,
            "updated steam_games_total metric"
        );
        CollectionOutcome::Updated { games }
    }

    /// Write a decoded response into the gauges. Returns the number of games.
    fn publish(&self, steam_id: &str, data: &OwnedGamesData) -> usize {
        self.metrics.set_games_owned(steam_id, data.game_count);

        for game in &data.games {
            let name = game.name_or_empty();
            for platform in Platform::ALL {
                self.metrics.set_playtime(
                    steam_id,
                    game.app_id,
                    name,
                    platform,
                    game.playtime(platform),
                );
            }
            self.metrics
                .set_last_played(steam_id, game.app_id, name, game.last_played);
        }

        debug!(%steam_id, games = data.games.len(), "game gauges written");
        data.games.len()
    }
}

/// Holds the collector in `Collecting` until dropped, including when the
/// scrape future is cancelled.
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use steam_webapi::{
        FetchError, FetchFuture, FetchResult, Game, OwnedGamesResponse, parse_owned_games,
    };
    use tokio::sync::Notify;

    use crate::registry::{GAMES_TOTAL, LAST_PLAYED_TIMESTAMP, PLAYTIME_TOTAL_MINUTES};

    const STEAM_ID: &str = "76561198000000001";

    /// Replays queued results and records the options of every call.
    #[derive(Default)]
    struct ScriptedSource {
        results: Mutex<VecDeque<FetchResult<OwnedGamesResponse>>>,
        calls: Mutex<Vec<OwnedGamesOptions>>,
    }

    impl ScriptedSource {
        fn push(&self, result: FetchResult<OwnedGamesResponse>) {
            self.results.lock().unwrap().push_back(result);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl OwnedGamesSource for ScriptedSource {
        fn owned_games<'a>(
            &'a self,
            _api_key: &'a str,
            _steam_id: &'a str,
            options: &'a OwnedGamesOptions,
        ) -> FetchFuture<'a> {
            self.calls.lock().unwrap().push(options.clone());
            let result = self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("no scripted response".into())));
            Box::pin(async move { result })
        }
    }

    /// Blocks every fetch until released.
    struct GatedSource {
        gate: Notify,
    }

    impl OwnedGamesSource for GatedSource {
        fn owned_games<'a>(
            &'a self,
            _api_key: &'a str,
            _steam_id: &'a str,
            _options: &'a OwnedGamesOptions,
        ) -> FetchFuture<'a> {
            Box::pin(async move {
                self.gate.notified().await;
                Ok(response(0, Vec::new()))
            })
        }
    }

    fn game(app_id: u32, name: &str, playtime_forever: u64, last_played: i64) -> Game {
        Game {
            app_id,
            name: Some(name.to_string()),
            playtime_forever,
            last_played,
            ..Default::default()
        }
    }

    fn response(game_count: u32, games: Vec<Game>) -> OwnedGamesResponse {
        OwnedGamesResponse {
            response: OwnedGamesData { game_count, games },
        }
    }

    fn sample_response() -> OwnedGamesResponse {
        response(
            2,
            vec![
                game(10, "Counter-Strike", 120, 1_700_000_000),
                game(440, "Team Fortress 2", 0, 0),
            ],
        )
    }

    fn credentials() -> SteamCredentials {
        SteamCredentials::new(Some("KEY".into()), Some(STEAM_ID.into()))
    }

    fn collector(
        source: Arc<dyn OwnedGamesSource>,
        credentials: SteamCredentials,
    ) -> (SteamCollector, Arc<SteamMetrics>) {
        let metrics = Arc::new(SteamMetrics::new().unwrap());
        (
            SteamCollector::new(source, metrics.clone(), credentials),
            metrics,
        )
    }

    fn playtime(metrics: &SteamMetrics, app_id: &str, name: &str, platform: &str) -> Option<f64> {
        metrics.gauge_value(
            PLAYTIME_TOTAL_MINUTES,
            &[
                ("steam_id", STEAM_ID),
                ("app_id", app_id),
                ("name", name),
                ("platform", platform),
            ],
        )
    }

    fn last_played(metrics: &SteamMetrics, app_id: &str, name: &str) -> Option<f64> {
        metrics.gauge_value(
            LAST_PLAYED_TIMESTAMP,
            &[("steam_id", STEAM_ID), ("app_id", app_id), ("name", name)],
        )
    }

    fn games_total(metrics: &SteamMetrics) -> Option<f64> {
        metrics.gauge_value(GAMES_TOTAL, &[("steam_id", STEAM_ID)])
    }

    #[test]
    fn credentials_require_both_values() {
        assert!(credentials().is_configured());
        assert!(!SteamCredentials::new(None, Some(STEAM_ID.into())).is_configured());
        assert!(!SteamCredentials::new(Some("KEY".into()), None).is_configured());
        assert!(!SteamCredentials::new(Some(String::new()), Some(STEAM_ID.into())).is_configured());
    }

    #[test]
    fn credentials_debug_redacts_key() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("KEY"));
        assert!(rendered.contains(STEAM_ID));
    }

    #[tokio::test]
    async fn collect_publishes_sample_response() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(sample_response()));
        let (collector, metrics) = collector(source.clone(), credentials());

        let outcome = collector.collect().await;
        assert_eq!(outcome, CollectionOutcome::Updated { games: 2 });

        assert_eq!(games_total(&metrics), Some(2.0));
        assert_eq!(playtime(&metrics, "10", "Counter-Strike", "any"), Some(120.0));
        assert_eq!(playtime(&metrics, "440", "Team Fortress 2", "any"), Some(0.0));
        assert_eq!(
            last_played(&metrics, "10", "Counter-Strike"),
            Some(1_700_000_000.0)
        );

        // Five platform series per game.
        assert_eq!(metrics.series_count(PLAYTIME_TOTAL_MINUTES), 10);
        assert_eq!(metrics.series_count(LAST_PLAYED_TIMESTAMP), 2);
    }

    #[tokio::test]
    async fn collect_requests_app_info_and_free_games() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(sample_response()));
        let (collector, _metrics) = collector(source.clone(), credentials());
        let collector = collector.with_app_ids_filter(vec![10]);

        collector.collect().await;

        let calls = source.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[OwnedGamesOptions {
                include_app_info: true,
                include_played_free_games: true,
                app_ids_filter: vec![10],
            }]
        );
    }

    #[tokio::test]
    async fn collect_without_credentials_is_disabled() {
        let source = Arc::new(ScriptedSource::default());
        let (collector, metrics) =
            collector(source.clone(), SteamCredentials::new(None, Some(STEAM_ID.into())));

        assert_eq!(collector.collect().await, CollectionOutcome::Disabled);
        assert_eq!(source.call_count(), 0);
        assert_eq!(metrics.series_count(GAMES_TOTAL), 0);
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_values() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(sample_response()));
        source.push(Err(FetchError::Transport("connection refused".into())));
        let (collector, metrics) = collector(source.clone(), credentials());

        collector.collect().await;
        assert_eq!(collector.collect().await, CollectionOutcome::Failed);

        assert_eq!(games_total(&metrics), Some(2.0));
        assert_eq!(playtime(&metrics, "10", "Counter-Strike", "any"), Some(120.0));
        assert_eq!(
            last_played(&metrics, "10", "Counter-Strike"),
            Some(1_700_000_000.0)
        );
    }

    #[tokio::test]
    async fn decode_failure_leaves_registry_untouched() {
        let source = Arc::new(ScriptedSource::default());
        let decode_err = parse_owned_games(b"not json").unwrap_err();
        source.push(Err(decode_err));
        let (collector, metrics) = collector(source, credentials());

        assert_eq!(collector.collect().await, CollectionOutcome::Failed);
        assert_eq!(metrics.series_count(GAMES_TOTAL), 0);
        assert_eq!(metrics.series_count(PLAYTIME_TOTAL_MINUTES), 0);
        assert_eq!(metrics.series_count(LAST_PLAYED_TIMESTAMP), 0);
    }

    #[tokio::test]
    async fn stale_games_are_kept() {
        let source = Arc::new(ScriptedSource::default());
        source.push(Ok(sample_response()));
        source.push(Ok(response(1, vec![game(10, "Counter-Strike", 180, 1_700_000_500)])));
        let (collector, metrics) = collector(source, credentials());

        collector.collect().await;
        assert_eq!(
            collector.collect().await,
            CollectionOutcome::Updated { games: 1 }
        );

        assert_eq!(games_total(&metrics), Some(1.0));
        assert_eq!(playtime(&metrics, "10", "Counter-Strike", "any"), Some(180.0));
        // Team Fortress 2 is gone from the response but its series remain.
        assert_eq!(playtime(&metrics, "440", "Team Fortress 2", "any"), Some(0.0));
        assert_eq!(last_played(&metrics, "440", "Team Fortress 2"), Some(0.0));
    }

    #[tokio::test]
    async fn missing_name_is_published_as_empty_label() {
        let source = Arc::new(ScriptedSource::default());
        let mut unnamed = game(570, "", 42, 0);
        unnamed.name = None;
        source.push(Ok(response(1, vec![unnamed])));
        let (collector, metrics) = collector(source, credentials());

        collector.collect().await;
        assert_eq!(playtime(&metrics, "570", "", "any"), Some(42.0));
    }

    #[tokio::test]
    async fn state_tracks_in_flight_collection() {
        let source = Arc::new(GatedSource { gate: Notify::new() });
        let (collector, _metrics) = collector(source.clone(), credentials());
        let collector = Arc::new(collector);
        assert_eq!(collector.state(), CollectorState::Idle);

        let task = {
            let collector = collector.clone();
            tokio::spawn(async move { collector.collect().await })
        };

        for _ in 0..100 {
            if collector.state() == CollectorState::Collecting {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(collector.state(), CollectorState::Collecting);

        source.gate.notify_one();
        assert_eq!(task.await.unwrap(), CollectionOutcome::Updated { games: 0 });
        assert_eq!(collector.state(), CollectorState::Idle);
    }

    #[tokio::test]
    async fn cancelled_collection_returns_to_idle() {
        let source = Arc::new(GatedSource { gate: Notify::new() });
        let (collector, _metrics) = collector(source, credentials());

        let cycle = collector.collect();
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(10), cycle).await;
        assert!(timed_out.is_err());
        assert_eq!(collector.state(), CollectorState::Idle);
    }
}
