//! Gauge registry for owned-games metrics.
//!
//! Every setter overwrites exactly one series identified by its full label
//! tuple. Series are never removed, so games dropped from a later response
//! keep their last published values.

use prometheus::{GaugeVec, Opts, Registry};
use steam_webapi::Platform;

pub const GAMES_TOTAL: &str = "steam_games_total";
pub const PLAYTIME_TOTAL_MINUTES: &str = "steam_games_playtime_total_minutes";
pub const LAST_PLAYED_TIMESTAMP: &str = "steam_game_last_played_timestamp";

/// The exporter's gauges and the registry they are registered in.
#[derive(Clone)]
pub struct SteamMetrics {
    registry: Registry,
    games_total: GaugeVec,
    playtime_minutes: GaugeVec,
    last_played: GaugeVec,
}

impl SteamMetrics {
    /// Create the gauges in a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Register the gauges into `registry`.
    ///
    /// Fails with `AlreadyReg` if the registry already holds these metrics;
    /// callers treat that as a startup configuration error.
    pub fn with_registry(registry: Registry) -> prometheus::Result<Self> {
        let games_total = GaugeVec::new(
            Opts::new(GAMES_TOTAL, "Total number of games owned by the Steam user"),
            &["steam_id"],
        )?;
        let playtime_minutes = GaugeVec::new(
            Opts::new(PLAYTIME_TOTAL_MINUTES, "Total playtime of games."),
            &["steam_id", "app_id", "name", "platform"],
        )?;
        let last_played = GaugeVec::new(
            Opts::new(
                LAST_PLAYED_TIMESTAMP,
                "Unix timestamp of when the game was last played",
            ),
            &["steam_id", "app_id", "name"],
        )?;

        registry.register(Box::new(games_total.clone()))?;
        registry.register(Box::new(playtime_minutes.clone()))?;
        registry.register(Box::new(last_played.clone()))?;

        Ok(Self {
            registry,
            games_total,
            playtime_minutes,
            last_played,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn set_games_owned(&self, steam_id: &str, count: u32) {
        self.games_total
            .with_label_values(&[steam_id])
            .set(f64::from(count));
    }

    pub fn set_playtime(
        &self,
        steam_id: &str,
        app_id: u32,
        name: &str,
        platform: Platform,
        minutes: u64,
    ) {
        let app_id = app_id.to_string();
        self.playtime_minutes
            .with_label_values(&[steam_id, &app_id, name, platform.as_str()])
            .set(minutes as f64);
    }

    pub fn set_last_played(&self, steam_id: &str, app_id: u32, name: &str, timestamp: i64) {
        let app_id = app_id.to_string();
        self.last_played
            .with_label_values(&[steam_id, &app_id, name])
            .set(timestamp as f64);
    }

    /// Read the current value of one series without creating it.
    ///
    /// `labels` must name the full label tuple; order does not matter.
    pub fn gauge_value(&self, metric: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == metric)
            .flat_map(|family| family.get_metric())
            .find(|m| {
                let pairs = m.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(name, value)| {
                        pairs
                            .iter()
                            .any(|p| p.get_name() == *name && p.get_value() == *value)
                    })
            })
            .map(|m| m.get_gauge().get_value())
    }

    /// Number of series currently held under `metric`.
    pub fn series_count(&self, metric: &str) -> usize {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == metric)
            .map(|family| family.get_metric().len())
            .sum()
    }
}

impl std::fmt::Debug for SteamMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamMetrics").finish_non_exhaustive()
    }
}
