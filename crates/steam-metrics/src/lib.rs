//! steam-metrics: owned-games gauges for the Steam exporter.
//!
//! Holds the gauge registry, refreshes it from the Steam Web API right
//! before each scrape, and renders it in the Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! SteamCollector
//!   ├── collect() ← called by the /metrics handler before gathering
//!   │   ├── OwnedGamesSource::owned_games()
//!   │   └── publish() → SteamMetrics gauges (only after a full decode)
//!   └── state() → Idle | Collecting
//!
//! SteamMetrics
//!   ├── steam_games_total{steam_id}
//!   ├── steam_games_playtime_total_minutes{steam_id, app_id, name, platform}
//!   └── steam_game_last_played_timestamp{steam_id, app_id, name}
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;
pub mod registry;

pub use collector::{CollectionOutcome, CollectorState, SteamCollector, SteamCredentials};
pub use self::prometheus::{CONTENT_TYPE, render_prometheus};
pub use registry::{GAMES_TOTAL, LAST_PLAYED_TIMESTAMP, PLAYTIME_TOTAL_MINUTES, SteamMetrics};
