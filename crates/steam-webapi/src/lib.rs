//! steam-webapi: typed access to the Steam Web API owned-games endpoint.
//!
//! Issues a single `GET IPlayerService/GetOwnedGames/v0001` request per call
//! and decodes the JSON body into [`OwnedGamesResponse`].
//!
//! # Architecture
//!
//! ```text
//! SteamClient (impl OwnedGamesSource)
//!   ├── owned_games_url() → query string with key, steamid, flags, filter
//!   ├── reqwest client → one GET, redirects followed, no retries
//!   └── parse_owned_games() → OwnedGamesResponse | FetchError::Decode
//!
//! types
//!   ├── Game::playtime(Platform)
//!   └── image_url() / Game::icon_url() / Game::logo_url() / Game::stats_url()
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    DEFAULT_BASE_URL, FetchFuture, OWNED_GAMES_PATH, OwnedGamesOptions, OwnedGamesSource,
    SteamClient, owned_games_url,
};
pub use error::{FetchError, FetchResult};
pub use types::*;
