//! HTTP client for `IPlayerService/GetOwnedGames`.
//!
//! One GET per call through `reqwest`. Redirects are followed up to the
//! library default of ten hops; there are no retries and no timeout beyond
//! the connector defaults. A non-2xx status is only logged, the body is
//! decoded regardless.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::types::{OwnedGamesResponse, parse_owned_games};

/// Public Steam Web API host.
pub const DEFAULT_BASE_URL: &str = "http://api.steampowered.com";

/// Path of the owned-games endpoint, appended to the base URL.
pub const OWNED_GAMES_PATH: &str = "/IPlayerService/GetOwnedGames/v0001/";

const USER_AGENT: &str = concat!("steam-exporter/", env!("CARGO_PKG_VERSION"));

/// Optional parameters for an owned-games request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedGamesOptions {
    /// Include game names and artwork hashes. Without it only app ids are returned.
    pub include_app_info: bool,
    /// Include free games the player has launched (e.g. Team Fortress 2).
    pub include_played_free_games: bool,
    /// Restrict the result to these app ids. Empty means no filter.
    pub app_ids_filter: Vec<u32>,
}

/// Boxed future returned by [`OwnedGamesSource::owned_games`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = FetchResult<OwnedGamesResponse>> + Send + 'a>>;

/// Source of owned-games data, injected into the collector so tests can script it.
pub trait OwnedGamesSource: Send + Sync {
    /// Fetch the owned games of `steam_id`.
    fn owned_games<'a>(
        &'a self,
        api_key: &'a str,
        steam_id: &'a str,
        options: &'a OwnedGamesOptions,
    ) -> FetchFuture<'a>;
}

/// Build the full request URL, query string included.
///
/// Boolean flags are only emitted when set; the app-id filter is rendered as
/// a comma-joined decimal list when non-empty.
pub fn owned_games_url(
    base_url: &str,
    api_key: &str,
    steam_id: &str,
    options: &OwnedGamesOptions,
) -> FetchResult<Url> {
    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), OWNED_GAMES_PATH);
    let mut url = Url::parse(&endpoint)
        .map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("key", api_key)
            .append_pair("steamid", steam_id)
            .append_pair("format", "json");

        if options.include_app_info {
            query.append_pair("include_appinfo", "true");
        }
        if options.include_played_free_games {
            query.append_pair("include_played_free_games", "true");
        }
        if !options.app_ids_filter.is_empty() {
            let ids: Vec<String> = options
                .app_ids_filter
                .iter()
                .map(|id| id.to_string())
                .collect();
            query.append_pair("appids_filter", &ids.join(","));
        }
    }

    Ok(url)
}

/// Steam Web API client.
#[derive(Clone)]
pub struct SteamClient {
    http: reqwest::Client,
    base_url: String,
}

impl SteamClient {
    /// Create a client for the public Steam Web API.
    pub fn new() -> FetchResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (mirror or test server).
    pub fn with_base_url(base_url: impl Into<String>) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and decode the owned games of `steam_id`.
    pub async fn get_owned_games(
        &self,
        api_key: &str,
        steam_id: &str,
        options: &OwnedGamesOptions,
    ) -> FetchResult<OwnedGamesResponse> {
        let url = owned_games_url(&self.base_url, api_key, steam_id, options)?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, %steam_id, "owned games request returned non-2xx");
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Body(error_chain(&e)))?;

        debug!(%status, bytes = body.len(), %steam_id, "owned games response received");
        parse_owned_games(&body)
    }
}

impl std::fmt::Debug for SteamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OwnedGamesSource for SteamClient {
    fn owned_games<'a>(
        &'a self,
        api_key: &'a str,
        steam_id: &'a str,
        options: &'a OwnedGamesOptions,
    ) -> FetchFuture<'a> {
        Box::pin(self.get_owned_games(api_key, steam_id, options))
    }
}

/// Render an error with its source chain; reqwest's top-level messages omit the cause.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
