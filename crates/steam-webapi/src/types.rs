//! Response types for `IPlayerService/GetOwnedGames`.
//!
//! Fields absent from the JSON body fall back to zero values, matching how
//! Steam trims the payload for private profiles and for requests without
//! `include_appinfo`. This includes the `response` envelope itself: `{}`
//! decodes as an account with zero games. A field of the wrong JSON type is
//! still a decode error.

use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// Template for game artwork: `{appid}` then `{hash}`.
const MEDIA_BASE_URL: &str = "http://media.steampowered.com/steamcommunity/public/images/apps";

/// Template for community stats pages: `{steamid}` then `{appid}`.
const COMMUNITY_PROFILES_URL: &str = "http://steamcommunity.com/profiles";

/// Top-level envelope returned by the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnedGamesResponse {
    #[serde(default)]
    pub response: OwnedGamesData,
}

/// Account summary plus per-game records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnedGamesData {
    #[serde(default)]
    pub game_count: u32,
    #[serde(default)]
    pub games: Vec<Game>,
}

/// A single owned game.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Game {
    #[serde(rename = "appid")]
    pub app_id: u32,

    /// Only present when the request set `include_appinfo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Minutes played on record since Steam began tracking in 2009.
    #[serde(default)]
    pub playtime_forever: u64,
    #[serde(default, rename = "playtime_windows_forever")]
    pub playtime_windows: u64,
    #[serde(default, rename = "playtime_linux_forever")]
    pub playtime_linux: u64,
    #[serde(default, rename = "playtime_mac_forever")]
    pub playtime_mac: u64,
    #[serde(default, rename = "playtime_deck_forever")]
    pub playtime_deck: u64,

    #[serde(default, rename = "rtime_last_played")]
    pub last_played: i64,

    #[serde(default, rename = "img_icon_url", skip_serializing_if = "Option::is_none")]
    pub icon_hash: Option<String>,
    #[serde(default, rename = "img_logo_url", skip_serializing_if = "Option::is_none")]
    pub logo_hash: Option<String>,

    #[serde(default, rename = "has_community_visible_stats")]
    pub has_visible_stats: bool,
}

/// Platform tag for per-platform playtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Total across all platforms.
    Any,
    Windows,
    Linux,
    Mac,
    Deck,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Any,
        Platform::Windows,
        Platform::Linux,
        Platform::Mac,
        Platform::Deck,
    ];

    /// Label value used in exported metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Any => "any",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Deck => "deck",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Game {
    /// Game name, or an empty string when the API omitted it.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Minutes played on the given platform.
    pub fn playtime(&self, platform: Platform) -> u64 {
        match platform {
            Platform::Any => self.playtime_forever,
            Platform::Windows => self.playtime_windows,
            Platform::Linux => self.playtime_linux,
            Platform::Mac => self.playtime_mac,
            Platform::Deck => self.playtime_deck,
        }
    }

    pub fn icon_url(&self) -> String {
        image_url(self.app_id, self.icon_hash.as_deref().unwrap_or(""))
    }

    pub fn logo_url(&self) -> String {
        image_url(self.app_id, self.logo_hash.as_deref().unwrap_or(""))
    }

    /// Community stats page for this game, empty unless the game has
    /// visible stats.
    pub fn stats_url(&self, steam_id: &str) -> String {
        if !self.has_visible_stats {
            return String::new();
        }
        format!("{COMMUNITY_PROFILES_URL}/{steam_id}/stats/{}", self.app_id)
    }
}

/// Full artwork URL for an image hash. Empty hash gives an empty URL.
pub fn image_url(app_id: u32, hash: &str) -> String {
    if hash.is_empty() {
        return String::new();
    }
    format!("{MEDIA_BASE_URL}/{app_id}/{hash}.jpg")
}

/// Decode a raw `GetOwnedGames` response body.
pub fn parse_owned_games(body: &[u8]) -> FetchResult<OwnedGamesResponse> {
    Ok(serde_json::from_slice(body)?)
}
