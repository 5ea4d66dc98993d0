//! Resolver configuration.
//!
//! Every field has a default so a partial TOML/JSON document deserializes into
//! a complete configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fetch::RetryPolicy;
use crate::resolver::EmbedProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub fetch: FetchConfig,
    pub hops: HopTimeouts,
    /// Embed providers, tried in order.
    pub providers: Vec<EmbedProvider>,
    /// Global variable holding an embedded playlist on single-hop pages.
    pub playlist_variable: String,
    pub probe_timeout_ms: u64,
    /// Persist extracted links back to the content API.
    pub write_back: bool,
    pub api: ApiConfig,
    pub subtitles: SubtitleConfig,
    pub capture: CaptureConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            hops: HopTimeouts::default(),
            providers: vec![EmbedProvider::default()],
            playlist_variable: "playlist".to_string(),
            probe_timeout_ms: 10_000,
            write_back: true,
            api: ApiConfig::default(),
            subtitles: SubtitleConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl ResolverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.fetch.retries,
            backoff_step: Duration::from_millis(self.fetch.backoff_step_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total attempts per fetch, including the first one.
    pub retries: u32,
    /// Linear backoff unit: the n-th retry waits `n * backoff_step_ms`.
    pub backoff_step_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_step_ms: 2_000,
        }
    }
}

/// Per-hop fetch timeouts of the embed chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HopTimeouts {
    pub outer_ms: u64,
    pub inner_ms: u64,
    pub player_ms: u64,
}

impl Default for HopTimeouts {
    fn default() -> Self {
        Self {
            outer_ms: 15_000,
            inner_ms: 15_000,
            player_ms: 20_000,
        }
    }
}

impl HopTimeouts {
    pub fn outer(&self) -> Duration {
        Duration::from_millis(self.outer_ms)
    }

    pub fn inner(&self) -> Duration {
        Duration::from_millis(self.inner_ms)
    }

    pub fn player(&self) -> Duration {
        Duration::from_millis(self.player_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api/filmy".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    pub search_base_url: String,
    /// Mirror serving converted VTT files as `{mirror}/sub/ops-{id}.vtt`.
    pub vtt_mirror: Option<String>,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://rest.opensubtitles.org".to_string(),
            vtt_mirror: Some("https://vidsrc.net".to_string()),
            user_agent: "trailers.to-UA".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl SubtitleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub timeout_ms: u64,
    /// Grace window armed after the page finished loading.
    pub grace_ms: u64,
    pub wait_for_load: bool,
    pub user_agent: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            grace_ms: 5_000,
            wait_for_load: true,
            user_agent: None,
        }
    }
}
