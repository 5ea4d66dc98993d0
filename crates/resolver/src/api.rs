//! Content metadata API: candidate play links and link write-back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ResolverError;
use crate::fetch::{FetchClient, parse_http_url};
use crate::media::{ContentRequest, MediaKind};

/// Answer to a play link request. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayLinkResponse {
    pub imdb_id: Option<String>,
    pub play_link: Option<String>,
}

/// A freshly extracted link, persisted for future requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBackRecord {
    pub content_id: String,
    pub imdb_id: String,
    pub manifest_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn request_play_link(
        &self,
        request: &ContentRequest,
    ) -> Result<PlayLinkResponse, ResolverError>;

    async fn write_back(&self, record: &WriteBackRecord) -> Result<(), ResolverError>;
}

/// [`ContentApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    fetch: FetchClient,
    config: ApiConfig,
}

impl HttpContentApi {
    pub fn new(fetch: FetchClient, config: ApiConfig) -> Self {
        Self { fetch, config }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ResolverError> {
        let mut url = parse_http_url(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ResolverError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn request_play_link(
        &self,
        request: &ContentRequest,
    ) -> Result<PlayLinkResponse, ResolverError> {
        let mut url = self.endpoint(&[
            "play-link",
            request.kind.path_segment(),
            request.content_id.as_str(),
        ])?;
        if let MediaKind::Episode { season, episode } = request.kind {
            url.query_pairs_mut()
                .append_pair("season", &season.to_string())
                .append_pair("episode", &episode.to_string());
        }

        debug!(url = %url, "Requesting play link");
        self.fetch.get_json(url.as_str(), self.config.timeout()).await
    }

    async fn write_back(&self, record: &WriteBackRecord) -> Result<(), ResolverError> {
        let url = self.endpoint(&["play-link"])?;
        self.fetch
            .put_json(url.as_str(), record, self.config.timeout())
            .await
    }
}
