//! Subtitle search and download.

use std::io::Read;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SubtitleConfig;
use crate::error::ResolverError;
use crate::fetch::{FetchClient, RequestOptions};
use crate::media::MediaKind;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One subtitle file offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleDescriptor {
    #[serde(rename = "IDSubtitleFile")]
    pub id: String,
    #[serde(rename = "SubFileName", default)]
    pub filename: String,
    #[serde(rename = "SubFormat", default = "default_format")]
    pub format: String,
    #[serde(rename = "SubEncoding", default = "default_encoding")]
    pub encoding: String,
    #[serde(rename = "MovieYear", default)]
    pub year: Option<String>,
    #[serde(rename = "SubDownloadLink", default)]
    pub download_link: String,
}

fn default_format() -> String {
    "vtt".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    async fn search(
        &self,
        imdb_id: &str,
        language: &str,
        kind: &MediaKind,
    ) -> Result<Vec<SubtitleDescriptor>, ResolverError>;

    /// Raw subtitle text (SRT or VTT).
    async fn download(&self, descriptor: &SubtitleDescriptor) -> Result<String, ResolverError>;
}

#[derive(Debug, Clone)]
pub struct OpenSubtitlesClient {
    fetch: FetchClient,
    config: SubtitleConfig,
}

impl OpenSubtitlesClient {
    pub fn new(fetch: FetchClient, config: SubtitleConfig) -> Self {
        Self { fetch, config }
    }

    fn search_url(&self, imdb_id: &str, language: &str, kind: &MediaKind) -> String {
        let numeric = imdb_id.strip_prefix("tt").unwrap_or(imdb_id);
        let base = self.config.search_base_url.trim_end_matches('/');
        match kind {
            MediaKind::Movie => {
                format!("{base}/search/imdbid-{numeric}/sublanguageid-{language}")
            }
            MediaKind::Episode { season, episode } => format!(
                "{base}/search/episode-{episode}/imdbid-{numeric}/season-{season}/sublanguageid-{language}"
            ),
        }
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::default()
            .header("Accept", "application/json")
            .header("User-Agent", self.config.user_agent.as_str())
    }
}

#[async_trait]
impl SubtitleProvider for OpenSubtitlesClient {
    async fn search(
        &self,
        imdb_id: &str,
        language: &str,
        kind: &MediaKind,
    ) -> Result<Vec<SubtitleDescriptor>, ResolverError> {
        if imdb_id.is_empty() || language.is_empty() {
            return Err(ResolverError::InvalidArgument(
                "imdb id and language are required".to_string(),
            ));
        }

        let url = self.search_url(imdb_id, language, kind);
        debug!(url = %url, "Searching subtitles");
        let body = self
            .fetch
            .fetch_text(&url, self.config.timeout(), &self.options())
            .await?
            .ok_or_else(|| ResolverError::SubtitleError(format!("search failed: {url}")))?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn download(&self, descriptor: &SubtitleDescriptor) -> Result<String, ResolverError> {
        let options = RequestOptions::default()
            .header("User-Agent", self.config.user_agent.as_str());

        if let Some(mirror) = &self.config.vtt_mirror {
            let url = format!(
                "{}/sub/ops-{}.vtt",
                mirror.trim_end_matches('/'),
                descriptor.id
            );
            match self
                .fetch
                .fetch_bytes(&url, self.config.timeout(), &options)
                .await?
            {
                Some(body) => return decode_subtitle(body),
                None => warn!(url = %url, "VTT mirror unavailable, using download link"),
            }
        }

        if descriptor.download_link.is_empty() {
            return Err(ResolverError::SubtitleError(format!(
                "subtitle {} has no download link",
                descriptor.id
            )));
        }
        let body = self
            .fetch
            .fetch_bytes(&descriptor.download_link, self.config.timeout(), &options)
            .await?
            .ok_or_else(|| {
                ResolverError::SubtitleError(format!("download failed: {}", descriptor.id))
            })?;
        decode_subtitle(body)
    }
}

/// Inflates gzip payloads and decodes the text, dropping a UTF-8 BOM.
fn decode_subtitle(body: Bytes) -> Result<String, ResolverError> {
    let raw = if body.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        GzDecoder::new(body.as_ref()).read_to_end(&mut inflated)?;
        inflated
    } else {
        body.to_vec()
    };

    let text = String::from_utf8_lossy(&raw);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}
