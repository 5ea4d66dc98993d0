use std::fmt;

use serde::{Deserialize, Serialize};

pub use filmy_player::manifest::is_hls_url;

/// Where a playable URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Returned by the metadata API and verified reachable.
    Api,
    /// Scraped from the embed page chain.
    Extracted,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Api => "api",
            Provenance::Extracted => "extracted",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable stream for one playback request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub manifest_url: String,
    pub provenance: Provenance,
    /// Catalog identifier used for cache write-back.
    pub source_identifier: String,
}

impl ResolvedStream {
    pub fn new(
        manifest_url: impl Into<String>,
        provenance: Provenance,
        source_identifier: impl Into<String>,
    ) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            provenance,
            source_identifier: source_identifier.into(),
        }
    }

    /// Adaptive manifests are recognised by their `.m3u8` extension.
    pub fn is_adaptive(&self) -> bool {
        is_hls_url(&self.manifest_url)
    }
}

/// Movie or episode, fixed when the request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode { season: u32, episode: u32 },
}

impl MediaKind {
    pub fn season(&self) -> Option<u32> {
        match self {
            MediaKind::Movie => None,
            MediaKind::Episode { season, .. } => Some(*season),
        }
    }

    pub fn episode(&self) -> Option<u32> {
        match self {
            MediaKind::Movie => None,
            MediaKind::Episode { episode, .. } => Some(*episode),
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode { .. } => "tv",
        }
    }
}

/// What the user asked to play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content_id: String,
    #[serde(flatten)]
    pub kind: MediaKind,
}

impl ContentRequest {
    pub fn movie(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            kind: MediaKind::Movie,
        }
    }

    pub fn episode(content_id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            content_id: content_id.into(),
            kind: MediaKind::Episode { season, episode },
        }
    }

    /// Builds a request from optional season/episode numbers; both must be set
    /// for an episode.
    pub fn from_parts(
        content_id: impl Into<String>,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Self {
        match (season, episode) {
            (Some(season), Some(episode)) => Self::episode(content_id, season, episode),
            _ => Self::movie(content_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provenance::Api).unwrap(), r#""api""#);
        assert_eq!(
            serde_json::to_string(&Provenance::Extracted).unwrap(),
            r#""extracted""#
        );
    }

    #[test]
    fn partial_episode_numbers_mean_movie() {
        assert_eq!(
            ContentRequest::from_parts("42", Some(1), None).kind,
            MediaKind::Movie
        );
        assert_eq!(
            ContentRequest::from_parts("42", Some(1), Some(3)).kind,
            MediaKind::Episode {
                season: 1,
                episode: 3
            }
        );
    }

    #[test]
    fn adaptive_streams_are_detected_from_the_url() {
        let stream = |url: &str| ResolvedStream::new(url, Provenance::Extracted, "vidsrc");
        assert!(stream("https://cdn.example/master.m3u8?token=1").is_adaptive());
        assert!(!stream("https://cdn.example/movie.mp4").is_adaptive());
    }
}
