//! Quality levels read from an HLS manifest.

use m3u8_rs::{MasterPlaylist, Playlist};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::PlayerError;
use crate::quality::QualityLevel;

/// A variant stream with its absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestLevel {
    #[serde(flatten)]
    pub level: QualityLevel,
    pub url: String,
}

/// `true` for URLs that point at an HLS playlist.
pub fn is_hls_url(url: &str) -> bool {
    url.contains(".m3u8")
}

/// Parses `bytes` and lists the variants of a master playlist.
///
/// A media playlist has a single rendition and yields no selectable levels.
pub fn parse_levels(bytes: &[u8], manifest_url: &str) -> Result<Vec<ManifestLevel>, PlayerError> {
    let base_url = Url::parse(manifest_url)?;
    let playlist =
        m3u8_rs::parse_playlist_res(bytes).map_err(|e| PlayerError::Manifest(e.to_string()))?;

    match playlist {
        Playlist::MasterPlaylist(pl) => master_levels(pl, &base_url),
        Playlist::MediaPlaylist(_) => {
            debug!(url = manifest_url, "Media playlist has no selectable levels");
            Ok(Vec::new())
        }
    }
}

fn master_levels(playlist: MasterPlaylist, base_url: &Url) -> Result<Vec<ManifestLevel>, PlayerError> {
    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .enumerate()
        .map(|(index, variant)| {
            let url = base_url.join(&variant.uri)?;
            let (width, height) = variant
                .resolution
                .map(|r| (r.width, r.height))
                .unwrap_or_default();
            Ok(ManifestLevel {
                level: QualityLevel::new(index, width, height, variant.bandwidth, None),
                url: url.to_string(),
            })
        })
        .collect()
}
