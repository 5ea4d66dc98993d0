use serde::{Deserialize, Serialize};

use crate::media::MediaKind;

/// An embed site whose outer page starts the resolution chain.
///
/// URL templates accept `{imdb}`, `{season}` and `{episode}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedProvider {
    pub name: String,
    pub movie_url: String,
    pub tv_url: String,
    /// Selector of the iframe that leads to the inner page.
    pub iframe_selector: String,
}

impl Default for EmbedProvider {
    fn default() -> Self {
        Self {
            name: "vidsrc".to_string(),
            movie_url: "https://vidsrc.xyz/embed/movie?imdb={imdb}".to_string(),
            tv_url: "https://vidsrc.xyz/embed/tv?imdb={imdb}&season={season}&episode={episode}"
                .to_string(),
            iframe_selector: "iframe#player_iframe".to_string(),
        }
    }
}

impl EmbedProvider {
    /// Outer page URL for `imdb_id`.
    pub fn outer_url(&self, imdb_id: &str, kind: &MediaKind) -> String {
        match kind {
            MediaKind::Movie => self.movie_url.replace("{imdb}", imdb_id),
            MediaKind::Episode { season, episode } => self
                .tv_url
                .replace("{imdb}", imdb_id)
                .replace("{season}", &season.to_string())
                .replace("{episode}", &episode.to_string()),
        }
    }
}
