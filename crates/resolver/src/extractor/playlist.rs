use serde::{Deserialize, Serialize};

use super::patterns::{
    extract_integer_assignment, extract_json_array_assignment, extract_json_assignment,
    extract_string_assignment,
};

/// Player configuration embedded directly in a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistData {
    pub image: Option<String>,
    pub sources: Vec<PlaylistSource>,
    pub trusted: Option<bool>,
    pub tracks: Vec<PlaylistTrack>,
    pub cdn: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSource {
    pub file: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub file: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityOption {
    pub label: String,
    pub url: String,
}

impl PlaylistSource {
    /// Numeric rank of the label, from its leading digits ("1080p" → 1080).
    /// Labels without leading digits rank as 0; oversized numbers saturate.
    pub fn rank(&self) -> u64 {
        self.label
            .trim()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .fold(0u64, |rank, digit| {
                rank.saturating_mul(10)
                    .saturating_add(u64::from(digit - b'0'))
            })
    }
}

impl PlaylistData {
    /// The source to play by default.
    ///
    /// The first `default: true` entry is authoritative. Without one, the
    /// highest-ranked label wins; equal ranks keep document order.
    pub fn best_source(&self) -> Option<&PlaylistSource> {
        if let Some(source) = self.sources.iter().find(|s| s.default) {
            return Some(source);
        }

        let mut best: Option<&PlaylistSource> = None;
        for source in &self.sources {
            if best.is_none_or(|b| source.rank() > b.rank()) {
                best = Some(source);
            }
        }
        best
    }

    pub fn quality_options(&self) -> Vec<QualityOption> {
        self.sources
            .iter()
            .map(|s| QualityOption {
                label: s.label.clone(),
                url: s.file.clone(),
            })
            .collect()
    }
}

/// Everything a single-hop embed page exposes through `window.*` globals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmbeddedPage {
    pub playlist: Option<PlaylistData>,
    pub video_id: Option<String>,
    pub download_url: Option<String>,
    pub ads: Option<Vec<String>>,
    pub timelines_enabled: Option<bool>,
}

impl EmbeddedPage {
    pub fn scan(html: &str, playlist_variable: &str) -> Self {
        Self {
            playlist: extract_json_assignment(html, playlist_variable),
            video_id: extract_string_assignment(html, "v_id"),
            download_url: extract_string_assignment(html, "downloadUrl"),
            ads: extract_json_array_assignment(html, "ads"),
            timelines_enabled: extract_integer_assignment(html, "timelinesEnabled")
                .map(|v| v == 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(file: &str, label: &str, default: bool) -> PlaylistSource {
        PlaylistSource {
            file: file.to_string(),
            label: label.to_string(),
            kind: "hls".to_string(),
            default,
        }
    }

    #[test]
    fn explicit_default_is_authoritative() {
        let playlist = PlaylistData {
            sources: vec![
                source("1080.m3u8", "1080", false),
                source("480.m3u8", "480", true),
                source("720.m3u8", "720", true),
            ],
            ..Default::default()
        };
        assert_eq!(playlist.best_source().unwrap().file, "480.m3u8");
    }

    #[test]
    fn highest_label_wins_without_default() {
        let playlist = PlaylistData {
            sources: vec![
                source("auto.m3u8", "auto", false),
                source("720.m3u8", "720p", false),
                source("1080.m3u8", "1080p", false),
                source("1080b.m3u8", "1080", false),
            ],
            ..Default::default()
        };
        assert_eq!(playlist.best_source().unwrap().file, "1080.m3u8");
    }

    #[test]
    fn oversized_label_saturates_instead_of_ranking_last() {
        let huge = source("huge.m3u8", "99999999999999999999999p", false);
        assert_eq!(huge.rank(), u64::MAX);
        assert_eq!(source("x.m3u8", " 0720p", false).rank(), 720);

        let playlist = PlaylistData {
            sources: vec![source("1080.m3u8", "1080", false), huge],
            ..Default::default()
        };
        assert_eq!(playlist.best_source().unwrap().file, "huge.m3u8");
    }

    #[test]
    fn empty_playlist_has_no_source() {
        assert!(PlaylistData::default().best_source().is_none());
    }

    #[test]
    fn scans_embedded_globals() {
        let html = r#"<script>
            window.playlist = {"image":"poster.jpg","sources":[{"file":"https://cdn.example/v.m3u8","label":"720","type":"hls","default":true}],"tracks":[{"file":"en.vtt","kind":"captions"}],"cdn":2};
            window.v_id = "v42";
            window.ads = ["a", "b", "c"];
            window.timelinesEnabled = 0;
        </script>"#;

        let page = EmbeddedPage::scan(html, "playlist");
        let playlist = page.playlist.unwrap();
        assert_eq!(playlist.sources.len(), 1);
        assert_eq!(playlist.tracks[0].kind, "captions");
        assert_eq!(playlist.cdn, Some(2));
        assert_eq!(page.video_id.as_deref(), Some("v42"));
        assert_eq!(page.download_url, None);
        assert_eq!(page.ads.map(|a| a.len()), Some(3));
        assert_eq!(page.timelines_enabled, Some(false));
        assert_eq!(
            playlist.quality_options(),
            vec![QualityOption {
                label: "720".to_string(),
                url: "https://cdn.example/v.m3u8".to_string()
            }]
        );
    }
}
