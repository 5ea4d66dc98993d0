//! Subtitle text normalization to WebVTT.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Cue styling prepended to every converted track.
pub const CUE_STYLE: &str = "::cue { font-size: 85%; color: #fff; background-color: rgba(0, 0, 0, 0); \
text-shadow: 2px 2px 4px rgba(0, 0, 0, 0.8), -2px -2px 4px rgba(0, 0, 0, 0.8), \
2px -2px 4px rgba(0, 0, 0, 0.8), -2px 2px 4px rgba(0, 0, 0, 0.8); }";

static SRT_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2}:\d{2}),(\d{3})").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// Maps a declared format or file extension; unknown values give `None`.
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "srt" | "subrip" => Some(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Some(SubtitleFormat::Vtt),
            _ => None,
        }
    }

    /// Guesses the format from the text itself.
    pub fn sniff(text: &str) -> Self {
        if has_vtt_header(text) {
            SubtitleFormat::Vtt
        } else if SRT_TIMESTAMP.is_match(text) {
            SubtitleFormat::Srt
        } else {
            SubtitleFormat::Vtt
        }
    }
}

/// Converts subtitle `text` into a styled WebVTT document.
///
/// `declared` is the provider's format or the file extension; when it is
/// missing or unknown the format is sniffed from the content.
pub fn to_webvtt(text: &str, declared: Option<&str>) -> String {
    let format = match declared.and_then(SubtitleFormat::from_declared) {
        // mirrors serve converted files under the original extension
        Some(SubtitleFormat::Srt) if has_vtt_header(text) => {
            debug!("Declared SRT already carries a WebVTT header");
            SubtitleFormat::Vtt
        }
        Some(format) => format,
        None => {
            let sniffed = SubtitleFormat::sniff(text);
            debug!(declared = ?declared, format = ?sniffed, "Subtitle format sniffed");
            sniffed
        }
    };

    let normalized = text
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let body = match format {
        SubtitleFormat::Srt => SRT_TIMESTAMP
            .replace_all(strip_vtt_header(&normalized), "$1.$2")
            .into_owned(),
        SubtitleFormat::Vtt => strip_vtt_header(&normalized).to_string(),
    };

    format!("WEBVTT\n\nSTYLE\n{CUE_STYLE}\n\n{}\n", body.trim())
}

fn has_vtt_header(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("WEBVTT")
}

/// Drops the `WEBVTT` line and any header lines up to the first blank line.
fn strip_vtt_header(text: &str) -> &str {
    let trimmed = text.trim_start();
    if !trimmed.starts_with("WEBVTT") {
        return trimmed;
    }
    match trimmed.find("\n\n") {
        Some(end) => &trimmed[end + 2..],
        None => "",
    }
}
