//! Text patterns applied to embed pages.
//!
//! Each extractor first checks for a cheap signature substring and only then
//! runs the regular expressions.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Inner pages load the player page through this JavaScript helper.
pub const IFRAME_LOADER_SIGNATURE: &str = "function loadIframe";

/// Player pages construct the player with this call.
pub const PLAYER_SIGNATURE: &str = "new Playerjs";

static IFRAME_LOADER_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"function loadIframe[\s\S]*?src:\s*['"]([^'"]+)['"]"#).unwrap()
});

/// Manifest patterns, most specific first. The first pattern that matches wins.
static MANIFEST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // `file:` inside the player constructor call
        r#"new Playerjs\s*\([^)]*file:\s*['"]([^'"]*\.m3u8[^'"]*)['"]"#,
        // any `file:` key pointing at a playlist
        r#"file:\s*['"]([^'"]*\.m3u8[^'"]*)['"]"#,
        r#"file:\s*['"]([^'"]*master\.m3u8[^'"]*)['"]"#,
        // any quoted absolute playlist URL
        r#"['"]([^'"]*https?://[^'"]*\.m3u8[^'"]*)['"]"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_group_1_owned(re: &Regex, input: &str) -> Option<String> {
    capture_group_1(re, input).map(ToOwned::to_owned)
}

/// Target URL of the `loadIframe` helper, as written in the page (often relative).
pub fn extract_iframe_loader_target(html: &str) -> Option<String> {
    if !html.contains(IFRAME_LOADER_SIGNATURE) {
        return None;
    }
    capture_group_1_owned(&IFRAME_LOADER_SRC, html)
}

/// Manifest URL passed to the player constructor.
pub fn extract_player_manifest(html: &str) -> Option<String> {
    if !html.contains(PLAYER_SIGNATURE) {
        return None;
    }

    MANIFEST_PATTERNS.iter().enumerate().find_map(|(index, re)| {
        let found = capture_group_1_owned(re, html)?;
        debug!(pattern = index, url = %found, "Manifest pattern matched");
        Some(found)
    })
}

fn assignment_regex(variable: &str, value_pattern: &str) -> Option<Regex> {
    let pattern = format!(
        r"window\.{}\s*=\s*{}",
        regex::escape(variable),
        value_pattern
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(variable, error = %e, "Invalid assignment pattern");
            None
        }
    }
}

/// Parses the object literal assigned to `window.<variable>`.
///
/// A block that is present but not valid JSON is logged and treated as absent.
pub fn extract_json_assignment<T: DeserializeOwned>(html: &str, variable: &str) -> Option<T> {
    let re = assignment_regex(variable, r"(\{[\s\S]*?\});")?;
    parse_json_capture(&re, html, variable)
}

/// Parses the array literal assigned to `window.<variable>`.
pub fn extract_json_array_assignment<T: DeserializeOwned>(
    html: &str,
    variable: &str,
) -> Option<T> {
    let re = assignment_regex(variable, r"(\[[\s\S]*?\]);")?;
    parse_json_capture(&re, html, variable)
}

fn parse_json_capture<T: DeserializeOwned>(re: &Regex, html: &str, variable: &str) -> Option<T> {
    let block = capture_group_1(re, html)?;
    match serde_json::from_str(block) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(variable, error = %e, "Embedded JSON block is malformed");
            None
        }
    }
}

/// Quoted string assigned to `window.<variable>`.
pub fn extract_string_assignment(html: &str, variable: &str) -> Option<String> {
    let re = assignment_regex(variable, r#"["']([^"']+)["']"#)?;
    capture_group_1_owned(&re, html)
}

/// Integer literal assigned to `window.<variable>`.
pub fn extract_integer_assignment(html: &str, variable: &str) -> Option<i64> {
    let re = assignment_regex(variable, r"(\d+)")?;
    capture_group_1(&re, html)?.parse().ok()
}
