use std::fmt;

use serde::Serialize;

use crate::media::MediaKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopRecord {
    pub url: String,
    pub raw_html_length: usize,
}

/// What is being resolved, plus the trail of pages fetched so far.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionContext {
    pub imdb_id: String,
    pub kind: MediaKind,
    hop_history: Vec<HopRecord>,
}

impl ExtractionContext {
    pub fn new(imdb_id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            kind,
            hop_history: Vec::with_capacity(3),
        }
    }

    pub fn season(&self) -> Option<u32> {
        self.kind.season()
    }

    pub fn episode(&self) -> Option<u32> {
        self.kind.episode()
    }

    pub fn record_hop(&mut self, url: &str, raw_html_length: usize) {
        self.hop_history.push(HopRecord {
            url: url.to_string(),
            raw_html_length,
        });
    }

    pub fn hop_history(&self) -> &[HopRecord] {
        &self.hop_history
    }

    pub fn clear_history(&mut self) {
        self.hop_history.clear();
    }
}

impl fmt::Display for ExtractionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.imdb_id)?;
        if let MediaKind::Episode { season, episode } = self.kind {
            write!(f, " S{season:02}E{episode:02}")?;
        }
        for (n, hop) in self.hop_history.iter().enumerate() {
            write!(f, " | hop {}: {} ({} bytes)", n + 1, hop.url, hop.raw_html_length)?;
        }
        Ok(())
    }
}
