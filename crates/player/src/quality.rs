use serde::Serialize;

/// Level index meaning "let the adaptive session choose".
pub const AUTO_QUALITY: i32 = -1;

/// One selectable variant of a loaded manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityLevel {
    pub index: usize,
    pub width: u64,
    pub height: u64,
    pub bitrate: u64,
    pub name: String,
}

impl QualityLevel {
    pub fn new(index: usize, width: u64, height: u64, bitrate: u64, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{height}p"),
        };
        Self {
            index,
            width,
            height,
            bitrate,
            name,
        }
    }
}

/// Menu label for a quality index, `"Auto"` for [`AUTO_QUALITY`].
pub fn quality_label(levels: &[QualityLevel], index: i32) -> String {
    if index == AUTO_QUALITY {
        return "Auto".to_string();
    }
    usize::try_from(index)
        .ok()
        .and_then(|i| levels.get(i))
        .map(|level| level.name.clone())
        .unwrap_or_else(|| "Auto".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_height() {
        assert_eq!(QualityLevel::new(0, 1280, 720, 2_500_000, None).name, "720p");
        assert_eq!(QualityLevel::new(0, 1280, 720, 2_500_000, Some("")).name, "720p");
        assert_eq!(QualityLevel::new(0, 1280, 720, 2_500_000, Some("HD")).name, "HD");
    }

    #[test]
    fn labels() {
        let levels = vec![QualityLevel::new(0, 1920, 1080, 5_000_000, None)];
        assert_eq!(quality_label(&levels, AUTO_QUALITY), "Auto");
        assert_eq!(quality_label(&levels, 0), "1080p");
        assert_eq!(quality_label(&levels, 7), "Auto");
    }
}
