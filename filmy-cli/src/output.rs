use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use filmy_player::manifest::ManifestLevel;
use filmy_resolver::ResolvedStream;
use filmy_resolver::subtitles::SubtitleDescriptor;
use serde::Serialize;
use std::io::Write;

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_stream(&self, stream: &ResolvedStream, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Self::json(stream),
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize("Resolved Stream:", &Color::Green, true));
                output.push('\n');
                output.push_str(&self.field("URL", &stream.manifest_url, &Color::Blue));
                output.push_str(&self.field("Provenance", stream.provenance.as_str(), &Color::Cyan));
                output.push_str(&self.field("Source", &stream.source_identifier, &Color::Cyan));
                output.push_str(&self.field(
                    "Adaptive",
                    if stream.is_adaptive() { "yes" } else { "no" },
                    &Color::Cyan,
                ));
                Ok(output)
            }
        }
    }

    pub fn format_manifest(&self, url: &str, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Self::json(&serde_json::json!({ "manifest_url": url })),
            OutputFormat::Pretty => Ok(format!(
                "{}\n{}",
                self.colorize("Captured Manifest:", &Color::Green, true),
                self.field("URL", url, &Color::Blue)
            )),
        }
    }

    pub fn format_levels(&self, levels: &[ManifestLevel], format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Self::json(&levels),
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize("Quality Levels:", &Color::Green, true));
                output.push('\n');
                if levels.is_empty() {
                    output.push_str("  Auto only (media playlist or direct file)\n");
                }
                for entry in levels {
                    let level = &entry.level;
                    output.push_str(&format!(
                        "  [{}] {} {}x{} {} kbps\n      {}\n",
                        level.index,
                        self.colorize(&level.name, &Color::Yellow, true),
                        level.width,
                        level.height,
                        level.bitrate / 1000,
                        self.colorize(&entry.url, &Color::Blue, false)
                    ));
                }
                Ok(output)
            }
        }
    }

    pub fn format_subtitles(
        &self,
        subtitles: &[SubtitleDescriptor],
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Json => Self::json(&subtitles),
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize(
                    &format!("Subtitles ({}):", subtitles.len()),
                    &Color::Green,
                    true,
                ));
                output.push('\n');
                for subtitle in subtitles {
                    output.push_str(&format!(
                        "  {} {} [{}, {}]{}\n",
                        self.colorize(&subtitle.id, &Color::Yellow, true),
                        subtitle.filename,
                        subtitle.format,
                        subtitle.encoding,
                        subtitle
                            .year
                            .as_deref()
                            .map(|y| format!(" {y}"))
                            .unwrap_or_default()
                    ));
                }
                Ok(output)
            }
        }
    }

    pub fn format_error(&self, message: &str, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::json!({
                "status": "error",
                "message": message,
            })
            .to_string(),
            OutputFormat::Pretty => format!("{} {message}", self.colorize("Error:", &Color::Red, true)),
        }
    }

    fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut output = serde_json::to_string_pretty(value)?;
        output.push('\n');
        Ok(output)
    }

    fn field(&self, name: &str, value: &str, color: &Color) -> String {
        format!(
            "  {}: {}\n",
            self.colorize(name, &Color::Yellow, false),
            self.colorize(value, color, false)
        )
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                    Color::Red => text.red(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (self.colored, color, bold);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
    Red,
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}
