use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filmy", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to <config dir>/filmy/config.toml)
    #[arg(long, global = true, env = "FILMY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Season and episode of a TV request; both or neither.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct EpisodeArgs {
    #[arg(short, long, requires = "episode")]
    pub season: Option<u32>,

    #[arg(short, long, requires = "season")]
    pub episode: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a playable stream, asking the content API first
    Resolve {
        /// Catalog content id
        content_id: String,

        #[command(flatten)]
        tv: EpisodeArgs,
    },

    /// Extract a stream from the embed providers only
    Extract {
        /// IMDb id (for example tt0111161)
        imdb_id: String,

        #[command(flatten)]
        tv: EpisodeArgs,
    },

    /// Load a page in a headless browser and capture the first manifest request
    Capture {
        url: String,

        /// Overall timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[arg(long)]
        user_agent: Option<String>,

        /// Do not stop shortly after the page finished loading
        #[arg(long)]
        no_wait: bool,
    },

    /// Search subtitles, or download one
    Subtitles {
        imdb_id: String,

        /// Subtitle language (for example eng)
        #[arg(short, long, default_value = "eng")]
        lang: String,

        #[command(flatten)]
        tv: EpisodeArgs,

        /// Download the subtitle with this file id as WebVTT
        #[arg(long)]
        download: Option<String>,

        /// Write the download here instead of stdout
        #[arg(long, requires = "download")]
        output_file: Option<PathBuf>,
    },

    /// List the quality levels of a manifest
    Levels { manifest_url: String },

    /// Show or reset the configuration
    Config {
        #[arg(long)]
        show: bool,

        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
