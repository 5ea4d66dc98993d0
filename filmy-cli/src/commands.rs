use crate::{
    cli::{EpisodeArgs, OutputFormat},
    context::AppContext,
    error::{AppError, Result},
    output::{OutputManager, write_output},
};
use filmy_player::{manifest::parse_levels, subtitle::to_webvtt};
use filmy_resolver::{
    ContentRequest,
    capture::CaptureOptions,
    fetch::RequestOptions,
    subtitles::SubtitleProvider,
};
use std::{path::Path, time::Duration};
use tracing::{debug, info};

pub struct CommandExecutor {
    context: AppContext,
    output: OutputManager,
    format: OutputFormat,
}

impl CommandExecutor {
    pub fn new(context: AppContext, format: OutputFormat, colored: bool) -> Self {
        Self {
            context,
            output: OutputManager::new(colored),
            format,
        }
    }

    pub async fn resolve(&self, content_id: &str, tv: EpisodeArgs) -> Result<()> {
        let request = ContentRequest::from_parts(content_id, tv.season, tv.episode);
        let stream = self
            .context
            .coordinator
            .resolve_playable_url(&request)
            .await?;
        write_output(&self.output.format_stream(&stream, self.format)?, None)
    }

    pub async fn extract(&self, imdb_id: &str, tv: EpisodeArgs) -> Result<()> {
        let request = ContentRequest::from_parts(imdb_id, tv.season, tv.episode);
        let stream = self
            .context
            .resolver()
            .resolve(imdb_id, &request)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no stream extracted for {imdb_id}")))?;
        write_output(&self.output.format_stream(&stream, self.format)?, None)
    }

    pub async fn capture(
        &self,
        url: &str,
        timeout: Option<u64>,
        user_agent: Option<String>,
        no_wait: bool,
    ) -> Result<()> {
        let mut options = CaptureOptions::from_config(url, &self.context.config.capture);
        if let Some(secs) = timeout {
            options.timeout = Duration::from_secs(secs);
        }
        if user_agent.is_some() {
            options.user_agent = user_agent;
        }
        if no_wait {
            options.wait_for_load = false;
        }
        options.validate()?;

        let manifest = self.run_capture(&options).await?;
        write_output(&self.output.format_manifest(&manifest, self.format)?, None)
    }

    #[cfg(feature = "chromium")]
    async fn run_capture(&self, options: &CaptureOptions) -> Result<String> {
        use filmy_resolver::capture::{chromium::ChromiumSurface, extract_manifest};

        let surface = ChromiumSurface::launch().await?;
        Ok(extract_manifest(surface, options).await?)
    }

    #[cfg(not(feature = "chromium"))]
    async fn run_capture(&self, _options: &CaptureOptions) -> Result<String> {
        Err(AppError::InvalidInput(
            "capture needs a build with the `chromium` feature".to_string(),
        ))
    }

    pub async fn subtitles(
        &self,
        imdb_id: &str,
        language: &str,
        tv: EpisodeArgs,
        download: Option<&str>,
        output_file: Option<&Path>,
    ) -> Result<()> {
        let kind = ContentRequest::from_parts(imdb_id, tv.season, tv.episode).kind;
        let found = self
            .context
            .subtitles
            .search(imdb_id, language, &kind)
            .await?;
        debug!(count = found.len(), "Subtitle search finished");

        let Some(id) = download else {
            return write_output(&self.output.format_subtitles(&found, self.format)?, None);
        };

        let descriptor = found
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("subtitle {id}")))?;
        let text = self.context.subtitles.download(descriptor).await?;
        let vtt = to_webvtt(&text, Some(&descriptor.format));

        write_output(&vtt, output_file)?;
        if let Some(path) = output_file {
            info!(path = %path.display(), "Subtitle saved");
        }
        Ok(())
    }

    pub async fn levels(&self, manifest_url: &str) -> Result<()> {
        let bytes = self
            .context
            .fetch
            .fetch_bytes(
                manifest_url,
                self.context.config.hops.player(),
                &RequestOptions::default(),
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("manifest {manifest_url}")))?;

        let levels = parse_levels(&bytes, manifest_url)?;
        write_output(&self.output.format_levels(&levels, self.format)?, None)
    }
}
