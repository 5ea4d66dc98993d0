//! Manifest capture from a rendered page.
//!
//! The page is loaded in an isolated surface and its outbound requests are
//! watched; the first request for a manifest wins. After the page reports
//! load completion a short grace window catches late requests.

#[cfg(feature = "chromium")]
pub mod chromium;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::media::is_hls_url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("invalid capture url: {0}")]
    InvalidUrl(String),
    #[error("no manifest requested within {0:?}")]
    Timeout(Duration),
    #[error("no manifest requested after the page finished loading")]
    NoManifest,
    #[error("failed to load page: {description} (code {code})")]
    LoadFailed { code: i64, description: String },
    #[error("render surface closed unexpectedly")]
    SurfaceClosed,
    #[error("render surface error: {0}")]
    Surface(String),
}

/// What a surface reports while a page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// An outbound request is about to be sent.
    Request(String),
    LoadFinished,
    LoadFailed { code: i64, description: String },
}

/// An isolated page renderer with network observation.
#[async_trait]
pub trait RenderSurface: Send {
    /// Starts loading `url`. Events follow through [`RenderSurface::next_event`].
    async fn open(&mut self, url: &str, user_agent: Option<&str>) -> Result<(), CaptureError>;

    /// Next event, or `None` once the surface can report nothing more.
    async fn next_event(&mut self) -> Option<SurfaceEvent>;

    /// Releases the surface. Called exactly once per capture.
    async fn close(&mut self);
}

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub wait_for_load: bool,
    pub grace: Duration,
}

impl CaptureOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_config(url, &CaptureConfig::default())
    }

    pub fn from_config(url: impl Into<String>, config: &CaptureConfig) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_millis(config.timeout_ms),
            user_agent: config.user_agent.clone(),
            wait_for_load: config.wait_for_load,
            grace: Duration::from_millis(config.grace_ms),
        }
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CaptureError::InvalidUrl("url is required".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CaptureError::InvalidUrl(format!(
                "url must start with http:// or https://: {url}"
            )));
        }
        Ok(())
    }
}

/// Loads `options.url` in `surface` and returns the first manifest it requests.
///
/// The surface is closed before returning, whatever the outcome.
pub async fn extract_manifest<S: RenderSurface>(
    mut surface: S,
    options: &CaptureOptions,
) -> Result<String, CaptureError> {
    let outcome = async {
        options.validate()?;
        // page open and event watching share one budget
        let deadline = Instant::now() + options.timeout;
        timeout_at(
            deadline,
            surface.open(options.url.trim(), options.user_agent.as_deref()),
        )
        .await
        .map_err(|_| CaptureError::Timeout(options.timeout))??;
        watch(&mut surface, options, deadline).await
    }
    .await;

    surface.close().await;
    match &outcome {
        Ok(url) => info!(page = %options.url, manifest = %url, "Manifest captured"),
        Err(e) => warn!(page = %options.url, error = %e, "Capture failed"),
    }
    outcome
}

async fn watch<S: RenderSurface>(
    surface: &mut S,
    options: &CaptureOptions,
    deadline: Instant,
) -> Result<String, CaptureError> {
    let mut grace_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => {
                return Err(CaptureError::Timeout(options.timeout));
            }
            _ = sleep_until(grace_deadline.unwrap_or(deadline)), if grace_deadline.is_some() => {
                return Err(CaptureError::NoManifest);
            }
            event = surface.next_event() => match event {
                Some(SurfaceEvent::Request(url)) if is_hls_url(&url) => return Ok(url),
                Some(SurfaceEvent::Request(_)) => {}
                Some(SurfaceEvent::LoadFinished) => {
                    if options.wait_for_load && grace_deadline.is_none() {
                        debug!(grace = ?options.grace, "Page loaded, arming grace window");
                        grace_deadline = Some(Instant::now() + options.grace);
                    }
                }
                Some(SurfaceEvent::LoadFailed { code, description }) => {
                    return Err(CaptureError::LoadFailed { code, description });
                }
                None => return Err(CaptureError::SurfaceClosed),
            },
        }
    }
}
