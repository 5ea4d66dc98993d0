//! Headless Chromium surface.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventRequestWillBeSent};
use chromiumoxide::cdp::browser_protocol::page::EventLoadEventFired;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{CaptureError, RenderSurface, SurfaceEvent};

pub struct ChromiumSurface {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    tasks: Vec<JoinHandle<()>>,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    sender: mpsc::UnboundedSender<SurfaceEvent>,
}

impl ChromiumSurface {
    /// Launches a headless browser.
    pub async fn launch() -> Result<Self, CaptureError> {
        let config = BrowserConfig::builder()
            .window_size(1280, 720)
            .build()
            .map_err(CaptureError::Surface)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CaptureError::Surface(e.to_string()))?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let (sender, events) = mpsc::unbounded_channel();
        Ok(Self {
            browser,
            handler,
            page: None,
            tasks: Vec::new(),
            events,
            sender,
        })
    }
}

#[async_trait]
impl RenderSurface for ChromiumSurface {
    async fn open(&mut self, url: &str, user_agent: Option<&str>) -> Result<(), CaptureError> {
        let surface_err = |e: chromiumoxide::error::CdpError| CaptureError::Surface(e.to_string());

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(surface_err)?;
        if let Some(user_agent) = user_agent {
            page.set_user_agent(user_agent).await.map_err(surface_err)?;
        }
        page.execute(EnableParams::default())
            .await
            .map_err(surface_err)?;

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(surface_err)?;
        let tx = self.sender.clone();
        self.tasks.push(tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                if tx
                    .send(SurfaceEvent::Request(event.request.url.clone()))
                    .is_err()
                {
                    break;
                }
            }
        }));

        let mut loads = page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(surface_err)?;
        let tx = self.sender.clone();
        self.tasks.push(tokio::spawn(async move {
            while loads.next().await.is_some() {
                if tx.send(SurfaceEvent::LoadFinished).is_err() {
                    break;
                }
            }
        }));

        let navigation = page.clone();
        let target = url.to_string();
        let tx = self.sender.clone();
        self.tasks.push(tokio::spawn(async move {
            if let Err(e) = navigation.goto(target.as_str()).await {
                debug!(url = %target, error = %e, "Navigation failed");
                let _ = tx.send(SurfaceEvent::LoadFailed {
                    code: -1,
                    description: e.to_string(),
                });
            }
        }));

        self.page = Some(page);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SurfaceEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            warn!(error = %e, "Failed to close page");
        }
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}
