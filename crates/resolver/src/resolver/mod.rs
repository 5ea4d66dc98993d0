//! Embed page chain walker.
//!
//! A resolution fetches the provider's outer page and either takes an embedded
//! playlist directly (single hop) or follows the player iframe to the inner
//! page, whose `loadIframe` helper points at the player page. The manifest URL
//! is read from the player constructor on that last page. Hops run strictly in
//! order and any missing artifact ends the provider's attempt.

mod context;
mod provider;

pub use context::{ExtractionContext, HopRecord};
pub use provider::EmbedProvider;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::api::{ContentApi, WriteBackRecord};
use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::extractor::{
    EmbeddedPage, extract_iframe_loader_target, extract_player_manifest, select_attribute,
};
use crate::fetch::{FetchClient, RequestOptions};
use crate::media::{ContentRequest, Provenance, ResolvedStream};

#[derive(Clone)]
pub struct StreamResolver {
    fetch: FetchClient,
    config: Arc<ResolverConfig>,
    write_back: Option<Arc<dyn ContentApi>>,
}

impl StreamResolver {
    pub fn new(fetch: FetchClient, config: Arc<ResolverConfig>) -> Self {
        Self {
            fetch,
            config,
            write_back: None,
        }
    }

    /// Sends every extracted link to `sink` in the background.
    pub fn with_write_back(mut self, sink: Arc<dyn ContentApi>) -> Self {
        self.write_back = Some(sink);
        self
    }

    /// Resolves `imdb_id` through the configured providers, in order.
    ///
    /// `request` supplies the season/episode and the identifier used for
    /// write-back. Returns `Ok(None)` when no provider yields a manifest.
    pub async fn resolve(
        &self,
        imdb_id: &str,
        request: &ContentRequest,
    ) -> Result<Option<ResolvedStream>, ResolverError> {
        if imdb_id.trim().is_empty() {
            return Err(ResolverError::InvalidArgument(
                "imdb id must not be empty".to_string(),
            ));
        }

        let mut context = ExtractionContext::new(imdb_id, request.kind);
        for provider in &self.config.providers {
            context.clear_history();
            match self.resolve_with(provider, &mut context).await? {
                Some(manifest_url) => {
                    info!(
                        provider = %provider.name,
                        content = %context,
                        url = %manifest_url,
                        "Stream extracted"
                    );
                    let stream = ResolvedStream::new(
                        manifest_url,
                        Provenance::Extracted,
                        request.content_id.clone(),
                    );
                    self.spawn_write_back(&context, &stream);
                    return Ok(Some(stream));
                }
                None => {
                    warn!(provider = %provider.name, content = %context, "Provider chain failed");
                }
            }
        }

        Ok(None)
    }

    async fn resolve_with(
        &self,
        provider: &EmbedProvider,
        context: &mut ExtractionContext,
    ) -> Result<Option<String>, ResolverError> {
        let hops = &self.config.hops;

        // hop 1: outer embed page
        let outer_url = provider.outer_url(&context.imdb_id, &context.kind);
        let Some(outer_html) = self
            .fetch_hop(context, &outer_url, hops.outer(), None)
            .await?
        else {
            return Ok(None);
        };
        let outer = Url::parse(&outer_url)?;

        let page = EmbeddedPage::scan(&outer_html, &self.config.playlist_variable);
        if let Some(source) = page.playlist.as_ref().and_then(|p| p.best_source()) {
            debug!(label = %source.label, "Outer page embeds a playlist");
            return Ok(absolutize(&outer, &source.file, 1));
        }

        let Some(iframe_src) =
            select_attribute(&outer_html, &provider.iframe_selector, "src")?
        else {
            debug!(hop = 1, url = %outer, selector = %provider.iframe_selector, "No player iframe");
            return Ok(None);
        };

        // hop 2: inner iframe page
        let Some(inner) = absolutize(&outer, &iframe_src, 1).and_then(|u| Url::parse(&u).ok())
        else {
            return Ok(None);
        };
        let Some(inner_html) = self
            .fetch_hop(context, inner.as_str(), hops.inner(), Some(&outer))
            .await?
        else {
            return Ok(None);
        };

        let Some(loader_target) = extract_iframe_loader_target(&inner_html) else {
            debug!(hop = 2, url = %inner, "No iframe loader");
            return Ok(None);
        };

        // hop 3: player page, relative to the inner page's origin only
        let inner_origin = origin_of(&inner);
        let Some(player) =
            absolutize(&inner_origin, &loader_target, 2).and_then(|u| Url::parse(&u).ok())
        else {
            return Ok(None);
        };
        let Some(player_html) = self
            .fetch_hop(context, player.as_str(), hops.player(), Some(&inner))
            .await?
        else {
            return Ok(None);
        };

        match extract_player_manifest(&player_html) {
            Some(manifest) => Ok(absolutize(&player, &manifest, 3)),
            None => {
                debug!(hop = 3, url = %player, "No manifest in player page");
                Ok(None)
            }
        }
    }

    async fn fetch_hop(
        &self,
        context: &mut ExtractionContext,
        url: &str,
        timeout: Duration,
        referer: Option<&Url>,
    ) -> Result<Option<String>, ResolverError> {
        let mut options = RequestOptions::default();
        if let Some(referer) = referer {
            options = options.header("Referer", referer.as_str());
        }

        let hop = context.hop_history().len() + 1;
        let html = self.fetch.fetch_text(url, timeout, &options).await?;
        match &html {
            Some(body) => {
                debug!(hop, url, len = body.len(), "Hop fetched");
                context.record_hop(url, body.len());
            }
            None => debug!(hop, url, "Hop fetch failed"),
        }
        Ok(html)
    }

    fn spawn_write_back(&self, context: &ExtractionContext, stream: &ResolvedStream) {
        if !self.config.write_back {
            return;
        }
        let Some(sink) = self.write_back.clone() else {
            return;
        };

        let record = WriteBackRecord {
            content_id: stream.source_identifier.clone(),
            imdb_id: context.imdb_id.clone(),
            manifest_url: stream.manifest_url.clone(),
            season: context.season(),
            episode: context.episode(),
        };
        tokio::spawn(async move {
            match sink.write_back(&record).await {
                Ok(()) => debug!(content_id = %record.content_id, "Link written back"),
                Err(e) => warn!(content_id = %record.content_id, error = %e, "Write-back failed"),
            }
        });
    }
}

/// `scheme://host[:port]/` of `url`.
fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Resolves `target` against `base`; protocol-relative and root-relative
/// targets take the scheme and host of `base`.
fn absolutize(base: &Url, target: &str, hop: usize) -> Option<String> {
    match base.join(target.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.into()),
        Ok(url) => {
            warn!(hop, url = %url, "Unsupported scheme in extracted URL");
            None
        }
        Err(e) => {
            warn!(hop, raw = target, error = %e, "Extracted URL is malformed");
            None
        }
    }
}
