use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ContentApi;
use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::fetch::FetchClient;
use crate::media::{ContentRequest, Provenance, ResolvedStream};
use crate::resolver::StreamResolver;

/// Picks between the API's candidate link and an extracted one.
///
/// The candidate is probed first; the probe only advises, so any failure
/// falls through to extraction.
#[derive(Clone)]
pub struct FallbackCoordinator {
    api: Arc<dyn ContentApi>,
    resolver: StreamResolver,
    fetch: FetchClient,
    config: Arc<ResolverConfig>,
}

impl FallbackCoordinator {
    pub fn new(
        api: Arc<dyn ContentApi>,
        resolver: StreamResolver,
        fetch: FetchClient,
        config: Arc<ResolverConfig>,
    ) -> Self {
        Self {
            api,
            resolver,
            fetch,
            config,
        }
    }

    pub fn resolver(&self) -> &StreamResolver {
        &self.resolver
    }

    pub async fn resolve_playable_url(
        &self,
        request: &ContentRequest,
    ) -> Result<ResolvedStream, ResolverError> {
        if request.content_id.trim().is_empty() {
            return Err(ResolverError::InvalidArgument(
                "content id must not be empty".to_string(),
            ));
        }

        let candidate = self.api.request_play_link(request).await?;

        if let Some(link) = candidate.play_link.as_deref().filter(|l| !l.is_empty()) {
            if self.fetch.probe(link, self.config.probe_timeout()).await {
                info!(content_id = %request.content_id, url = link, "Using API link");
                return Ok(ResolvedStream::new(
                    link,
                    Provenance::Api,
                    request.content_id.clone(),
                ));
            }
            debug!(content_id = %request.content_id, "API link unreachable, extracting");
        }

        let Some(imdb_id) = candidate.imdb_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!(content_id = %request.content_id, "No imdb id to extract with");
            return Err(ResolverError::Unresolvable {
                content_id: request.content_id.clone(),
            });
        };

        match self.resolver.resolve(imdb_id, request).await? {
            Some(stream) => Ok(stream),
            None => Err(ResolverError::Unresolvable {
                content_id: request.content_id.clone(),
            }),
        }
    }
}
