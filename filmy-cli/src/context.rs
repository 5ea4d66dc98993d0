use crate::{config::AppConfig, error::Result};
use filmy_player::PlayerConfig;
use filmy_resolver::{
    api::{ContentApi, HttpContentApi},
    config::ResolverConfig,
    fallback::FallbackCoordinator,
    fetch::FetchClient,
    http::default_client,
    resolver::StreamResolver,
    subtitles::OpenSubtitlesClient,
};
use std::sync::Arc;

/// Everything the commands need, built once at startup.
pub struct AppContext {
    pub config: Arc<ResolverConfig>,
    pub player: PlayerConfig,
    pub fetch: FetchClient,
    pub coordinator: FallbackCoordinator,
    pub subtitles: OpenSubtitlesClient,
}

impl AppContext {
    pub fn new(app_config: &AppConfig) -> Result<Self> {
        let config = Arc::new(app_config.resolver.clone());
        let fetch = FetchClient::new(default_client()?).with_retry_policy(config.retry_policy());

        let api: Arc<dyn ContentApi> =
            Arc::new(HttpContentApi::new(fetch.clone(), config.api.clone()));
        let resolver = StreamResolver::new(fetch.clone(), config.clone()).with_write_back(api.clone());
        let coordinator = FallbackCoordinator::new(api, resolver, fetch.clone(), config.clone());
        let subtitles = OpenSubtitlesClient::new(fetch.clone(), config.subtitles.clone());

        Ok(Self {
            config,
            player: app_config.player.clone(),
            fetch,
            coordinator,
            subtitles,
        })
    }

    pub fn resolver(&self) -> &StreamResolver {
        self.coordinator.resolver()
    }
}
