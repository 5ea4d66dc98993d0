//! Stream resolution pipeline.
//!
//! Turns a catalog content identifier into a playable manifest URL. The
//! metadata API is asked first; when its candidate link is missing or
//! unreachable the [`resolver::StreamResolver`] walks the embed page chain
//! (outer page → inner iframe → player page) and pulls the manifest URL out of
//! the player initialization code.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use filmy_resolver::{
//! #     api::HttpContentApi, config::ResolverConfig, fallback::FallbackCoordinator,
//! #     fetch::FetchClient, http::default_client, media::ContentRequest,
//! #     resolver::StreamResolver,
//! # };
//! # async fn run() -> Result<(), filmy_resolver::ResolverError> {
//! let config = Arc::new(ResolverConfig::default());
//! let fetch = FetchClient::new(default_client()?);
//! let api = Arc::new(HttpContentApi::new(fetch.clone(), config.api.clone()));
//! let resolver = StreamResolver::new(fetch.clone(), config.clone()).with_write_back(api.clone());
//! let coordinator = FallbackCoordinator::new(api, resolver, fetch, config);
//!
//! let stream = coordinator
//!     .resolve_playable_url(&ContentRequest::movie("tt0111161"))
//!     .await?;
//! println!("{} ({})", stream.manifest_url, stream.provenance);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod capture;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod fetch;
pub mod http;
pub mod media;
pub mod resolver;
pub mod subtitles;

pub use error::ResolverError;
pub use media::{ContentRequest, MediaKind, Provenance, ResolvedStream};
