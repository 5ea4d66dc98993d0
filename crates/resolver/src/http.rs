use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;

use crate::error::ResolverError;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Upper bound applied at the client level; per-request timeouts are always shorter.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the shared HTTP client.
///
/// TLS is configured explicitly (ring provider, platform verifier) so that no
/// process-wide crypto provider needs to be installed first.
pub fn default_client() -> Result<Client, ResolverError> {
    let provider = Arc::new(ring::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ResolverError::TlsError(e.to_string()))?
        .with_platform_verifier()
        .map_err(|e| ResolverError::TlsError(e.to_string()))?
        .with_no_client_auth();

    Client::builder()
        .use_preconfigured_tls(tls_config)
        .timeout(CLIENT_TIMEOUT)
        .build()
        .map_err(ResolverError::from)
}
