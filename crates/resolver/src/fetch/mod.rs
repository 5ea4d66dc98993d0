//! Outbound HTTP with a browser-like default header set, per-attempt timeouts
//! and a linear retry budget.
//!
//! Expected failures (timeouts, connection errors, exhausted retries, 401/403/404)
//! come back as `Ok(None)`. `Err` is reserved for caller mistakes such as a
//! malformed URL or header.

mod retry;

pub use retry::{RetryAction, RetryPolicy, retry_with_backoff};

use std::collections::BTreeMap;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::ResolverError;
use crate::http::DEFAULT_UA;

/// Statuses treated as final answers rather than transient failures.
const DEFINITIVE_STATUSES: [StatusCode; 3] = [
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
];

/// Per-call additions to the default request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged over the defaults; caller values win.
    pub headers: BTreeMap<String, String>,
    /// Sent as a single `Cookie` header.
    pub cookies: BTreeMap<String, String>,
    /// Overrides the client's attempt budget.
    pub retries: Option<u32>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    default_headers: HeaderMap,
    policy: RetryPolicy,
}

impl FetchClient {
    pub fn new(client: Client) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );
        default_headers.insert(
            reqwest::header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );
        // Do not set `Accept-Encoding` here.
        // Reqwest adds it (and decompresses) when the gzip/deflate features are on.

        Self {
            client,
            default_headers,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url` and return the body as text.
    pub async fn fetch_text(
        &self,
        url: &str,
        timeout: Duration,
        options: &RequestOptions,
    ) -> Result<Option<String>, ResolverError> {
        self.fetch_with(url, timeout, options, |response| response.text())
            .await
    }

    /// GET `url` and return the raw body.
    pub async fn fetch_bytes(
        &self,
        url: &str,
        timeout: Duration,
        options: &RequestOptions,
    ) -> Result<Option<Bytes>, ResolverError> {
        self.fetch_with(url, timeout, options, |response| response.bytes())
            .await
    }

    async fn fetch_with<T, F, Fut>(
        &self,
        url: &str,
        timeout: Duration,
        options: &RequestOptions,
        read: F,
    ) -> Result<Option<T>, ResolverError>
    where
        F: Fn(Response) -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let target = parse_http_url(url)?;
        let headers = self.build_headers(options)?;
        let policy = match options.retries {
            Some(max_attempts) => RetryPolicy {
                max_attempts,
                ..self.policy.clone()
            },
            None => self.policy.clone(),
        };
        if policy.max_attempts == 0 {
            return Err(ResolverError::InvalidArgument(
                "retries must be at least 1".to_string(),
            ));
        }

        let read = &read;
        let target_ref = &target;
        let body = retry_with_backoff(&policy, |attempt| {
            let target = target_ref;
            let request = self
                .client
                .get(target.clone())
                .headers(headers.clone())
                .timeout(timeout);
            async move {
                debug!(url = %target, attempt = attempt + 1, "Fetching");
                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) if e.is_timeout() => {
                        return RetryAction::Retry(format!("timed out after {timeout:?}"));
                    }
                    Err(e) => return RetryAction::Retry(e.to_string()),
                };

                let status = response.status();
                if status.is_success() {
                    match read(response).await {
                        Ok(body) => RetryAction::Success(body),
                        Err(e) => RetryAction::Retry(e.to_string()),
                    }
                } else if DEFINITIVE_STATUSES.contains(&status) {
                    RetryAction::Stop(format!("HTTP {status}"))
                } else {
                    RetryAction::Retry(format!("HTTP {status}"))
                }
            }
        })
        .await;

        if body.is_none() {
            debug!(url = %target, "Fetch gave up");
        }
        Ok(body)
    }

    /// HEAD reachability probe. Every failure is logged and reported as `false`.
    pub async fn probe(&self, url: &str, timeout: Duration) -> bool {
        let target = match parse_http_url(url) {
            Ok(target) => target,
            Err(e) => {
                warn!(url, error = %e, "Probe skipped");
                return false;
            }
        };

        match self
            .client
            .head(target)
            .headers(self.default_headers.clone())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(url, status = %response.status(), "Probe rejected");
                false
            }
            Err(e) => {
                warn!(url, error = %e, "Probe failed");
                false
            }
        }
    }

    /// Single-attempt JSON GET; failures are errors, not `None`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, ResolverError> {
        let target = parse_http_url(url)?;
        let mut headers = self.default_headers.clone();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        let response = self
            .client
            .get(target)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Single-attempt JSON PUT; the response body is ignored.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<(), ResolverError> {
        let target = parse_http_url(url)?;
        self.client
            .put(target)
            .headers(self.default_headers.clone())
            .json(body)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap, ResolverError> {
        let mut headers = self.default_headers.clone();

        for (name, value) in &options.headers {
            let header_name =
                HeaderName::from_str(name).map_err(|e| ResolverError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ResolverError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        if let Some(cookie) = build_cookie_header(&options.cookies) {
            let value =
                HeaderValue::from_str(&cookie).map_err(|e| ResolverError::InvalidHeader {
                    name: reqwest::header::COOKIE.to_string(),
                    reason: e.to_string(),
                })?;
            headers.insert(reqwest::header::COOKIE, value);
        }

        Ok(headers)
    }
}

/// Parses an absolute `http(s)` URL.
pub fn parse_http_url(url: &str) -> Result<Url, ResolverError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ResolverError::InvalidUrl(format!(
            "unsupported scheme `{scheme}` in {url}"
        ))),
    }
}

fn build_cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }

    let mut cookie_string = String::with_capacity(
        cookies
            .iter()
            .map(|(k, v)| k.len() + 1 + v.len() + 2)
            .sum(),
    );
    for (name, value) in cookies {
        if !cookie_string.is_empty() {
            cookie_string.push_str("; ");
        }
        cookie_string.push_str(name);
        cookie_string.push('=');
        cookie_string.push_str(value);
    }
    Some(cookie_string)
}
