//! [`FetchClient`]: one pooled HTTP client shared by every script call.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use scriptnet_types::config::FetchConfig;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::FetchError;
use crate::options::{FetchOptions, FetchResult};

/// Content type for bodies sent without an explicit `Content-Type` header.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Outbound HTTP client.
///
/// Stateless per call; clones share the connection pool. Requests run on
/// the tokio runtime captured at construction, so [`fetch_async`] and
/// [`fetch_blocking`] can be called from host threads outside it.
///
/// [`fetch_async`]: FetchClient::fetch_async
/// [`fetch_blocking`]: FetchClient::fetch_blocking
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    runtime: Handle,
}

impl FetchClient {
    /// Build a client with the connect/read/write timeouts from `config`.
    ///
    /// reqwest has no separate write timeout, so the three are summed into
    /// an overall per-request bound.
    pub fn new(config: &FetchConfig, runtime: Handle) -> Result<Self, FetchError> {
        let connect = Duration::from_secs(config.connect_timeout_secs);
        let read = Duration::from_secs(config.read_timeout_secs);
        let write = Duration::from_secs(config.write_timeout_secs);

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(connect)
            .read_timeout(read)
            .timeout(connect + write + read)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { http, runtime })
    }

    /// Perform a request and read the full response body.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
        let request = self.build_request(url, options)?;
        debug!(url = %url, method = %options.normalized_method(), "fetching");

        let network = |source: reqwest::Error| {
            error!(url = %url, error = %source, "fetch request failed");
            FetchError::Network {
                url: url.to_string(),
                source,
            }
        };

        let response = request.send().await.map_err(network)?;

        let status = response.status();
        let mut headers = std::collections::HashMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let body_text = response.text().await.map_err(network)?;

        debug!(url = %url, status = status.as_u16(), bytes = body_text.len(), "fetch complete");
        Ok(FetchResult {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body_text,
        })
    }

    /// Start a request in the background and return a handle to await.
    ///
    /// Never blocks the calling thread.
    pub fn fetch_async(&self, url: &str, options: &FetchOptions) -> FetchHandle {
        let client = self.clone();
        let url = url.to_string();
        let options = options.clone();
        let inner = self
            .runtime
            .spawn(async move { client.fetch(&url, &options).await });
        FetchHandle { inner }
    }

    /// Perform a request, blocking the calling thread until it completes.
    ///
    /// Meant for host threads that are not tokio workers. Called from
    /// inside a runtime it fails with `TaskFailed` instead of blocking a
    /// worker; use [`fetch`](FetchClient::fetch) there.
    pub fn fetch_blocking(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
        if Handle::try_current().is_ok() {
            return Err(FetchError::TaskFailed(
                "blocking fetch called from inside the async runtime".into(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        let client = self.clone();
        let url = url.to_string();
        let options = options.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(client.fetch(&url, &options).await);
        });
        rx.blocking_recv()
            .map_err(|_| FetchError::TaskFailed("fetch task ended without a result".into()))?
    }

    fn build_request(&self, url: &str, options: &FetchOptions) -> Result<RequestBuilder, FetchError> {
        let method_name = options.normalized_method();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| FetchError::InvalidMethod(method_name.clone()))?;

        let mut request = self.http.request(method.clone(), url);
        for (name, value) in &options.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            request = request.header(header_name, header_value);
        }

        match &options.body {
            Some(body) => {
                if options.content_type().is_none() {
                    request = request.header(CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
                }
                request = request.body(body.clone());
            }
            None if requires_body(&method) => {
                request = request.body(String::new());
            }
            None => {}
        }
        Ok(request)
    }
}

fn requires_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// A fetch running in the background. Await it for the result.
#[derive(Debug)]
pub struct FetchHandle {
    inner: JoinHandle<Result<FetchResult, FetchError>>,
}

impl FetchHandle {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Cancel the request. Awaiting afterwards yields `TaskFailed`.
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl Future for FetchHandle {
    type Output = Result<FetchResult, FetchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|e| Err(FetchError::TaskFailed(e.to_string()))))
    }
}
