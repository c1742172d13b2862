//! Retrying HTTP client
//!
//! Wraps `reqwest` with the retry rules the accounting API expects: server
//! errors and throttling (`429`) are retried with exponential backoff, a
//! `Retry-After` header overrides the computed delay, and everything else is
//! returned to the caller untouched.

use std::time::Duration;

use ledgerlink_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use ledgerlink_domain::LedgerLinkError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// How failed attempts are retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request (initial try + retries).
    pub max_attempts: usize,
    pub base_backoff: Duration,
    /// Upper bound for any single delay, including server-requested ones.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), doubling each time.
    fn delay_for(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift).min(self.max_backoff)
    }

    fn retries_status(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }
}

/// HTTP client with built-in retry and timeout support.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn max_attempts(&self) -> usize {
        self.policy.max_attempts
    }

    /// Execute `builder`, retrying per the client's [`RetryPolicy`].
    ///
    /// The last response is returned whatever its status once attempts run
    /// out. The request body must be buffered so it can be replayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, LedgerLinkError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| LedgerLinkError::Internal("request body is not replayable".into()))?
                .build()
                .map_err(to_domain)?;
            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            let retry_delay = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    if attempt >= attempts || !RetryPolicy::retries_status(status) {
                        debug!(attempt, %method, %url, %status, "received HTTP response");
                        return Ok(response);
                    }
                    let delay = retry_after(&response).map_or_else(
                        || self.policy.delay_for(attempt),
                        |d| d.min(self.policy.max_backoff),
                    );
                    let delay_ms = delay.as_millis() as u64;
                    warn!(attempt, %url, %status, delay_ms, "retrying HTTP request");
                    delay
                }
                Err(err) => {
                    if attempt >= attempts || !is_transient(&err) {
                        return Err(to_domain(err));
                    }
                    let delay = self.policy.delay_for(attempt);
                    let delay_ms = delay.as_millis() as u64;
                    warn!(attempt, %url, error = %err, delay_ms, "retrying HTTP request");
                    delay
                }
            };

            if !retry_delay.is_zero() {
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            policy: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries); at least one.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, LedgerLinkError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient { client, policy: self.policy })
    }
}

fn to_domain(err: reqwest::Error) -> LedgerLinkError {
    LedgerLinkError::from(InfraError::from(err))
}

/// `Retry-After` in its delta-seconds form; HTTP dates are ignored.
fn retry_after(response: &Response) -> Option<Duration> {
    let value = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_attempts(attempts: usize) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(attempts)
            .build()
            .expect("http client")
    }

    /// Responds with `failures` copies of `failure`, then 200.
    async fn flaky_server(
        failures: usize,
        failure: ResponseTemplate,
    ) -> (MockServer, Arc<AtomicUsize>) {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        Mock::given(method("POST"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if counter.fetch_add(1, Ordering::SeqCst) < failures {
                    failure.clone()
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .mount(&server)
            .await;
        (server, calls)
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let (server, calls) = flaky_server(2, ResponseTemplate::new(500)).await;

        let client = client_with_attempts(3);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_throttled_requests_honouring_retry_after() {
        let throttled = ResponseTemplate::new(429).insert_header("retry-after", "0");
        let (server, calls) = flaky_server(1, throttled).await;

        let client = client_with_attempts(2);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_attempt_returns_server_error_as_is() {
        let (server, calls) = flaky_server(1, ResponseTemplate::new(503)).await;

        let client = client_with_attempts(1);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let (server, calls) = flaky_server(1, ResponseTemplate::new(400)).await;

        let client = client_with_attempts(3);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_refused_surfaces_as_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client");

        let result = client.send(client.request(Method::GET, format!("http://{addr}"))).await;
        assert!(matches!(result, Err(LedgerLinkError::Network(_))), "got {result:?}");
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
        };

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }
}
