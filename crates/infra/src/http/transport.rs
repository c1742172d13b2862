//! `Transport` implementation over [`HttpClient`]

use std::sync::Arc;

use async_trait::async_trait;
use ledgerlink_core::{Headers, HttpMethod, Transport, TransportRequest, TransportResponse};
use ledgerlink_domain::{LedgerLinkError, Result};
use reqwest::Method;
use tracing::{debug, instrument};

use super::auth::AccessTokenProvider;
use super::client::HttpClient;
use crate::errors::InfraError;

/// Sends batch requests over HTTP with a bearer token.
///
/// Every response that arrives is handed back, including non-2xx ones; the
/// batch engine decides what a status means.
pub struct HttpTransport {
    client: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl HttpTransport {
    pub fn new(client: HttpClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, uri = %request.uri))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let token = self.tokens.access_token().await?;

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = self.client.request(method, request.uri.as_str()).bearer_auth(token);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        let builder = builder.body(request.body);

        let response = self.client.send(builder).await?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str(), value.to_string()))
            })
            .collect();
        let body =
            response.bytes().await.map_err(|err| LedgerLinkError::from(InfraError::from(err)))?;

        debug!(status, bytes = body.len(), "HTTP transport received response");
        Ok(TransportResponse { status, body: body.to_vec(), headers })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::StaticTokenProvider;

    fn transport() -> HttpTransport {
        let client =
            HttpClient::builder().max_attempts(1).timeout(Duration::from_secs(5)).build().unwrap();
        HttpTransport::new(client, Arc::new(StaticTokenProvider::new("token-123").unwrap()))
    }

    #[tokio::test]
    async fn sends_bearer_token_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/company/42/batch"))
            .and(query_param("requestid", "r1"))
            .and(header("authorization", "Bearer token-123"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"BatchItemRequest":[]}"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-request-id", "abc")
                    .set_body_string("{}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json");
        let response = transport()
            .send(TransportRequest {
                uri: format!("{}/v3/company/42/batch?requestid=r1", server.uri()),
                method: HttpMethod::Post,
                headers,
                body: br#"{"BatchItemRequest":[]}"#.to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{}");
        assert_eq!(response.headers.get("X-Request-Id"), Some("abc"));
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let response = transport()
            .send(TransportRequest {
                uri: server.uri(),
                method: HttpMethod::Post,
                headers: Headers::new(),
                body: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert!(!response.is_success());
    }
}
