//! Recording mock for the `Transport` port
//!
//! Replays canned responses in order and keeps every request it was given,
//! so tests can assert on the exact wire traffic.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ledgerlink_core::{Headers, Transport, TransportRequest, TransportResponse};
use ledgerlink_domain::{LedgerLinkError, Result as DomainResult};
use serde_json::Value;

#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<DomainResult<TransportResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and a JSON body.
    pub fn respond_json(&self, status: u16, body: &Value) -> &Self {
        let body = serde_json::to_vec(body).expect("serializable body");
        self.respond_raw(status, body)
    }

    /// Queue a response with `status` and raw body bytes.
    pub fn respond_raw(&self, status: u16, body: Vec<u8>) -> &Self {
        let mut headers = Headers::new();
        headers.insert("content-type", "application/json");
        self.responses.lock().unwrap().push_back(Ok(TransportResponse { status, body, headers }));
        self
    }

    /// Queue a transport-level failure.
    pub fn fail_with(&self, error: LedgerLinkError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of `send` calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Copy of every request received, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Body of the most recent request parsed as JSON.
    pub fn last_body(&self) -> Value {
        let requests = self.requests.lock().unwrap();
        let request = requests.last().expect("at least one request");
        serde_json::from_slice(&request.body).expect("request body is JSON")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: TransportRequest) -> DomainResult<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LedgerLinkError::Internal("no canned response left".into())))
    }
}
