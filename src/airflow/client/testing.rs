//! In-memory transport that replays queued responses and records requests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::base::{HttpRequest, HttpResponse, Transport};
use crate::airflow::error::{AdapterError, AdapterResult};

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<AdapterResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: AdapterResult<HttpResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::json(status, body)));
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.push(Ok(HttpResponse::text(status, body)));
    }

    pub fn push_error(&self, error: AdapterError) {
        self.push(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `"METHOD path"` for every recorded request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> AdapterResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AdapterError::Connectivity {
                    message: "no scripted response left".to_string(),
                })
            })
    }
}
