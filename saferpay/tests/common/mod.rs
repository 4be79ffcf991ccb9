//! Shared test doubles for the Saferpay integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use saferpay::{
    Config, Error, EventLogger, HttpRequest, HttpResponse, Result, SaferpayClient, Severity,
    Transport,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const TEST_ACCOUNT: &str = "99867-94913159";
pub const PRODUCTION_ACCOUNT: &str = "401860-17795278";
pub const BASE_URL: &str = "https://test.saferpay.example/hosting";

/// Transport that replays scripted responses and records every request
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<VecDeque<HttpResponse>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every request with the same response
    pub fn always(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(HttpResponse {
                status,
                body: body.to_string(),
            }),
            ..Self::default()
        })
    }

    /// Answer requests in order with the given responses
    pub fn replying(responses: &[(u16, &str)]) -> Arc<Self> {
        let scripted = responses
            .iter()
            .map(|(status, body)| HttpResponse {
                status: *status,
                body: body.to_string(),
            })
            .collect();
        Arc::new(Self {
            scripted: Mutex::new(scripted),
            ..Self::default()
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(response) = self.scripted.lock().unwrap().pop_front() {
            return Ok(response);
        }
        self.fallback
            .clone()
            .ok_or_else(|| Error::Connection("no scripted response left".to_string()))
    }
}

/// One recorded protocol event
#[derive(Debug, Clone)]
pub struct Event {
    pub severity: Severity,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

/// Logger that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<Event>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.severity == severity)
            .collect()
    }

    /// Every message and field value, for leak checks
    pub fn transcript(&self) -> String {
        self.events()
            .iter()
            .flat_map(|e| {
                std::iter::once(e.message.clone()).chain(e.fields.iter().map(|(_, v)| v.clone()))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EventLogger for RecordingLogger {
    fn log(&self, severity: Severity, message: &str, fields: &[(&str, &str)]) {
        self.events.lock().unwrap().push(Event {
            severity,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}

pub fn test_config() -> Config {
    Config {
        base_url: BASE_URL.to_string(),
        ..Config::default()
    }
}

pub fn client_with(
    config: Config,
    transport: &Arc<MockTransport>,
    logger: &Arc<RecordingLogger>,
) -> SaferpayClient {
    SaferpayClient::builder(config)
        .shared_transport(transport.clone())
        .shared_logger(logger.clone())
        .build()
        .unwrap()
}

/// Decode a form body into a map
pub fn form(body: &str) -> BTreeMap<String, String> {
    serde_urlencoded::from_str(body).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
