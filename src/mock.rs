use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Instant,
};

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use sonic_rs::to_vec;

use super::adapter::{
    ApiError, ApiFuture, ApiRequest, ApiResponse, ApiResult, ApiTransport,
};

/// Scripted outcome for one request against the mock. The plan is FIFO; a
/// request with no planned behavior passes through to the response queues.
#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    #[default]
    Pass,
    Fail(ApiError),
}

impl MockBehavior {
    pub fn connect_error(message: impl Into<String>) -> Self {
        Self::Fail(ApiError::connect(message))
    }

    pub fn send_error(message: impl Into<String>) -> Self {
        Self::Fail(ApiError::send(message))
    }

    pub fn receive_error(message: impl Into<String>) -> Self {
        Self::Fail(ApiError::receive(message))
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::Fail(ApiError::timeout(message))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Fail(ApiError::internal(message))
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, Bytes)>,
    pub body: Bytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }

    pub fn json<T: Serialize>(status: u16, payload: &T) -> ApiResult<Self> {
        let body = to_vec(payload).map_err(ApiError::from)?;
        Ok(Self::new(status, body))
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Observable state of the mock after any number of requests.
#[derive(Clone, Debug)]
pub struct MockSnapshot {
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub last_error: Option<String>,
    pub responses_remaining: usize,
}

#[derive(Debug, Default)]
struct MockTransportState {
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    last_error: Option<String>,
    behaviors: VecDeque<MockBehavior>,
    default_queue: VecDeque<MockResponse>,
    route_queues: HashMap<(Method, String), VecDeque<MockResponse>>,
    outbound_log: Vec<ApiRequest>,
}

#[derive(Clone, Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockTransportState::default())),
        }
    }

    pub fn push_behavior(&self, behavior: MockBehavior) {
        self.state
            .lock()
            .expect("mock transport mutex poisoned while pushing behavior")
            .behaviors
            .push_back(behavior);
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.state
            .lock()
            .expect("mock transport mutex poisoned while queueing response")
            .default_queue
            .push_back(response);
    }

    pub fn queue_response_for(
        &self,
        method: Method,
        url: impl Into<String>,
        response: MockResponse,
    ) {
        let key = (method, url.into());
        self.state
            .lock()
            .expect("mock transport mutex poisoned while queueing response by route")
            .route_queues
            .entry(key)
            .or_default()
            .push_back(response);
    }

    pub fn queue_post_response(&self, url: impl Into<String>, response: MockResponse) {
        self.queue_response_for(Method::POST, url, response);
    }

    pub fn snapshot(&self) -> MockSnapshot {
        let state = self
            .state
            .lock()
            .expect("mock transport mutex poisoned while taking snapshot");
        MockSnapshot {
            request_count: state.request_count,
            last_url: state.last_url.clone(),
            last_status: state.last_status,
            last_error: state.last_error.clone(),
            responses_remaining: state.default_queue.len()
                + state.route_queues.values().map(VecDeque::len).sum::<usize>(),
        }
    }

    /// Every request the mock has seen, in order.
    pub fn outbound_requests(&self) -> Vec<ApiRequest> {
        self.state
            .lock()
            .expect("mock transport mutex poisoned while reading outbound log")
            .outbound_log
            .clone()
    }

    fn pop_behavior(&self) -> MockBehavior {
        self.state
            .lock()
            .expect("mock transport mutex poisoned while reading behavior plan")
            .behaviors
            .pop_front()
            .unwrap_or_default()
    }

    fn next_response(&self, request: &ApiRequest) -> Option<MockResponse> {
        let mut state = self
            .state
            .lock()
            .expect("mock transport mutex poisoned while selecting response");
        let route_key = (request.method.clone(), request.url.clone());
        if let Some(queue) = state.route_queues.get_mut(&route_key) {
            if let Some(response) = queue.pop_front() {
                return Some(response);
            }
        }
        state.default_queue.pop_front()
    }

    fn record_request(&self, request: &ApiRequest) {
        let mut state = self
            .state
            .lock()
            .expect("mock transport mutex poisoned while recording request");
        state.request_count += 1;
        state.last_url = Some(request.url.clone());
        state.last_error = None;
        state.outbound_log.push(request.clone());
    }

    fn record_error(&self, error: &ApiError) {
        let mut state = self
            .state
            .lock()
            .expect("mock transport mutex poisoned while recording error");
        state.last_error = Some(error.message().to_string());
        state.last_status = error.status();
    }

    fn record_response(&self, status: u16) {
        let mut state = self
            .state
            .lock()
            .expect("mock transport mutex poisoned while recording response");
        state.last_status = Some(status);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiTransport for MockTransport {
    fn execute(&self, request: ApiRequest) -> ApiFuture<ApiResult<ApiResponse>> {
        let mock = self.clone();
        Box::pin(async move {
            let start = Instant::now();
            mock.record_request(&request);

            if let MockBehavior::Fail(error) = mock.pop_behavior() {
                mock.record_error(&error);
                return Err(error);
            }

            // No queued response behaves as an empty 200 body.
            let response = mock.next_response(&request).unwrap_or_else(|| MockResponse {
                status: 200,
                headers: Vec::new(),
                body: Bytes::new(),
            });

            mock.record_response(response.status);
            Ok(ApiResponse {
                status: response.status,
                headers: response.headers,
                body: response.body,
                elapsed: start.elapsed(),
            })
        })
    }
}
