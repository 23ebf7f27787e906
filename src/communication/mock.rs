use std::collections::VecDeque;
use std::io::Read;
use std::sync::{Arc, Mutex};

use super::firebase::{TokenStatus, TokenStatusObserver};
use super::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use super::NetworkLink;

/// 送信されたリクエストの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub request: HttpRequest,
    pub body: Vec<u8>,
    pub content_length: u64,
}

/// テスト用のHTTPトランスポートモック
///
/// キューに積まれたレスポンスを先頭から返し、送信内容を記録します。
/// キューが空の場合は接続エラーを返します。
#[derive(Debug, Clone, Default)]
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, String>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: レスポンスを追加
    pub fn queue_response(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    /// テスト用: 接続エラーを追加
    pub fn queue_connection_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// テスト用: 送信されたリクエスト
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// テスト用: URL に `pattern` を含むリクエストの数
    pub fn count_requests_to(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.request.url.contains(pattern))
            .count()
    }
}

impl HttpTransport for MockHttpTransport {
    fn post(
        &mut self,
        request: &HttpRequest,
        body: &mut dyn Read,
        content_length: u64,
    ) -> Result<HttpResponse, TransportError> {
        let mut data = Vec::new();
        body.read_to_end(&mut data)?;
        self.requests.lock().unwrap().push(RecordedRequest {
            request: request.clone(),
            body: data,
            content_length,
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Connection("no response queued".to_string())),
        }
    }
}

/// テスト用のネットワークリンクモック
#[derive(Debug, Clone)]
pub struct MockNetworkLink {
    connected: Arc<Mutex<bool>>,
    reconnect_succeeds: Arc<Mutex<bool>>,
    reconnects: Arc<Mutex<u32>>,
}

impl MockNetworkLink {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(Mutex::new(connected)),
            reconnect_succeeds: Arc::new(Mutex::new(true)),
            reconnects: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_reconnect_succeeds(&self, succeeds: bool) {
        *self.reconnect_succeeds.lock().unwrap() = succeeds;
    }

    pub fn reconnect_count(&self) -> u32 {
        *self.reconnects.lock().unwrap()
    }
}

impl NetworkLink for MockNetworkLink {
    fn is_connected(&mut self) -> bool {
        *self.connected.lock().unwrap()
    }

    fn reconnect(&mut self) -> bool {
        *self.reconnects.lock().unwrap() += 1;
        let ok = *self.reconnect_succeeds.lock().unwrap();
        if ok {
            *self.connected.lock().unwrap() = true;
        }
        ok
    }
}

/// テスト用: 通知されたトークン状態を記録するオブザーバー
#[derive(Debug, Clone, Default)]
pub struct RecordingTokenObserver {
    statuses: Arc<Mutex<Vec<TokenStatus>>>,
}

impl RecordingTokenObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<TokenStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl TokenStatusObserver for RecordingTokenObserver {
    fn on_status(&mut self, status: &TokenStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }
}
