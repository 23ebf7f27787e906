use std::io::Read;

/// HTTP POST リクエスト（ボディは別途ストリームで渡す）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("接続エラー: {0}")]
    Connection(String),
    #[error("送信エラー: {0}")]
    Write(String),
    #[error("受信エラー: {0}")]
    Read(String),
    #[error("ボディの読み出しに失敗: {0}")]
    Body(#[from] std::io::Error),
}

/// HTTP クライアントの抽象化
pub trait HttpTransport {
    /// `body` から `content_length` バイトを読み出して POST する
    fn post(
        &mut self,
        request: &HttpRequest,
        body: &mut dyn Read,
        content_length: u64,
    ) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &mut T {
    fn post(
        &mut self,
        request: &HttpRequest,
        body: &mut dyn Read,
        content_length: u64,
    ) -> Result<HttpResponse, TransportError> {
        (**self).post(request, body, content_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new("https://example.invalid")
            .with_header("Content-Type", "image/jpeg")
            .with_header("Authorization", "Firebase abc");
        assert_eq!(request.header("content-type"), Some("image/jpeg"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Firebase abc"));
        assert_eq!(request.header("X-Missing"), None);
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse { status: 200, body: Vec::new() };
        let created = HttpResponse { status: 201, body: Vec::new() };
        let denied = HttpResponse { status: 403, body: b"denied".to_vec() };
        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!denied.is_success());
        assert_eq!(denied.body_text(), "denied");
    }
}
