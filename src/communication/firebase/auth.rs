use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{parse_error_reason, percent_encode};
use crate::communication::http::{HttpRequest, HttpTransport, TransportError};

const SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=";
const REFRESH_URL: &str = "https://securetoken.googleapis.com/v1/token?key=";

/// 有効期限のこの時間前にトークンを更新する
pub const REFRESH_MARGIN_MS: u64 = 5 * 60 * 1_000;

/// `expiresIn` が読めない場合の有効期間（秒）
const DEFAULT_EXPIRES_IN_SECS: u64 = 3_600;

/// Firebase 認証情報
#[derive(Debug, Clone)]
pub struct FirebaseCredentials {
    pub api_key: String,
    pub email: String,
    pub password: String,
}

/// トークンの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// サインイン要求中
    OnRequest,
    /// 更新中
    OnRefresh,
    Ready,
    Error(String),
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStatus::OnRequest => write!(f, "on request"),
            TokenStatus::OnRefresh => write!(f, "on refresh"),
            TokenStatus::Ready => write!(f, "ready"),
            TokenStatus::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// トークン状態の変化を受け取る
pub trait TokenStatusObserver {
    fn on_status(&mut self, status: &TokenStatus);
}

/// 状態をログに出すだけのオブザーバー
#[derive(Debug, Default)]
pub struct LogTokenObserver;

impl TokenStatusObserver for LogTokenObserver {
    fn on_status(&mut self, status: &TokenStatus) {
        match status {
            TokenStatus::Error(_) => warn!("Firebase トークン状態: {}", status),
            _ => info!("Firebase トークン状態: {}", status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub id_token: String,
    pub refresh_token: String,
    /// 稼働時間基準の有効期限（ミリ秒）
    pub expires_at_ms: u64,
}

impl TokenInfo {
    fn needs_refresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_add(REFRESH_MARGIN_MS) >= self.expires_at_ms
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("認証が拒否されました ({status}): {reason}")]
    Rejected { status: u16, reason: String },
    #[error("認証レスポンスを解析できません: {0}")]
    InvalidResponse(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

// securetoken は snake_case で返す
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

/// Firebase 認証セッション
///
/// `ready()` が呼ばれた時点で必要ならサインインまたはトークン更新を行う。
pub struct FirebaseSession {
    credentials: FirebaseCredentials,
    token: Option<TokenInfo>,
    observer: Box<dyn TokenStatusObserver>,
}

impl FirebaseSession {
    pub fn new(credentials: FirebaseCredentials) -> Self {
        Self::with_observer(credentials, Box::new(LogTokenObserver))
    }

    pub fn with_observer(
        credentials: FirebaseCredentials,
        observer: Box<dyn TokenStatusObserver>,
    ) -> Self {
        Self {
            credentials,
            token: None,
            observer,
        }
    }

    /// 有効なトークンがあれば true。なければ取得を試みる
    pub fn ready<T: HttpTransport + ?Sized>(&mut self, transport: &mut T, now_ms: u64) -> bool {
        if let Some(token) = &self.token {
            if !token.needs_refresh(now_ms) {
                return true;
            }
        }

        let result = match self.token.take() {
            Some(token) => {
                self.notify(TokenStatus::OnRefresh);
                match self.refresh(transport, &token.refresh_token, now_ms) {
                    Ok(token) => Ok(token),
                    Err(e) => {
                        warn!("トークン更新に失敗しました。再サインインします: {}", e);
                        self.notify(TokenStatus::OnRequest);
                        self.sign_in(transport, now_ms)
                    }
                }
            }
            None => {
                self.notify(TokenStatus::OnRequest);
                self.sign_in(transport, now_ms)
            }
        };

        match result {
            Ok(token) => {
                self.token = Some(token);
                self.notify(TokenStatus::Ready);
                true
            }
            Err(e) => {
                self.notify(TokenStatus::Error(e.to_string()));
                false
            }
        }
    }

    pub fn id_token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.id_token.as_str())
    }

    pub fn token(&self) -> Option<&TokenInfo> {
        self.token.as_ref()
    }

    /// キャッシュしたトークンを破棄する（次回 `ready()` で再サインイン）
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            info!("Firebase トークンを破棄しました");
        }
    }

    fn notify(&mut self, status: TokenStatus) {
        self.observer.on_status(&status);
    }

    fn sign_in<T: HttpTransport + ?Sized>(
        &self,
        transport: &mut T,
        now_ms: u64,
    ) -> Result<TokenInfo, AuthError> {
        let body = serde_json::to_vec(&SignInRequest {
            email: &self.credentials.email,
            password: &self.credentials.password,
            return_secure_token: true,
        })
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let request = HttpRequest::new(format!("{}{}", SIGN_IN_URL, self.credentials.api_key))
            .with_header("Content-Type", "application/json");
        let response = transport.post(&request, &mut body.as_slice(), body.len() as u64)?;
        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
                reason: parse_error_reason(&response),
            });
        }

        let parsed: SignInResponse = serde_json::from_slice(&response.body)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(TokenInfo {
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_at_ms: expires_at(now_ms, parsed.expires_in.as_deref()),
        })
    }

    fn refresh<T: HttpTransport + ?Sized>(
        &self,
        transport: &mut T,
        refresh_token: &str,
        now_ms: u64,
    ) -> Result<TokenInfo, AuthError> {
        let body = format!(
            "grant_type=refresh_token&refresh_token={}",
            percent_encode(refresh_token)
        );
        let request = HttpRequest::new(format!("{}{}", REFRESH_URL, self.credentials.api_key))
            .with_header("Content-Type", "application/x-www-form-urlencoded");
        let response = transport.post(&request, &mut body.as_bytes(), body.len() as u64)?;
        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
                reason: parse_error_reason(&response),
            });
        }

        let parsed: RefreshResponse = serde_json::from_slice(&response.body)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(TokenInfo {
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_at_ms: expires_at(now_ms, parsed.expires_in.as_deref()),
        })
    }
}

fn expires_at(now_ms: u64, expires_in: Option<&str>) -> u64 {
    let secs = expires_in
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    now_ms.saturating_add(secs.saturating_mul(1_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::mock::{MockHttpTransport, RecordingTokenObserver};

    const SIGN_IN_OK: &str =
        r#"{"idToken":"id-1","refreshToken":"refresh-1","expiresIn":"3600","localId":"u"}"#;
    const REFRESH_OK: &str =
        r#"{"id_token":"id-2","refresh_token":"refresh-2","expires_in":"3600","token_type":"Bearer"}"#;

    fn session(observer: &RecordingTokenObserver) -> FirebaseSession {
        FirebaseSession::with_observer(
            FirebaseCredentials {
                api_key: "api-key".to_string(),
                email: "box@example.com".to_string(),
                password: "secret".to_string(),
            },
            Box::new(observer.clone()),
        )
    }

    #[test]
    fn test_sign_in_on_first_ready() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(200, SIGN_IN_OK);

        assert!(session.ready(&mut transport, 0));
        assert_eq!(session.id_token(), Some("id-1"));
        assert_eq!(session.token().unwrap().expires_at_ms, 3_600_000);
        assert_eq!(observer.statuses(), vec![TokenStatus::OnRequest, TokenStatus::Ready]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].request.url.ends_with("signInWithPassword?key=api-key"));
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["email"], "box@example.com");
        assert_eq!(body["returnSecureToken"], true);
    }

    #[test]
    fn test_valid_token_is_reused() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(200, SIGN_IN_OK);

        assert!(session.ready(&mut transport, 0));
        assert!(session.ready(&mut transport, 60_000));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_refresh_before_expiry() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(200, REFRESH_OK);

        assert!(session.ready(&mut transport, 0));
        // 期限の5分前
        assert!(session.ready(&mut transport, 3_300_000));
        assert_eq!(session.id_token(), Some("id-2"));

        let requests = transport.requests();
        assert!(requests[1].request.url.contains("securetoken.googleapis.com"));
        assert_eq!(
            String::from_utf8(requests[1].body.clone()).unwrap(),
            "grant_type=refresh_token&refresh_token=refresh-1"
        );
        assert_eq!(
            observer.statuses(),
            vec![
                TokenStatus::OnRequest,
                TokenStatus::Ready,
                TokenStatus::OnRefresh,
                TokenStatus::Ready
            ]
        );
    }

    #[test]
    fn test_failed_refresh_falls_back_to_sign_in() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(400, r#"{"error":{"code":400,"message":"TOKEN_EXPIRED"}}"#);
        transport.queue_response(200, SIGN_IN_OK);

        assert!(session.ready(&mut transport, 0));
        assert!(session.ready(&mut transport, 4_000_000));
        assert_eq!(transport.count_requests_to("signInWithPassword"), 2);
        assert_eq!(session.id_token(), Some("id-1"));
    }

    #[test]
    fn test_rejected_sign_in_reports_reason() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(400, r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#);

        assert!(!session.ready(&mut transport, 0));
        assert_eq!(session.id_token(), None);
        match observer.statuses().last() {
            Some(TokenStatus::Error(reason)) => assert!(reason.contains("INVALID_PASSWORD")),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_is_not_ready() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_connection_error("dns lookup failed");

        assert!(!session.ready(&mut transport, 0));
    }

    #[test]
    fn test_invalidate_forces_sign_in() {
        let observer = RecordingTokenObserver::new();
        let mut session = session(&observer);
        let mut transport = MockHttpTransport::new();
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(200, SIGN_IN_OK);

        assert!(session.ready(&mut transport, 0));
        session.invalidate();
        assert_eq!(session.id_token(), None);
        assert!(session.ready(&mut transport, 1_000));
        assert_eq!(transport.count_requests_to("signInWithPassword"), 2);
    }

    #[test]
    fn test_missing_expires_in_uses_default() {
        assert_eq!(expires_at(1_000, None), 1_000 + 3_600_000);
        assert_eq!(expires_at(0, Some("bogus")), 3_600_000);
        assert_eq!(expires_at(0, Some("60")), 60_000);
    }
}
