/// Firebase REST API クライアント
///
/// - メール/パスワード認証と ID トークンの更新 (`auth`)
/// - Cloud Storage へのアップロード (`storage`)
pub mod auth;
pub mod storage;

pub use auth::{
    AuthError, FirebaseCredentials, FirebaseSession, LogTokenObserver, TokenInfo, TokenStatus,
    TokenStatusObserver,
};
pub use storage::{UploadDispatcher, UploadOutcome, UploadResult};

use serde::Deserialize;

use super::http::HttpResponse;

/// Firebase のエラーレスポンス `{"error": {"code": 400, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// レスポンスからエラー理由を取り出す。本文が読めなければ `HTTP <status>`
pub fn parse_error_reason(response: &HttpResponse) -> String {
    serde_json::from_slice::<ErrorEnvelope>(&response.body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}

/// URL のパス・クエリ用にパーセントエンコードする（非予約文字以外すべて）
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
