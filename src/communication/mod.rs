/// 通信モジュール
///
/// - WiFi ステーション接続 (ESP-IDF)
/// - SNTP 時刻同期 (ESP-IDF)
/// - HTTP トランスポートの抽象化
/// - Firebase 認証と Storage へのアップロード
pub mod firebase;
pub mod http;

#[cfg(target_os = "espidf")]
pub mod http_client;
#[cfg(target_os = "espidf")]
pub mod network_manager;
#[cfg(target_os = "espidf")]
pub mod time_sync;

#[cfg(not(target_os = "espidf"))]
pub mod mock;

pub use http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// ネットワークリンク（WiFi）の状態確認と再接続
pub trait NetworkLink {
    fn is_connected(&mut self) -> bool;

    /// 再接続を試みる。接続できたら true
    fn reconnect(&mut self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("WiFi設定が不正です: {0}")]
    InvalidCredentials(&'static str),
    #[error("WiFiに接続できませんでした ({attempts}回試行)")]
    ConnectTimeout { attempts: u32 },
    #[cfg(target_os = "espidf")]
    #[error("ESP-IDF エラー: {0}")]
    Esp(#[from] esp_idf_svc::sys::EspError),
}
