/*!
 * # SmartBox Camera Library
 *
 * リミットスイッチの状態変化をトリガーに ESP32-CAM で撮影し、
 * SPIFFS に保存した画像を Firebase Storage へアップロードするためのライブラリ
 *
 * ## モジュール構成
 * - `core`: アプリケーションの核となる機能（設定、撮影サービス、状態遷移、制御ループ）
 * - `hardware`: ハードウェア制御（リミットスイッチ、カメラ）
 * - `storage`: ローカル画像ファイルの保存（SPIFFS）
 * - `communication`: 通信機能（WiFi、SNTP、HTTP、Firebase）
 * - `power`: 致命的エラー時の再起動
 */

// 公開モジュール
pub mod communication;
pub mod core;
pub mod hardware;
pub mod power;
pub mod storage;

// 内部で使用する型をまとめてエクスポート
pub use crate::communication::firebase::{FirebaseSession, UploadDispatcher, UploadOutcome, UploadResult};
pub use crate::core::{AppConfig, AppController, CaptureManager, CaptureOutcome, ConfigError, TaskState};
pub use crate::hardware::{LimitSwitch, SwitchEvent};
pub use crate::storage::PhotoStore;

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
