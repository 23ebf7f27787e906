use crate::core::capture_policy::CapturePolicy;
use crate::core::config_validation::{
    parse_attempt_limit, parse_debounce_ms, parse_min_photo_size, parse_ntp_servers,
    parse_storage_bucket, parse_utc_offset, validate_firebase_credentials,
    validate_wifi_ssid, ValidationError,
};
use crate::core::retry_policy::WaitPolicy;

/// アプリケーション設定
///
/// この構造体はビルド時に`cfg.toml`ファイルから読み込まれた設定を保持します。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("")]
    wifi_ssid: &'static str,

    #[default("")]
    wifi_password: &'static str,

    #[default("")]
    firebase_api_key: &'static str,

    #[default("")]
    firebase_user_email: &'static str,

    #[default("")]
    firebase_user_password: &'static str,

    #[default("")]
    storage_bucket_id: &'static str,

    // リミットスイッチは内部プルアップで LOW が押下
    #[default(true)]
    switch_active_low: bool,

    #[default("-03:00")]
    utc_offset: &'static str,

    #[default("pool.ntp.org")]
    ntp_server_primary: &'static str,

    #[default("time.nist.gov")]
    ntp_server_secondary: &'static str,

    #[default(50)]
    debounce_ms: u64,

    #[default(10000)]
    post_capture_delay_ms: u32,

    #[default(100)]
    min_photo_size_bytes: u64,

    #[default(0)] // 0 = 無制限
    capture_max_attempts: u32,

    #[default(1000)]
    wifi_poll_interval_ms: u32,

    #[default(0)] // 0 = 無制限
    wifi_max_attempts: u32,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WiFi SSIDが設定されていません")]
    MissingWifiSsid,
    #[error("Firebase APIキーが設定されていません")]
    MissingApiKey,
    #[error("Firebase ユーザーのメールアドレスが設定されていません")]
    MissingUserEmail,
    #[error("Storage バケットIDが設定されていません")]
    MissingStorageBucket,
    #[error("debounce_ms の値が無効です (0-1000): {0}")]
    InvalidDebounceMs(u64),
    #[error("min_photo_size_bytes の値が無効です (1以上): {0}")]
    InvalidMinPhotoSize(u64),
    #[error("utc_offset の値が無効です (例: -03:00): {0}")]
    InvalidUtcOffset(String),
    #[error("NTPサーバーが設定されていません")]
    MissingNtpServer,
}

/// アプリケーション設定を表す構造体
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// WiFi SSID
    pub wifi_ssid: String,

    /// WiFi パスワード（空ならオープンネットワーク）
    pub wifi_password: String,

    /// Firebase Web APIキー
    pub firebase_api_key: String,

    /// アップロード用ユーザーのメールアドレス
    pub firebase_user_email: String,

    /// アップロード用ユーザーのパスワード
    pub firebase_user_password: String,

    /// Storage バケットID（`gs://` なし）
    pub storage_bucket_id: String,

    /// スイッチが LOW で押下状態か
    pub switch_active_low: bool,

    /// ローカル時刻のUTCオフセット（秒）
    pub utc_offset_seconds: i32,

    /// NTPサーバー（優先順）
    pub ntp_servers: Vec<String>,

    /// デバウンス時間（ミリ秒）
    pub debounce_ms: u64,

    /// 撮影・検証のリトライ方針
    pub capture_policy: CapturePolicy,

    /// WiFi接続待ちの方針
    pub wifi_wait_policy: WaitPolicy,
}

impl AppConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        // toml_cfg によって生成された定数
        let config = CONFIG;

        // WiFi設定を取得
        validate_wifi_ssid(config.wifi_ssid).map_err(map_validation_error)?;
        let wifi_ssid = config.wifi_ssid.to_string();
        // Password can be empty for open networks, so no check for emptiness here.
        let wifi_password = config.wifi_password.to_string();

        // Firebase 認証情報
        validate_firebase_credentials(config.firebase_api_key, config.firebase_user_email)
            .map_err(map_validation_error)?;
        let storage_bucket_id =
            parse_storage_bucket(config.storage_bucket_id).map_err(map_validation_error)?;

        // 時刻設定
        let utc_offset_seconds =
            parse_utc_offset(config.utc_offset).map_err(map_validation_error)?;
        let ntp_servers = parse_ntp_servers(config.ntp_server_primary, config.ntp_server_secondary)
            .map_err(map_validation_error)?;

        // センサー・撮影設定
        let debounce_ms = parse_debounce_ms(config.debounce_ms).map_err(map_validation_error)?;
        let min_photo_size_bytes =
            parse_min_photo_size(config.min_photo_size_bytes).map_err(map_validation_error)?;
        let capture_policy = CapturePolicy {
            min_photo_size_bytes,
            post_capture_delay_ms: config.post_capture_delay_ms,
            max_attempts: parse_attempt_limit(config.capture_max_attempts),
        };

        let wifi_wait_policy = WaitPolicy {
            interval_ms: config.wifi_poll_interval_ms,
            max_attempts: parse_attempt_limit(config.wifi_max_attempts),
        };

        Ok(AppConfig {
            wifi_ssid,
            wifi_password,
            firebase_api_key: config.firebase_api_key.to_string(),
            firebase_user_email: config.firebase_user_email.to_string(),
            firebase_user_password: config.firebase_user_password.to_string(),
            storage_bucket_id,
            switch_active_low: config.switch_active_low,
            utc_offset_seconds,
            ntp_servers,
            debounce_ms,
            capture_policy,
            wifi_wait_policy,
        })
    }
}

fn map_validation_error(err: ValidationError) -> ConfigError {
    match err {
        ValidationError::MissingWifiSsid => ConfigError::MissingWifiSsid,
        ValidationError::MissingApiKey => ConfigError::MissingApiKey,
        ValidationError::MissingUserEmail => ConfigError::MissingUserEmail,
        ValidationError::MissingStorageBucket => ConfigError::MissingStorageBucket,
        ValidationError::InvalidDebounceMs(v) => ConfigError::InvalidDebounceMs(v),
        ValidationError::InvalidMinPhotoSize(v) => ConfigError::InvalidMinPhotoSize(v),
        ValidationError::InvalidUtcOffset(v) => ConfigError::InvalidUtcOffset(v),
        ValidationError::MissingNtpServer => ConfigError::MissingNtpServer,
    }
}
