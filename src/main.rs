#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripherals::Peripherals,
    nvs::EspDefaultNvsPartition,
};
#[cfg(target_os = "espidf")]
use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use smartbox_cam::{
    communication::firebase::{FirebaseCredentials, FirebaseSession, UploadDispatcher},
    communication::http_client::EspHttpTransport,
    communication::network_manager::{EspNetworkLink, NetworkManager},
    communication::time_sync::{log_sync_status, start_sntp},
    core::clock::{Clock, EspIdfClock},
    core::{AppConfig, AppController, CaptureManager},
    hardware::pins::AI_THINKER_CAMERA_PINS,
    hardware::{psram_available, CaptureProfile, Esp32Cam, EspSwitchInput, LimitSwitch},
    power::{disable_brownout_detector, EspIdfRestart, RestartController},
    storage::spiffs::{mount_spiffs, SPIFFS_MOUNT_POINT},
    storage::FsPhotoStore,
};

/// SPIFFS マウント後の待機
#[cfg(target_os = "espidf")]
const SPIFFS_SETTLE_MS: u32 = 500;

/// アプリケーションのメインエントリーポイント
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    // ESP-IDFの基本初期化
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    info!("smartbox-cam v{}", smartbox_cam::VERSION);

    // 設定ファイル読み込み
    let app_config = AppConfig::load().map_err(|e| {
        error!("設定ファイルの読み込みに失敗しました: {}", e);
        anyhow::anyhow!("設定ファイルの読み込みエラー: {}", e)
    })?;

    let restart = RestartController::new(EspIdfRestart);
    let clock = EspIdfClock;

    // ペリフェラルとシステムリソースの初期化
    info!("ペリフェラルを初期化しています");
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // リミットスイッチ (GPIO4, デバウンス付き)
    let switch_input = EspSwitchInput::new(peripherals.pins.gpio4, app_config.switch_active_low)?;
    let switch = LimitSwitch::new(switch_input, app_config.debounce_ms, clock.uptime_ms());

    // WiFi（接続するまでブロック）
    let wifi = match NetworkManager::connect_wifi(
        peripherals.modem,
        &sysloop,
        &nvs_partition,
        &app_config,
        &clock,
    ) {
        Ok(wifi) => wifi,
        Err(e) => {
            restart.restart_on_fatal(&format!("WiFi初期化に失敗しました: {}", e));
            return Err(e.into());
        }
    };

    // SPIFFS
    if let Err(e) = mount_spiffs() {
        restart.restart_on_fatal(&format!("SPIFFS のマウントに失敗しました: {}", e));
        return Err(e.into());
    }
    clock.delay_ms(SPIFFS_SETTLE_MS);
    info!("SPIFFS をマウントしました: {}", SPIFFS_MOUNT_POINT);

    // カメラ起動時の電圧降下でリセットされないように
    disable_brownout_detector();

    // カメラ
    let psram = psram_available();
    info!("PSRAM: {}", if psram { "あり" } else { "なし" });
    let camera = match Esp32Cam::init(&AI_THINKER_CAMERA_PINS, CaptureProfile::for_psram(psram)) {
        Ok(camera) => camera,
        Err(e) => {
            restart.restart_on_fatal(&e.to_string());
            return Err(e.into());
        }
    };

    // 時刻同期（完了は待たない）
    let _sntp = match start_sntp(&app_config.ntp_servers) {
        Ok(sntp) => {
            log_sync_status(&sntp);
            Some(sntp)
        }
        Err(e) => {
            warn!("SNTP を開始できませんでした: {:?}", e);
            None
        }
    };

    // Firebase
    let session = FirebaseSession::new(FirebaseCredentials {
        api_key: app_config.firebase_api_key.clone(),
        email: app_config.firebase_user_email.clone(),
        password: app_config.firebase_user_password.clone(),
    });
    let mut uploader = UploadDispatcher::new(
        EspHttpTransport::default(),
        Box::new(EspNetworkLink::new(wifi)),
        session,
        app_config.storage_bucket_id.clone(),
    );
    if !uploader.prepare(clock.uptime_ms()) {
        warn!("Firebase にサインインできませんでした。アップロード時に再試行します");
    }

    let store = FsPhotoStore::under_mount(SPIFFS_MOUNT_POINT);
    let capture = CaptureManager::new(camera, app_config.capture_policy);

    let mut controller = AppController::new(
        switch,
        capture,
        store,
        uploader,
        clock,
        app_config.utc_offset_seconds,
    );
    controller.run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "smartbox-cam v{} は ESP32 (target_os = \"espidf\") 向けのファームウェアです。ホストでは `cargo test` を使用してください。",
        smartbox_cam::VERSION
    );
}
