use log::error;

/// Platform-agnostic restart abstraction.
pub trait RestartPlatform {
    /// Reboot the chip. Never returns on hardware.
    fn restart(&self);
}

/// ESP-IDF specific restart implementation.
#[cfg(target_os = "espidf")]
pub struct EspIdfRestart;

#[cfg(target_os = "espidf")]
impl RestartPlatform for EspIdfRestart {
    fn restart(&self) {
        unsafe {
            esp_idf_svc::sys::esp_restart();
        }
    }
}

/// ブラウンアウト検出を無効化する（カメラ起動時の電圧降下でリセットされるのを防ぐ）
#[cfg(target_os = "espidf")]
pub fn disable_brownout_detector() {
    // ESP32 RTC_CNTL_BROWN_OUT_REG
    const RTC_CNTL_BROWN_OUT_REG: usize = 0x3FF4_80D4;
    unsafe {
        std::ptr::write_volatile(RTC_CNTL_BROWN_OUT_REG as *mut u32, 0);
    }
    log::info!("ブラウンアウト検出を無効化しました");
}

/// 回復不能な初期化エラー時に再起動するコントローラー
pub struct RestartController<P: RestartPlatform> {
    platform: P,
}

impl<P: RestartPlatform> RestartController<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// エラー理由をログに出して再起動する
    pub fn restart_on_fatal(&self, reason: &str) {
        error!("{}。再起動します", reason);
        self.platform.restart();
    }
}
