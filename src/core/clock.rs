use chrono::{DateTime, Utc};

/// 稼働時間・待機・壁時計を提供するプラットフォーム抽象
pub trait Clock {
    /// 起動からの経過時間（ミリ秒）
    fn uptime_ms(&self) -> u64;

    /// 呼び出し元をブロックして待機する
    fn delay_ms(&self, ms: u32);

    /// 現在のUTC時刻（SNTP同期前は不正確な場合がある）
    fn now_utc(&self) -> DateTime<Utc>;
}

/// ESP-IDF specific clock implementation.
#[cfg(target_os = "espidf")]
pub struct EspIdfClock;

#[cfg(target_os = "espidf")]
impl Clock for EspIdfClock {
    fn uptime_ms(&self) -> u64 {
        let micros = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        (micros.max(0) as u64) / 1_000
    }

    fn delay_ms(&self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// テスト用の手動クロック
///
/// `delay_ms` は実際には待たずに稼働時間を進め、待機履歴を記録します。
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    uptime_ms: std::sync::Arc<std::sync::Mutex<u64>>,
    delays: std::sync::Arc<std::sync::Mutex<Vec<u32>>>,
    now_utc: std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>,
}

#[cfg(not(target_os = "espidf"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl MockClock {
    pub fn new() -> Self {
        Self {
            uptime_ms: std::sync::Arc::new(std::sync::Mutex::new(0)),
            delays: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
            now_utc: std::sync::Arc::new(std::sync::Mutex::new(DateTime::<Utc>::UNIX_EPOCH)),
        }
    }

    /// テスト用: 待機を記録せずに稼働時間を進める
    pub fn advance(&self, ms: u64) {
        *self.uptime_ms.lock().unwrap() += ms;
    }

    /// テスト用: 壁時計を設定
    pub fn set_now_utc(&self, now: DateTime<Utc>) {
        *self.now_utc.lock().unwrap() = now;
    }

    /// テスト用: これまでの `delay_ms` 呼び出し
    pub fn delays(&self) -> Vec<u32> {
        self.delays.lock().unwrap().clone()
    }
}

#[cfg(not(target_os = "espidf"))]
impl Clock for MockClock {
    fn uptime_ms(&self) -> u64 {
        *self.uptime_ms.lock().unwrap()
    }

    fn delay_ms(&self, ms: u32) {
        self.delays.lock().unwrap().push(ms);
        *self.uptime_ms.lock().unwrap() += u64::from(ms);
    }

    fn now_utc(&self) -> DateTime<Utc> {
        *self.now_utc.lock().unwrap()
    }
}
