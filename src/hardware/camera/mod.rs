/// Camera module for ESP32-CAM (AI-Thinker)
///
/// - `CameraDevice` トレイト（撮影の抽象化）
/// - PSRAM の有無で決まる撮影プロファイル
/// - esp32-camera ドライバによる実装 (ESP-IDF のみ)
pub mod profile;

#[cfg(target_os = "espidf")]
pub mod esp32_cam;

pub use profile::{CaptureProfile, FrameSize};

/// 1フレームを取得できるカメラ
pub trait CameraDevice {
    /// 取得したフレーム。ドロップ時にドライバへ返却される
    type Frame: AsRef<[u8]>;

    /// JPEG フレームを1枚取得する。取得できなければ `None`
    fn capture(&mut self) -> Option<Self::Frame>;
}

impl<C: CameraDevice + ?Sized> CameraDevice for &mut C {
    type Frame = C::Frame;

    fn capture(&mut self) -> Option<Self::Frame> {
        (**self).capture()
    }
}
