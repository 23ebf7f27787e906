/// Hardware abstraction layer
///
/// - リミットスイッチ（デバウンス付き）
/// - ESP32-CAM (AI-Thinker) カメラ
/// - ピン定義
pub mod camera;
pub mod limit_switch;
pub mod pins;

#[cfg(not(target_os = "espidf"))]
pub mod mock;

pub use camera::{CameraDevice, CaptureProfile, FrameSize};
pub use limit_switch::{LimitSwitch, SensorState, SwitchEvent, SwitchInput};

#[cfg(target_os = "espidf")]
pub use camera::esp32_cam::{psram_available, CameraError, Esp32Cam};
#[cfg(target_os = "espidf")]
pub use limit_switch::EspSwitchInput;
