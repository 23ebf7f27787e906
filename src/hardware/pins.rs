//! ESP32-CAM (AI-Thinker) のピン割り当て
//!
//! カメラピンは `camera_config_t` に GPIO 番号で渡すため、型付きピンではなく定数で持つ。

/// カメラピン設定構造体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraPins {
    pub pwdn: i32,
    pub reset: i32,
    pub xclk: i32,
    pub sccb_sda: i32,
    pub sccb_scl: i32,
    /// Y2..Y9 (D0..D7)
    pub data: [i32; 8],
    pub vsync: i32,
    pub href: i32,
    pub pclk: i32,
}

/// AI-Thinker ESP32-CAM。リセットピンは未接続 (-1)
pub const AI_THINKER_CAMERA_PINS: CameraPins = CameraPins {
    pwdn: 32,
    reset: -1,
    xclk: 0,
    sccb_sda: 26,
    sccb_scl: 27,
    data: [5, 18, 19, 21, 36, 39, 34, 35],
    vsync: 25,
    href: 23,
    pclk: 22,
};

/// XCLK 周波数 (20MHz)
pub const CAMERA_XCLK_FREQ_HZ: i32 = 20_000_000;
