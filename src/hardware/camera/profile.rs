/// 解像度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    Uxga, // 1600x1200
    Svga, // 800x600
}

impl FrameSize {
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            FrameSize::Uxga => (1600, 1200),
            FrameSize::Svga => (800, 600),
        }
    }
}

/// カメラ初期化時の撮影プロファイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProfile {
    pub frame_size: FrameSize,
    /// JPEG品質 (0-63, 小さいほど高品質)
    pub jpeg_quality: i32,
    pub fb_count: usize,
    /// フレームバッファを PSRAM に置くか
    pub fb_in_psram: bool,
}

impl CaptureProfile {
    /// PSRAM があれば UXGA・2バッファ、なければ SVGA・1バッファ (DRAM)
    pub fn for_psram(psram_found: bool) -> Self {
        if psram_found {
            Self {
                frame_size: FrameSize::Uxga,
                jpeg_quality: 10,
                fb_count: 2,
                fb_in_psram: true,
            }
        } else {
            Self {
                frame_size: FrameSize::Svga,
                jpeg_quality: 12,
                fb_count: 1,
                fb_in_psram: false,
            }
        }
    }
}
