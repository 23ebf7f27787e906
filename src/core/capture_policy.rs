/// 保存された画像ファイルの最小サイズ（バイト）。これ以下は書き込み失敗とみなす
pub const MIN_PHOTO_SIZE_BYTES: u64 = 100;

/// 撮影成功後の待機時間（ミリ秒）
pub const POST_CAPTURE_DELAY_MS: u32 = 10_000;

/// 撮影・保存・検証ループの方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePolicy {
    pub min_photo_size_bytes: u64,
    pub post_capture_delay_ms: u32,
    /// `None` なら検証に成功するまで無制限にリトライ
    pub max_attempts: Option<u32>,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            min_photo_size_bytes: MIN_PHOTO_SIZE_BYTES,
            post_capture_delay_ms: POST_CAPTURE_DELAY_MS,
            max_attempts: None,
        }
    }
}

impl CapturePolicy {
    /// `attempt` 回目（1始まり）の試行が許可されているか
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

pub fn is_photo_size_valid(size_bytes: u64, min_photo_size_bytes: u64) -> bool {
    size_bytes > min_photo_size_bytes
}
