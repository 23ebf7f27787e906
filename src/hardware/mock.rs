use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::camera::CameraDevice;
use super::limit_switch::SwitchInput;

/// テスト用のスイッチ入力モック
///
/// クローンは同じレベルを共有するため、`LimitSwitch` に渡した後もテスト側から操作できます。
#[derive(Debug, Clone)]
pub struct MockSwitchInput {
    active: Arc<Mutex<bool>>,
}

impl MockSwitchInput {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(Mutex::new(active)),
        }
    }

    /// テスト用: 入力レベルを設定
    pub fn set_active(&self, active: bool) {
        *self.active.lock().unwrap() = active;
    }
}

impl SwitchInput for MockSwitchInput {
    fn is_active(&mut self) -> bool {
        *self.active.lock().unwrap()
    }
}

/// テスト用のカメラモック
///
/// キューに積まれたフレームを先頭から返します。キューが空の場合は
/// `fallback_frame` を返します（未設定なら `None` = 撮影失敗）。
#[derive(Debug, Clone, Default)]
pub struct MockCamera {
    frames: Arc<Mutex<VecDeque<Option<Vec<u8>>>>>,
    fallback_frame: Arc<Mutex<Option<Vec<u8>>>>,
    captures: Arc<Mutex<u32>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 次に返すフレームを追加
    pub fn queue_frame(&self, frame: Vec<u8>) {
        self.frames.lock().unwrap().push_back(Some(frame));
    }

    /// テスト用: 撮影失敗を1回分追加
    pub fn queue_none(&self) {
        self.frames.lock().unwrap().push_back(None);
    }

    /// テスト用: キューが空のときに返すフレーム
    pub fn set_fallback_frame(&self, frame: Option<Vec<u8>>) {
        *self.fallback_frame.lock().unwrap() = frame;
    }

    /// テスト用: `capture` が呼ばれた回数
    pub fn capture_count(&self) -> u32 {
        *self.captures.lock().unwrap()
    }
}

impl CameraDevice for MockCamera {
    type Frame = Vec<u8>;

    fn capture(&mut self) -> Option<Vec<u8>> {
        *self.captures.lock().unwrap() += 1;
        match self.frames.lock().unwrap().pop_front() {
            Some(frame) => frame,
            None => self.fallback_frame.lock().unwrap().clone(),
        }
    }
}
