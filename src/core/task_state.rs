/// 1ティックで実行すべき動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAction {
    /// 撮影・保存・アップロードを1回実行する
    CaptureAndUpload,
    /// スイッチが押された。次のサイクルを待機状態にする
    Arm,
    Idle,
}

/// 撮影サイクルの状態
///
/// `completed` は撮影+アップロードの試行後から次の押下までの間だけ true になる。
/// 起動直後は true（最初の押下まで何もしない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    completed: bool,
}

impl Default for TaskState {
    fn default() -> Self {
        Self { completed: true }
    }
}

impl TaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// スイッチの状態から次の状態と実行すべき動作を決める
    ///
    /// `released` はデバウンス後の「離されている」レベル、
    /// `pressed_edge` は今回のポーリングで押下エッジが検出されたか。
    pub fn next(self, released: bool, pressed_edge: bool) -> (TaskState, CycleAction) {
        if released && !self.completed {
            return (TaskState { completed: true }, CycleAction::CaptureAndUpload);
        }
        if pressed_edge {
            return (TaskState { completed: false }, CycleAction::Arm);
        }
        (self, CycleAction::Idle)
    }
}
