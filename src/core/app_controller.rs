use log::{info, trace, warn};

use crate::communication::firebase::{UploadDispatcher, UploadResult};
use crate::communication::http::HttpTransport;
use crate::core::capture_service::{CaptureManager, CaptureOutcome};
use crate::core::clock::Clock;
use crate::core::domain_logic::{is_clock_synced, local_datetime};
use crate::core::task_state::{CycleAction, TaskState};
use crate::hardware::camera::CameraDevice;
use crate::hardware::limit_switch::{LimitSwitch, SwitchInput};
use crate::storage::PhotoStore;

/// メインループ1周あたりの待機（アイドルタスクに CPU を譲る）
pub const LOOP_INTERVAL_MS: u32 = 10;

/// 1ティックの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    /// 押下を検出し、次のサイクルを待機状態にした
    Armed,
    /// 撮影とアップロードを実行した
    Cycle {
        capture: CaptureOutcome,
        upload: Option<UploadResult>,
    },
}

/// アプリケーションの主要な制御フローを管理する
///
/// スイッチの状態をポーリングし、離されたときに1回だけ撮影→アップロードを行う。
pub struct AppController<I, C, S, T, K>
where
    I: SwitchInput,
    C: CameraDevice,
    S: PhotoStore,
    T: HttpTransport,
    K: Clock,
{
    switch: LimitSwitch<I>,
    capture: CaptureManager<C>,
    store: S,
    uploader: UploadDispatcher<T>,
    clock: K,
    state: TaskState,
    utc_offset_seconds: i32,
}

impl<I, C, S, T, K> AppController<I, C, S, T, K>
where
    I: SwitchInput,
    C: CameraDevice,
    S: PhotoStore,
    T: HttpTransport,
    K: Clock,
{
    pub fn new(
        switch: LimitSwitch<I>,
        capture: CaptureManager<C>,
        store: S,
        uploader: UploadDispatcher<T>,
        clock: K,
        utc_offset_seconds: i32,
    ) -> Self {
        Self {
            switch,
            capture,
            store,
            uploader,
            clock,
            state: TaskState::new(),
            utc_offset_seconds,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// スイッチを1回ポーリングし、必要なら撮影サイクルを実行する
    pub fn tick(&mut self) -> TickOutcome {
        self.switch.poll(self.clock.uptime_ms());

        // 撮影前に状態を確定させる（撮影中に再発火しない）
        let (next, action) = self
            .state
            .next(self.switch.is_released(), self.switch.is_pressed());
        self.state = next;

        match action {
            CycleAction::CaptureAndUpload => self.run_cycle(),
            CycleAction::Arm => {
                info!("スイッチが押されました。次の撮影を許可します");
                TickOutcome::Armed
            }
            CycleAction::Idle => {
                trace!("撮影なし");
                TickOutcome::Idle
            }
        }
    }

    /// 無限にティックを繰り返す
    pub fn run(&mut self) -> ! {
        info!("メインループを開始します");
        loop {
            self.tick();
            self.clock.delay_ms(LOOP_INTERVAL_MS);
        }
    }

    fn run_cycle(&mut self) -> TickOutcome {
        info!("写真を撮影します");
        let capture = self.capture.capture_and_store(&mut self.store, &self.clock);
        if !capture.is_stored() {
            warn!("撮影結果: {:?}。保存済みのファイルでアップロードを続行します", capture);
        }

        let now_utc = self.clock.now_utc();
        if !is_clock_synced(&now_utc) {
            warn!("時刻が未同期です: {}", now_utc);
        }
        let local_time = local_datetime(now_utc, self.utc_offset_seconds);

        let upload =
            self.uploader
                .upload_last_capture(&self.store, self.clock.uptime_ms(), &local_time);

        TickOutcome::Cycle { capture, upload }
    }
}
