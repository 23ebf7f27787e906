use log::debug;

/// デジタル入力の抽象化
pub trait SwitchInput {
    /// スイッチが押されている（アクティブ）か
    fn is_active(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEvent {
    Pressed,
    Released,
}

/// ポーリングごとに更新されるセンサー状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorState {
    pub raw_active: bool,
    pub debounced_active: bool,
    pub previous_debounced_active: bool,
}

/// デバウンス付きリミットスイッチ
///
/// 生のレベルが最後の変化から `debounce_ms` 以上安定した時点で
/// デバウンス後のレベルとして採用する。
pub struct LimitSwitch<I: SwitchInput> {
    input: I,
    debounce_ms: u64,
    state: SensorState,
    last_flicker_active: bool,
    last_change_ms: u64,
}

impl<I: SwitchInput> LimitSwitch<I> {
    /// 構築時のレベルを初期状態とする（起動直後にエッジは発生しない）
    pub fn new(mut input: I, debounce_ms: u64, now_ms: u64) -> Self {
        let active = input.is_active();
        Self {
            input,
            debounce_ms,
            state: SensorState {
                raw_active: active,
                debounced_active: active,
                previous_debounced_active: active,
            },
            last_flicker_active: active,
            last_change_ms: now_ms,
        }
    }

    /// ピンを読み取って状態を更新し、今回発生したエッジを返す
    pub fn poll(&mut self, now_ms: u64) -> Option<SwitchEvent> {
        self.state.previous_debounced_active = self.state.debounced_active;

        let raw = self.input.is_active();
        self.state.raw_active = raw;

        if raw != self.last_flicker_active {
            self.last_flicker_active = raw;
            self.last_change_ms = now_ms;
        }

        if now_ms.saturating_sub(self.last_change_ms) >= self.debounce_ms {
            self.state.debounced_active = raw;
        }

        let event = self.event();
        if let Some(event) = event {
            debug!("リミットスイッチ: {:?}", event);
        }
        event
    }

    /// 今回のポーリングで 非アクティブ→アクティブ になったか
    pub fn is_pressed(&self) -> bool {
        !self.state.previous_debounced_active && self.state.debounced_active
    }

    /// 今回のポーリングで アクティブ→非アクティブ になったか
    pub fn is_released_edge(&self) -> bool {
        self.state.previous_debounced_active && !self.state.debounced_active
    }

    /// 現在離されているか（レベル）
    pub fn is_released(&self) -> bool {
        !self.state.debounced_active
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    fn event(&self) -> Option<SwitchEvent> {
        if self.is_pressed() {
            Some(SwitchEvent::Pressed)
        } else if self.is_released_edge() {
            Some(SwitchEvent::Released)
        } else {
            None
        }
    }
}

/// GPIO 入力によるスイッチ（内部プルアップ、LOW でアクティブ）
#[cfg(target_os = "espidf")]
pub struct EspSwitchInput<'d, P>
where
    P: esp_idf_svc::hal::gpio::InputPin + esp_idf_svc::hal::gpio::OutputPin,
{
    pin: esp_idf_svc::hal::gpio::PinDriver<'d, P, esp_idf_svc::hal::gpio::Input>,
    active_low: bool,
}

#[cfg(target_os = "espidf")]
impl<'d, P> EspSwitchInput<'d, P>
where
    P: esp_idf_svc::hal::gpio::InputPin + esp_idf_svc::hal::gpio::OutputPin,
{
    pub fn new(
        pin: impl esp_idf_svc::hal::peripheral::Peripheral<P = P> + 'd,
        active_low: bool,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        use esp_idf_svc::hal::gpio::{PinDriver, Pull};

        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(if active_low { Pull::Up } else { Pull::Down })?;
        Ok(Self { pin, active_low })
    }
}

#[cfg(target_os = "espidf")]
impl<P> SwitchInput for EspSwitchInput<'_, P>
where
    P: esp_idf_svc::hal::gpio::InputPin + esp_idf_svc::hal::gpio::OutputPin,
{
    fn is_active(&mut self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
