use crate::core::clock::Clock;

/// 条件が満たされるまで一定間隔でポーリングする待機方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval_ms: u32,
    /// `None` なら無制限に待つ
    pub max_attempts: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_attempts: None,
        }
    }
}

impl WaitPolicy {
    /// `ready` が true を返すまで `interval_ms` ごとに再確認する
    ///
    /// `ready` には何回目の確認か（1始まり）が渡される。
    /// 上限に達した場合は false を返す。
    pub fn wait_until<K, F>(&self, clock: &K, mut ready: F) -> bool
    where
        K: Clock + ?Sized,
        F: FnMut(u32) -> bool,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            if ready(attempt) {
                return true;
            }
            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    return false;
                }
            }
            clock.delay_ms(self.interval_ms);
        }
    }
}
