use log::{error, info, warn};

use crate::core::capture_policy::{is_photo_size_valid, CapturePolicy};
use crate::core::clock::Clock;
use crate::hardware::camera::CameraDevice;
use crate::storage::PhotoStore;

/// 撮影サイクルの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// 検証済みの写真が保存された
    Stored { size: u64, attempts: u32 },
    /// カメラがフレームを返さなかった（リトライしない）
    NoFrame,
    /// 試行回数の上限に達した
    GaveUp { attempts: u32 },
}

impl CaptureOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, CaptureOutcome::Stored { .. })
    }
}

/// 撮影・保存・検証を担当するサービス
pub struct CaptureManager<C: CameraDevice> {
    camera: C,
    policy: CapturePolicy,
}

impl<C: CameraDevice> CaptureManager<C> {
    pub fn new(camera: C, policy: CapturePolicy) -> Self {
        Self { camera, policy }
    }

    /// 写真を撮影して固定パスに保存し、サイズ検証に通るまで繰り返す
    ///
    /// 検証に成功した場合のみ `post_capture_delay_ms` 待機してから返る。
    /// カメラがフレームを返さなかった場合は即座に `NoFrame` を返す。
    pub fn capture_and_store<S, K>(&mut self, store: &mut S, clock: &K) -> CaptureOutcome
    where
        S: PhotoStore + ?Sized,
        K: Clock + ?Sized,
    {
        let mut attempts: u32 = 0;

        loop {
            if !self.policy.allows_attempt(next_attempt(attempts)) {
                error!("撮影の試行回数が上限に達しました ({}回)", attempts);
                return CaptureOutcome::GaveUp { attempts };
            }
            attempts = next_attempt(attempts);

            info!("写真を撮影します... (試行 {})", attempts);
            let frame = match self.camera.capture() {
                Some(frame) => frame,
                None => {
                    error!("カメラ撮影に失敗しました");
                    return CaptureOutcome::NoFrame;
                }
            };

            match store.write_photo(frame.as_ref()) {
                Ok(written) => info!(
                    "写真を保存しました: {} ({} bytes)",
                    store.photo_path().display(),
                    written
                ),
                Err(e) => error!(
                    "写真ファイルを書き込みモードで開けませんでした: {}: {}",
                    store.photo_path().display(),
                    e
                ),
            }
            // フレームバッファは書き込み直後に返却
            drop(frame);

            if let Some(size) = self.stored_size(store) {
                info!("写真の保存を確認しました: {} bytes", size);
                clock.delay_ms(self.policy.post_capture_delay_ms);
                return CaptureOutcome::Stored { size, attempts };
            }

            warn!("保存された写真が不正です。撮り直します");
        }
    }

    /// 保存済みファイルが最小サイズを超えているか
    ///
    /// ファイルがない、または読めない場合は false。副作用なし。
    pub fn check_photo<S: PhotoStore + ?Sized>(&self, store: &S) -> bool {
        self.stored_size(store).is_some()
    }

    fn stored_size<S: PhotoStore + ?Sized>(&self, store: &S) -> Option<u64> {
        let size = store.photo_size().ok()?;
        is_photo_size_valid(size, self.policy.min_photo_size_bytes).then_some(size)
    }
}

/// 無制限リトライでもカウンタが溢れないよう上限で止める
fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::MockClock;
    use crate::hardware::mock::MockCamera;
    use crate::storage::mock::MemoryPhotoStore;

    fn jpeg(len: usize) -> Vec<u8> {
        let mut data = vec![0x42; len];
        data[0] = 0xFF;
        data[1] = 0xD8;
        data
    }

    #[test]
    fn test_check_photo_threshold() {
        let manager = CaptureManager::new(MockCamera::new(), CapturePolicy::default());
        let mut store = MemoryPhotoStore::new();

        // ファイルなし
        assert!(!manager.check_photo(&store));

        store.write_photo(&jpeg(100)).unwrap();
        assert!(!manager.check_photo(&store));

        store.write_photo(&jpeg(101)).unwrap();
        assert!(manager.check_photo(&store));
        // 何度呼んでも同じ結果
        assert!(manager.check_photo(&store));
        assert_eq!(store.photo_size().unwrap(), 101);
    }

    #[test]
    fn test_capture_stores_and_waits() {
        let camera = MockCamera::new();
        camera.queue_frame(jpeg(2048));
        let mut manager = CaptureManager::new(camera.clone(), CapturePolicy::default());
        let mut store = MemoryPhotoStore::new();
        let clock = MockClock::new();

        let outcome = manager.capture_and_store(&mut store, &clock);

        assert_eq!(outcome, CaptureOutcome::Stored { size: 2048, attempts: 1 });
        assert_eq!(camera.capture_count(), 1);
        assert_eq!(clock.delays(), vec![10_000]);
        assert_eq!(store.contents().unwrap().len(), 2048);
    }

    #[test]
    fn test_retries_until_a_valid_write() {
        let camera = MockCamera::new();
        camera.queue_frame(jpeg(40));
        camera.queue_frame(jpeg(4096));
        camera.queue_frame(jpeg(60));
        let mut manager = CaptureManager::new(camera.clone(), CapturePolicy::default());
        let mut store = MemoryPhotoStore::new();
        let clock = MockClock::new();

        let outcome = manager.capture_and_store(&mut store, &clock);

        // 最初の成功で止まる
        assert_eq!(outcome, CaptureOutcome::Stored { size: 4096, attempts: 2 });
        assert_eq!(camera.capture_count(), 2);
        assert_eq!(clock.delays(), vec![10_000]);
    }

    #[test]
    fn test_write_failure_is_retried() {
        let camera = MockCamera::new();
        camera.set_fallback_frame(Some(jpeg(512)));
        let store = MemoryPhotoStore::new();
        store.set_write_error(true);
        let mut manager = CaptureManager::new(
            camera.clone(),
            CapturePolicy {
                max_attempts: Some(3),
                ..CapturePolicy::default()
            },
        );
        let clock = MockClock::new();

        let mut handle = store.clone();
        let outcome = manager.capture_and_store(&mut handle, &clock);

        assert_eq!(outcome, CaptureOutcome::GaveUp { attempts: 3 });
        assert_eq!(camera.capture_count(), 3);
        // 失敗時は待機しない
        assert!(clock.delays().is_empty());
    }

    #[test]
    fn test_write_failure_verifies_existing_photo() {
        let camera = MockCamera::new();
        camera.queue_frame(jpeg(4096));
        let store = MemoryPhotoStore::new();
        let mut handle = store.clone();
        // 前回の撮影で保存済みのファイル
        handle.write_photo(&jpeg(700)).unwrap();
        store.set_write_error(true);
        let mut manager = CaptureManager::new(camera.clone(), CapturePolicy::default());
        let clock = MockClock::new();

        let outcome = manager.capture_and_store(&mut handle, &clock);

        // 書き込みに失敗しても、スロットに残っているファイルで検証が通る
        assert_eq!(outcome, CaptureOutcome::Stored { size: 700, attempts: 1 });
        assert_eq!(camera.capture_count(), 1);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.contents().unwrap(), jpeg(700));
        assert_eq!(clock.delays(), vec![10_000]);
    }

    #[test]
    fn test_attempt_counter_saturates() {
        assert_eq!(next_attempt(0), 1);
        assert_eq!(next_attempt(u32::MAX - 1), u32::MAX);
        assert_eq!(next_attempt(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_no_frame_returns_immediately() {
        let camera = MockCamera::new();
        let mut manager = CaptureManager::new(camera.clone(), CapturePolicy::default());
        let mut store = MemoryPhotoStore::new();
        let clock = MockClock::new();

        let outcome = manager.capture_and_store(&mut store, &clock);

        assert_eq!(outcome, CaptureOutcome::NoFrame);
        assert!(!outcome.is_stored());
        assert_eq!(camera.capture_count(), 1);
        assert!(clock.delays().is_empty());
        assert!(store.contents().is_none());
    }

    #[test]
    fn test_no_frame_after_a_bad_write_still_returns() {
        let camera = MockCamera::new();
        camera.queue_frame(jpeg(10));
        camera.queue_none();
        let mut manager = CaptureManager::new(camera.clone(), CapturePolicy::default());
        let mut store = MemoryPhotoStore::new();
        let clock = MockClock::new();

        assert_eq!(
            manager.capture_and_store(&mut store, &clock),
            CaptureOutcome::NoFrame
        );
        assert_eq!(camera.capture_count(), 2);
    }

    #[test]
    fn test_short_write_fails_verification() {
        let camera = MockCamera::new();
        camera.set_fallback_frame(Some(jpeg(4096)));
        let store = MemoryPhotoStore::new();
        // 書き込みが途中で切れる
        store.set_truncate_to(Some(80));
        let mut manager = CaptureManager::new(
            camera,
            CapturePolicy {
                max_attempts: Some(2),
                ..CapturePolicy::default()
            },
        );

        let mut handle = store.clone();
        let outcome = manager.capture_and_store(&mut handle, &MockClock::new());
        assert_eq!(outcome, CaptureOutcome::GaveUp { attempts: 2 });
        assert_eq!(store.photo_size().unwrap(), 80);
    }
}
