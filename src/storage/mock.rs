use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::PhotoStore;

/// テスト用のメモリ上の写真スロット
///
/// クローンは同じスロットを共有します。
#[derive(Debug, Clone, Default)]
pub struct MemoryPhotoStore {
    contents: Arc<Mutex<Option<Vec<u8>>>>,
    simulate_write_error: Arc<Mutex<bool>>,
    truncate_to: Arc<Mutex<Option<usize>>>,
    writes: Arc<Mutex<u32>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 書き込み（ファイルオープン）失敗をシミュレート
    pub fn set_write_error(&self, enable: bool) {
        *self.simulate_write_error.lock().unwrap() = enable;
    }

    /// テスト用: 書き込みを指定バイト数で打ち切る
    pub fn set_truncate_to(&self, len: Option<usize>) {
        *self.truncate_to.lock().unwrap() = len;
    }

    /// テスト用: 保存内容
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().unwrap().clone()
    }

    /// テスト用: 成功した書き込み回数
    pub fn write_count(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

impl PhotoStore for MemoryPhotoStore {
    fn photo_path(&self) -> &Path {
        Path::new("/spiffs/data/photo.jpg")
    }

    fn write_photo(&mut self, data: &[u8]) -> io::Result<u64> {
        if *self.simulate_write_error.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::Other, "Simulated open error"));
        }
        let len = match *self.truncate_to.lock().unwrap() {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };
        *self.contents.lock().unwrap() = Some(data[..len].to_vec());
        *self.writes.lock().unwrap() += 1;
        Ok(len as u64)
    }

    fn photo_size(&self) -> io::Result<u64> {
        self.contents
            .lock()
            .unwrap()
            .as_ref()
            .map(|data| data.len() as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no photo"))
    }

    fn open_photo(&self) -> io::Result<Box<dyn Read + '_>> {
        let data = self
            .contents()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no photo"))?;
        Ok(Box::new(Cursor::new(data)))
    }
}
