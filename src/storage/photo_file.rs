use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::PhotoStore;

/// マウントポイントからの写真ファイルの相対パス
pub const PHOTO_FILE: &str = "data/photo.jpg";

/// ファイルシステム上の写真スロット
#[derive(Debug, Clone)]
pub struct FsPhotoStore {
    path: PathBuf,
}

impl FsPhotoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// マウントポイント配下の固定パス (`<mount>/data/photo.jpg`)
    pub fn under_mount(mount_point: impl AsRef<Path>) -> Self {
        Self::new(mount_point.as_ref().join(PHOTO_FILE))
    }
}

impl PhotoStore for FsPhotoStore {
    fn photo_path(&self) -> &Path {
        &self.path
    }

    fn write_photo(&mut self, data: &[u8]) -> io::Result<u64> {
        let mut file = File::create(&self.path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(data.len() as u64)
    }

    fn photo_size(&self) -> io::Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn open_photo(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}
