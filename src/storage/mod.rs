/// 写真ファイルの保存先
///
/// 1枚分の固定スロットを持ち、撮影ごとに上書きする。
pub mod photo_file;

#[cfg(target_os = "espidf")]
pub mod spiffs;

#[cfg(not(target_os = "espidf"))]
pub mod mock;

use std::io::{self, Read};
use std::path::Path;

pub use photo_file::{FsPhotoStore, PHOTO_FILE};

/// 写真1枚分の保存スロット
pub trait PhotoStore {
    /// 保存先パス（ログ表示用）
    fn photo_path(&self) -> &Path;

    /// スロットを切り詰めてから書き込む。書き込んだバイト数を返す
    fn write_photo(&mut self, data: &[u8]) -> io::Result<u64>;

    /// 保存されているファイルのサイズ
    fn photo_size(&self) -> io::Result<u64>;

    /// 保存されているファイルを読み出す
    fn open_photo(&self) -> io::Result<Box<dyn Read + '_>>;
}
