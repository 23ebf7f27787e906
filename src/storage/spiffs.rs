use esp_idf_svc::sys::{self, esp, EspError};
use log::info;

/// SPIFFS のマウントポイント
pub const SPIFFS_MOUNT_POINT: &str = "/spiffs";

const MAX_OPEN_FILES: usize = 5;

/// SPIFFS をマウントする。失敗した場合はフォーマットしてから再試行される
pub fn mount_spiffs() -> Result<(), EspError> {
    let conf = sys::esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(), // SPIFFS_MOUNT_POINT
        partition_label: std::ptr::null(),
        max_files: MAX_OPEN_FILES,
        format_if_mount_failed: true,
    };

    esp!(unsafe { sys::esp_vfs_spiffs_register(&conf) })?;

    let mut total: usize = 0;
    let mut used: usize = 0;
    if esp!(unsafe { sys::esp_spiffs_info(std::ptr::null(), &mut total, &mut used) }).is_ok() {
        info!("SPIFFS: {} / {} bytes 使用中", used, total);
    }
    Ok(())
}
