use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};
use esp_idf_svc::sys::EspError;
use log::{info, warn};

/// SNTP 同期を開始する（完了は待たない）
///
/// 返り値を保持している間だけ同期が続く。
pub fn start_sntp(servers: &[String]) -> Result<EspSntp<'static>, EspError> {
    let mut conf = SntpConf::default();
    for (slot, host) in conf.servers.iter_mut().zip(servers) {
        *slot = host.as_str();
    }

    let sntp = EspSntp::new(&conf)?;
    info!("SNTP を開始しました: {:?}", &conf.servers);
    Ok(sntp)
}

pub fn log_sync_status(sntp: &EspSntp<'static>) {
    match sntp.get_sync_status() {
        SyncStatus::Completed => info!("時刻同期が完了しました"),
        SyncStatus::InProgress => info!("時刻同期中です"),
        SyncStatus::Reset => warn!("時刻はまだ同期されていません"),
    }
}
