use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

use super::{NetworkError, NetworkLink};
use crate::core::clock::Clock;
use crate::core::config::AppConfig;

/// WiFi ステーション接続を管理するモジュール
pub struct NetworkManager;

impl NetworkManager {
    /// WiFi に接続するまでブロックする
    ///
    /// 接続要求は非ブロッキングで出し、`wifi_wait_policy` の間隔で接続状態を確認する。
    pub fn connect_wifi<K: Clock + ?Sized>(
        modem: Modem,
        sysloop: &EspSystemEventLoop,
        nvs_partition: &EspDefaultNvsPartition,
        config: &AppConfig,
        clock: &K,
    ) -> Result<BlockingWifi<EspWifi<'static>>, NetworkError> {
        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sysloop.clone(), Some(nvs_partition.clone()))?,
            sysloop.clone(),
        )?;

        let auth_method = if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| NetworkError::InvalidCredentials("SSIDが長すぎます"))?,
            password: config
                .wifi_password
                .as_str()
                .try_into()
                .map_err(|_| NetworkError::InvalidCredentials("パスワードが長すぎます"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
        info!("WiFi ({}) に接続します", config.wifi_ssid);
        wifi.wifi_mut().connect()?;

        let mut attempts = 0;
        let connected = config.wifi_wait_policy.wait_until(clock, |attempt| {
            attempts = attempt;
            if wifi.is_connected().unwrap_or(false) {
                return true;
            }
            info!("WiFi接続中... ({})", attempt);
            false
        });
        if !connected {
            return Err(NetworkError::ConnectTimeout { attempts });
        }

        wifi.wait_netif_up()?;
        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("WiFiに接続しました: {}", ip_info.ip);

        Ok(wifi)
    }
}

/// WiFi 接続を保持し、切断時に再接続する
pub struct EspNetworkLink {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl EspNetworkLink {
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self { wifi }
    }
}

impl NetworkLink for EspNetworkLink {
    fn is_connected(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn reconnect(&mut self) -> bool {
        info!("WiFiに再接続しています...");
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi再接続に失敗しました: {:?}", e);
            return false;
        }
        if let Err(e) = self.wifi.wait_netif_up() {
            warn!("ネットワークインターフェースが起動しません: {:?}", e);
            return false;
        }
        info!("WiFiに再接続しました");
        true
    }
}
