// esp/board.rs

use std::net::Ipv4Addr;

use anyhow::anyhow;
use embedded_svc::wifi::{AccessPointConfiguration, AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AccessPointInfo, BlockingWifi, EspWifi},
};
use esp_idf_sys::{self as sys, esp};

use crate::*;

pub struct EspRadio {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl EspRadio {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> anyhow::Result<Self> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), nvs)?, sysloop)?;
        Ok(Self { wifi })
    }

    fn start_if_needed(&mut self) -> anyhow::Result<()> {
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        Ok(())
    }
}

fn encryption(auth: Option<AuthMethod>) -> Encryption {
    match auth {
        Some(AuthMethod::None) => Encryption::Open,
        Some(AuthMethod::WEP) => Encryption::Wep,
        Some(AuthMethod::WPA) => Encryption::Wpa,
        Some(AuthMethod::WPA2Personal) => Encryption::Wpa2,
        Some(AuthMethod::WPAWPA2Personal) => Encryption::WpaWpa2,
        Some(AuthMethod::WPA2Enterprise) => Encryption::Wpa2Enterprise,
        Some(AuthMethod::WPA3Personal) => Encryption::Wpa3,
        _ => Encryption::Unknown,
    }
}

impl From<&AccessPointInfo> for AccessPoint {
    fn from(ap: &AccessPointInfo) -> Self {
        Self {
            ssid: ap.ssid.as_str().to_owned(),
            rssi: ap.signal_strength,
            auth: encryption(ap.auth_method),
            channel: ap.channel,
        }
    }
}

impl Radio for EspRadio {
    fn scan(&mut self) -> anyhow::Result<Vec<AccessPoint>> {
        if !self.wifi.is_started()? {
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
            self.wifi.start()?;
        }
        let aps = self.wifi.scan()?;
        Ok(aps.iter().map(AccessPoint::from).collect())
    }

    fn connect(&mut self, ssid: &str, password: &str) -> anyhow::Result<()> {
        let auth_method = match password.is_empty() {
            true => AuthMethod::None,
            false => AuthMethod::WPA2Personal,
        };
        self.wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| anyhow!("SSID too long: {ssid}"))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("WiFi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;
        self.start_if_needed()?;
        self.wifi.wifi_mut().connect()?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn station_address(&mut self) -> anyhow::Result<Ipv4Addr> {
        self.wifi.wait_netif_up()?;
        Ok(self.wifi.wifi().sta_netif().get_ip_info()?.ip)
    }

    fn start_access_point(&mut self, ssid: &str, password: &str) -> anyhow::Result<Ipv4Addr> {
        // the station half stays so the periodic scan keeps working
        if let Err(e) = self.wifi.wifi_mut().disconnect() {
            debug!("Station disconnect before AP start: {e}");
        }
        self.wifi.stop()?;
        self.wifi.set_configuration(&Configuration::Mixed(
            ClientConfiguration::default(),
            AccessPointConfiguration {
                ssid: ssid.try_into().map_err(|_| anyhow!("AP SSID too long: {ssid}"))?,
                password: password
                    .try_into()
                    .map_err(|_| anyhow!("AP password too long"))?,
                auth_method: AuthMethod::WPA2Personal,
                channel: 1,
                ..Default::default()
            },
        ))?;
        self.wifi.start()?;
        Ok(self.wifi.wifi().ap_netif().get_ip_info()?.ip)
    }

    fn rssi(&self) -> i32 {
        let mut info = sys::wifi_ap_record_t::default();
        match esp!(unsafe { sys::esp_wifi_sta_get_ap_info(&mut info) }) {
            Ok(_) => info.rssi as i32,
            Err(_) => 0,
        }
    }

    fn ap_clients(&self) -> usize {
        let mut list = sys::wifi_sta_list_t::default();
        match esp!(unsafe { sys::esp_wifi_ap_get_sta_list(&mut list) }) {
            Ok(_) => list.num as usize,
            Err(_) => 0,
        }
    }

    fn mac_address(&self) -> String {
        match self.wifi.wifi().sta_netif().get_mac() {
            Ok(mac) => mac
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(":"),
            Err(e) => format!("<{e}>"),
        }
    }
}

pub struct EspSystem;

impl System for EspSystem {
    fn free_heap(&self) -> u32 {
        unsafe { sys::esp_get_free_heap_size() }
    }

    fn psram_size(&self) -> usize {
        unsafe { sys::heap_caps_get_total_size(sys::MALLOC_CAP_SPIRAM) }
    }

    fn free_psram(&self) -> usize {
        unsafe { sys::heap_caps_get_free_size(sys::MALLOC_CAP_SPIRAM) }
    }

    fn cpu_freq_mhz(&self) -> u32 {
        unsafe { sys::esp_rom_get_cpu_ticks_per_us() }
    }

    fn chip_info(&self) -> ChipInfo {
        let mut info = sys::esp_chip_info_t::default();
        unsafe { sys::esp_chip_info(&mut info) };

        let mut flash_size = 0_u32;
        if let Err(e) = esp!(unsafe { sys::esp_flash_get_size(std::ptr::null_mut(), &mut flash_size) }) {
            warn!("Could not read flash size: {e}");
        }

        #[allow(non_upper_case_globals)]
        let model = match info.model {
            sys::esp_chip_model_t_CHIP_ESP32 => "ESP32",
            sys::esp_chip_model_t_CHIP_ESP32S2 => "ESP32-S2",
            sys::esp_chip_model_t_CHIP_ESP32S3 => "ESP32-S3",
            sys::esp_chip_model_t_CHIP_ESP32C3 => "ESP32-C3",
            _ => "unknown",
        };
        ChipInfo {
            model: model.to_string(),
            revision: info.revision,
            cores: info.cores,
            flash_size,
        }
    }

    fn restart(&self) {
        esp_idf_hal::reset::restart();
    }
}

// EOF
