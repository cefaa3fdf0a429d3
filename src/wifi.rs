// wifi.rs

use std::fmt;
use std::net::Ipv4Addr;

use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encryption {
    Open,
    Wep,
    Wpa,
    Wpa2,
    WpaWpa2,
    Wpa2Enterprise,
    Wpa3,
    Unknown,
}

impl Encryption {
    pub fn is_open(self) -> bool {
        self == Encryption::Open
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Encryption::Open => "Open",
            Encryption::Wep => "WEP",
            Encryption::Wpa => "WPA",
            Encryption::Wpa2 => "WPA2",
            Encryption::WpaWpa2 => "WPA/WPA2",
            Encryption::Wpa2Enterprise => "WPA2-ENT",
            Encryption::Wpa3 => "WPA3",
            Encryption::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String,
    pub rssi: i8,
    pub auth: Encryption,
    pub channel: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectivityResult {
    pub connected: bool,
    pub ap_mode: bool,
    pub address: Ipv4Addr,
}

/// Log a full scan table, highlighting `target` if it is visible.
pub fn log_scan_table(aps: &[AccessPoint], target: &str) {
    info!("Found {} networks:", aps.len());
    if aps.is_empty() {
        info!("No WiFi networks found!");
        return;
    }
    for (i, ap) in aps.iter().enumerate() {
        info!(
            "{:2}: {:<20} {:3} dBm [{}] Ch:{}",
            i + 1,
            ap.ssid,
            ap.rssi,
            ap.auth,
            ap.channel
        );
        if ap.ssid == target {
            info!("    *** TARGET SSID FOUND! Signal: {} dBm ***", ap.rssi);
        }
    }
}

/// Scan once, try the configured network and fall back to our own access point.
///
/// Runs exactly once at boot. The access point fallback is unconditional once
/// the attempt ceiling is reached; station mode is never retried afterwards.
pub async fn bootstrap(radio: &mut dyn Radio, config: &MyConfig) -> anyhow::Result<ConnectivityResult> {
    info!("WiFi MAC Address: {}", radio.mac_address());
    info!("Target SSID: '{}'", config.wifi_ssid);
    info!("Password length: {} characters", config.wifi_pass.len());

    info!("Scanning for WiFi networks...");
    let aps = match radio.scan() {
        Ok(aps) => aps,
        Err(e) => {
            error!("WiFi scan failed: {e:#}");
            Vec::new()
        }
    };
    info!("Found {} networks:", aps.len());
    let mut ssid_found = false;
    for (i, ap) in aps.iter().enumerate() {
        info!(
            "{}: {} ({} dBm) {}",
            i + 1,
            ap.ssid,
            ap.rssi,
            if ap.auth.is_open() { "Open" } else { "Encrypted" }
        );
        if ap.ssid == config.wifi_ssid {
            ssid_found = true;
            info!("*** Target SSID found with signal strength: {} dBm", ap.rssi);
        }
    }
    if !ssid_found {
        warn!("SSID '{}' not found in scan!", config.wifi_ssid);
    }

    info!("Connecting to WiFi...");
    let mut connected = match radio.connect(&config.wifi_ssid, &config.wifi_pass) {
        Ok(()) => wait_connected(radio, config).await,
        Err(e) => {
            error!("WiFi connect failed: {e:#}");
            false
        }
    };

    let mut address = Ipv4Addr::UNSPECIFIED;
    if connected {
        match radio.station_address() {
            Ok(ip) => {
                address = ip;
                info!("WiFi connected successfully!");
                info!("IP address: {address}");
                info!("Signal strength: {} dBm", radio.rssi());
            }
            Err(e) => {
                error!("No station address: {e:#}");
                connected = false;
            }
        }
    }

    if connected {
        return Ok(ConnectivityResult {
            connected: true,
            ap_mode: false,
            address,
        });
    }

    warn!("WiFi connection failed - starting AP mode");
    let address = radio.start_access_point(&config.ap_ssid, &config.ap_pass)?;
    info!("AP IP address: {address}");
    info!("AP SSID: {}", config.ap_ssid);
    info!("Connect your device to this AP to access the camera!");
    Ok(ConnectivityResult {
        connected: false,
        ap_mode: true,
        address,
    })
}

async fn wait_connected(radio: &dyn Radio, config: &MyConfig) -> bool {
    let max = config.connect_attempts;
    for attempt in 1..=max {
        if radio.is_connected() {
            return true;
        }
        sleep(config.connect_poll).await;
        if config.progress_every > 0 && attempt % config.progress_every == 0 {
            info!("Attempt {attempt}/{max}, connected: {}", radio.is_connected());
        }
    }
    radio.is_connected()
}


// EOF
