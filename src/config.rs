// config.rs

use std::fmt;

use crate::*;

pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIMESTAMP: &str = match option_env!("SOURCE_TIMESTAMP") {
    Some(ts) => ts,
    None => "unknown",
};

#[cfg(not(feature = "esp32-wrover"))]
pub const BOARD_NAME: &str = "XIAO ESP32S3 SENSE";
#[cfg(feature = "esp32-wrover")]
pub const BOARD_NAME: &str = "ESP32 WROVER CAM";

const DEFAULT_WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "my-ssid",
};
const DEFAULT_WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(s) => s,
    None => "my-password",
};
const DEFAULT_AP_SSID: &str = match option_env!("AP_SSID") {
    Some(s) => s,
    None => "XIAO-ESP32S3-SENSE",
};
const DEFAULT_AP_PASS: &str = match option_env!("AP_PASS") {
    Some(s) => s,
    None => "12345678",
};

#[derive(Clone)]
pub struct MyConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub ap_ssid: String,
    pub ap_pass: String,
    pub port: u16,

    pub blink_interval: Duration,
    pub scan_interval: Duration,

    /// Station association is polled this many times before falling back to AP mode.
    pub connect_attempts: u32,
    pub connect_poll: Duration,
    pub progress_every: u32,

    pub loop_pause: Duration,
    pub debounce: Duration,
    pub restart_delay: Duration,
}

impl Default for MyConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: DEFAULT_WIFI_SSID.into(),
            wifi_pass: DEFAULT_WIFI_PASS.into(),
            ap_ssid: DEFAULT_AP_SSID.into(),
            ap_pass: DEFAULT_AP_PASS.into(),
            port: 80,

            blink_interval: Duration::from_millis(1000),
            scan_interval: Duration::from_millis(30_000),

            connect_attempts: 30,
            connect_poll: Duration::from_millis(500),
            progress_every: 10,

            loop_pause: Duration::from_millis(10),
            debounce: Duration::from_millis(100),
            restart_delay: Duration::from_millis(1000),
        }
    }
}

// passwords never end up in the log, only their length
impl fmt::Debug for MyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MyConfig")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_pass", &format_args!("<{} chars>", self.wifi_pass.len()))
            .field("ap_ssid", &self.ap_ssid)
            .field("ap_pass", &format_args!("<{} chars>", self.ap_pass.len()))
            .field("port", &self.port)
            .field("blink_interval", &self.blink_interval)
            .field("scan_interval", &self.scan_interval)
            .field("connect_attempts", &self.connect_attempts)
            .field("connect_poll", &self.connect_poll)
            .field("progress_every", &self.progress_every)
            .field("loop_pause", &self.loop_pause)
            .field("debounce", &self.debounce)
            .field("restart_delay", &self.restart_delay)
            .finish()
    }
}


// EOF
