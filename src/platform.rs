// platform.rs
//! Hardware seams. The firmware binary plugs in ESP-IDF implementations,
//! tests plug in fakes.

use std::net::Ipv4Addr;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::*;

pub trait Led: Send {
    fn set(&mut self, on: bool) -> anyhow::Result<()>;
}

pub trait Button: Send {
    /// The boot button is wired active low with a pull-up.
    fn is_low(&mut self) -> bool;
}

pub trait Radio: Send {
    fn scan(&mut self) -> anyhow::Result<Vec<AccessPoint>>;

    /// Start station association. Returns right away; poll [`Radio::is_connected`].
    fn connect(&mut self, ssid: &str, password: &str) -> anyhow::Result<()>;
    fn is_connected(&self) -> bool;
    fn station_address(&mut self) -> anyhow::Result<Ipv4Addr>;

    fn start_access_point(&mut self, ssid: &str, password: &str) -> anyhow::Result<Ipv4Addr>;

    /// Signal strength of the associated AP, 0 when not associated.
    fn rssi(&self) -> i32;
    fn ap_clients(&self) -> usize;
    fn mac_address(&self) -> String;
}

#[derive(Clone, Debug, Default)]
pub struct ChipInfo {
    pub model: String,
    pub revision: u16,
    pub cores: u8,
    pub flash_size: u32,
}

pub trait System: Send + Sync {
    fn free_heap(&self) -> u32;
    fn cpu_freq_mhz(&self) -> u32;
    /// Size of external PSRAM, 0 when the module has none.
    fn psram_size(&self) -> usize;
    fn free_psram(&self) -> usize;
    fn chip_info(&self) -> ChipInfo;
    fn restart(&self);
}

/// Boot diagnostics, one log line each.
pub fn system_report(system: &dyn System) -> Vec<String> {
    let chip = system.chip_info();
    let mut lines = vec![
        "=== System Information ===".to_string(),
        format!("Chip Model: {}", chip.model),
        format!("Chip Revision: {}", chip.revision),
        format!("CPU Cores: {}", chip.cores),
        format!("CPU Frequency: {} MHz", system.cpu_freq_mhz()),
        format!("Flash Size: {} bytes", chip.flash_size),
        format!("Free Heap: {} bytes", system.free_heap()),
    ];
    lines.extend(psram_report(system));
    lines.push("==========================".to_string());
    lines
}

pub fn psram_report(system: &dyn System) -> Vec<String> {
    let size = system.psram_size();
    let mut lines = vec![format!("PSRAM Found: {}", if size > 0 { "YES" } else { "NO" })];
    if size > 0 {
        lines.push(format!("PSRAM Size: {size} bytes"));
        lines.push(format!("Free PSRAM: {} bytes", system.free_psram()));
    }
    lines
}

/// Any embedded-hal output pin drives the status LED.
pub struct PinLed<P>(pub P);

impl<P> Led for PinLed<P>
where
    P: OutputPin + Send,
{
    fn set(&mut self, on: bool) -> anyhow::Result<()> {
        let res = if on {
            self.0.set_high()
        } else {
            self.0.set_low()
        };
        res.map_err(|e| anyhow::anyhow!("LED pin write failed: {e:?}"))
    }
}

pub struct PinButton<P>(pub P);

impl<P> Button for PinButton<P>
where
    P: InputPin + Send,
{
    fn is_low(&mut self) -> bool {
        // a read error is treated as released
        self.0.is_low().unwrap_or(false)
    }
}


// EOF
