// state.rs

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU32};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::*;

/// Hardware handed over to the shared state at boot.
pub struct MyHardware {
    pub led: Box<dyn Led>,
    pub radio: Box<dyn Radio>,
    pub camera: Box<dyn CameraDriver>,
    pub system: Box<dyn System>,
}

pub struct MyState {
    pub config: MyConfig,
    pub boot: Instant,
    pub api_cnt: AtomicU32,

    pub led_on: AtomicBool,
    pub wifi_connected: AtomicBool,
    pub ap_mode: AtomicBool,
    pub camera_ready: AtomicBool,
    pub last_error: RwLock<String>,
    pub ip_addr: RwLock<Ipv4Addr>,

    pub led: Mutex<Box<dyn Led>>,
    pub radio: Mutex<Box<dyn Radio>>,
    pub camera: Mutex<Camera>,
    pub system: Box<dyn System>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemStats {
    pub uptime: u64,
    #[serde(rename = "freeHeap")]
    pub free_heap: u32,
    #[serde(rename = "wifiRSSI")]
    pub wifi_rssi: i32,
    #[serde(rename = "ledStatus")]
    pub led_status: bool,
    pub temperature: i32,
    #[serde(rename = "motionDetected")]
    pub motion_detected: bool,
}

// no temperature or PIR sensor fitted yet
const PLACEHOLDER_TEMPERATURE: i32 = 25;

/// Poisoning is ignored, the guarded values are plain hardware handles.
pub fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MyState {
    pub fn new(config: MyConfig, hw: MyHardware) -> Self {
        Self {
            config,
            boot: Instant::now(),
            api_cnt: AtomicU32::new(0),
            led_on: AtomicBool::new(false),
            wifi_connected: AtomicBool::new(false),
            ap_mode: AtomicBool::new(false),
            camera_ready: AtomicBool::new(false),
            last_error: RwLock::new(String::new()),
            ip_addr: RwLock::new(Ipv4Addr::UNSPECIFIED),
            led: Mutex::new(hw.led),
            radio: Mutex::new(hw.radio),
            camera: Mutex::new(Camera::new(hw.camera)),
            system: hw.system,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.boot.elapsed()
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime().as_millis() as u64
    }

    pub fn led_on(&self) -> bool {
        self.led_on.load(Ordering::Relaxed)
    }

    /// Flip the LED and drive the pin. Returns the new state.
    pub fn toggle_led(&self) -> bool {
        let mut led = lock(&self.led);
        let on = !self.led_on.load(Ordering::Relaxed);
        self.led_on.store(on, Ordering::Relaxed);
        if let Err(e) = led.set(on) {
            warn!("LED write failed: {e:#}");
        }
        on
    }

    pub fn wifi_connected(&self) -> bool {
        self.wifi_connected.load(Ordering::Relaxed)
    }

    pub fn ap_mode(&self) -> bool {
        self.ap_mode.load(Ordering::Relaxed)
    }

    pub fn camera_ready(&self) -> bool {
        self.camera_ready.load(Ordering::Relaxed)
    }

    pub async fn apply_connectivity(&self, res: &ConnectivityResult) {
        self.wifi_connected.store(res.connected, Ordering::Relaxed);
        self.ap_mode.store(res.ap_mode, Ordering::Relaxed);
        *self.ip_addr.write().await = res.address;
    }

    pub async fn set_error<S: Into<String>>(&self, msg: S) {
        *self.last_error.write().await = msg.into();
    }

    pub async fn last_error(&self) -> String {
        self.last_error.read().await.clone()
    }

    pub fn snapshot(&self) -> SystemStats {
        let wifi_rssi = match self.wifi_connected() {
            true => lock(&self.radio).rssi(),
            false => 0,
        };
        SystemStats {
            uptime: self.uptime().as_secs(),
            free_heap: self.system.free_heap(),
            wifi_rssi,
            led_status: self.led_on(),
            temperature: PLACEHOLDER_TEMPERATURE,
            motion_detected: false,
        }
    }

    /// One-shot camera bring-up. Failure is recorded and the firmware keeps running.
    pub async fn init_camera(&self, pins: &PinConfig) -> bool {
        let has_psram = self.system.psram_size() > 0;
        let res = lock(&self.camera).init(pins, has_psram);
        match res {
            Ok(profile) => {
                info!("Camera initialized: {profile:?}");
                self.camera_ready.store(true, Ordering::Relaxed);
                true
            }
            Err(e) => {
                let msg = e.to_string();
                error!("Camera initialization FAILED: {msg}");
                self.set_error(msg).await;
                false
            }
        }
    }
}

// EOF
