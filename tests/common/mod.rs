// tests/common/mod.rs
#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize};

use esp32cam::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone, Default)]
pub struct Probe {
    pub led_level: Arc<AtomicBool>,
    pub scans: Arc<AtomicUsize>,
    pub grabs: Arc<AtomicUsize>,
    pub restarted: Arc<AtomicBool>,
}

pub struct FakeLed(pub Probe);

impl Led for FakeLed {
    fn set(&mut self, on: bool) -> anyhow::Result<()> {
        self.0.led_level.store(on, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeRadio {
    pub probe: Probe,
    pub networks: usize,
}

impl Radio for FakeRadio {
    fn scan(&mut self) -> anyhow::Result<Vec<AccessPoint>> {
        self.probe.scans.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.networks)
            .map(|i| AccessPoint {
                ssid: format!("net{i}"),
                rssi: -40 - i as i8,
                auth: Encryption::Wpa2,
                channel: 1,
            })
            .collect())
    }
    fn connect(&mut self, _ssid: &str, _password: &str) -> anyhow::Result<()> {
        Ok(())
    }
    fn is_connected(&self) -> bool {
        true
    }
    fn station_address(&mut self) -> anyhow::Result<Ipv4Addr> {
        Ok(Ipv4Addr::new(192, 168, 1, 50))
    }
    fn start_access_point(&mut self, _ssid: &str, _password: &str) -> anyhow::Result<Ipv4Addr> {
        Ok(Ipv4Addr::new(192, 168, 4, 1))
    }
    fn rssi(&self) -> i32 {
        -48
    }
    fn ap_clients(&self) -> usize {
        0
    }
    fn mac_address(&self) -> String {
        "24:58:7c:00:00:01".into()
    }
}

pub struct FakeCamera {
    pub probe: Probe,
    pub init_ok: bool,
    pub frame: Option<Vec<u8>>,
}

impl CameraDriver for FakeCamera {
    fn init(&mut self, _pins: &PinConfig, _profile: &CaptureProfile) -> Result<(), CameraError> {
        match self.init_ok {
            true => Ok(()),
            false => Err(CameraError::Init(0x105)),
        }
    }
    fn apply(&mut self, _param: SensorParam, _value: i32) -> Result<(), CameraError> {
        Ok(())
    }
    fn grab(&mut self) -> Option<Frame> {
        self.probe.grabs.fetch_add(1, Ordering::SeqCst);
        self.frame.clone().map(|data| Frame {
            data,
            width: 1600,
            height: 1200,
        })
    }
}

pub struct FakeSystem(pub Probe);

impl System for FakeSystem {
    fn free_heap(&self) -> u32 {
        123_456
    }
    fn psram_size(&self) -> usize {
        8 * 1024 * 1024
    }
    fn cpu_freq_mhz(&self) -> u32 {
        240
    }
    fn free_psram(&self) -> usize {
        6 * 1024 * 1024
    }
    fn chip_info(&self) -> ChipInfo {
        ChipInfo {
            model: "ESP32-S3".into(),
            revision: 2,
            cores: 2,
            flash_size: 8 * 1024 * 1024,
        }
    }
    fn restart(&self) {
        self.0.restarted.store(true, Ordering::SeqCst);
    }
}

pub const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0xff, 0xd9];

pub struct Rig {
    pub state: Arc<Pin<Box<MyState>>>,
    pub probe: Probe,
}

pub fn rig(init_ok: bool, frame: Option<Vec<u8>>) -> Rig {
    let probe = Probe::default();
    let hw = MyHardware {
        led: Box::new(FakeLed(probe.clone())),
        radio: Box::new(FakeRadio {
            probe: probe.clone(),
            networks: 3,
        }),
        camera: Box::new(FakeCamera {
            probe: probe.clone(),
            init_ok,
            frame,
        }),
        system: Box::new(FakeSystem(probe.clone())),
    };
    let config = MyConfig {
        restart_delay: Duration::from_millis(200),
        ..Default::default()
    };
    Rig {
        state: Arc::new(Box::pin(MyState::new(config, hw))),
        probe,
    }
}

pub async fn serve(state: Arc<Pin<Box<MyState>>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    addr
}

#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal HTTP/1.1 client, one request per connection.
pub async fn request(addr: SocketAddr, method: &str, path: &str) -> Reply {
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    sock.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    sock.read_to_end(&mut raw).await.unwrap();

    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .expect("bad status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Reply {
        status,
        headers,
        body,
    }
}

// EOF
