// tests/api_server.rs

mod common;

use common::*;
use esp32cam::*;

#[tokio::test]
async fn index_serves_dashboard() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/").await;
    assert_eq!(r.status, 200);
    assert!(r.header("content-type").unwrap().starts_with("text/html"));
    let page = r.text();
    assert!(page.contains(BOARD_NAME));
    assert!(page.contains("/api/status"));
    assert!(page.contains(FW_VERSION));
}

#[tokio::test]
async fn status_reports_flat_snapshot() {
    let rig = rig(true, None);
    rig.state.wifi_connected.store(true, Ordering::Relaxed);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/api/status").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.header("content-type"), Some("application/json"));
    let v = r.json();
    assert_eq!(v["freeHeap"], 123_456);
    assert_eq!(v["wifiRSSI"], -48);
    assert_eq!(v["ledStatus"], false);
    assert_eq!(v["temperature"], 25);
    assert_eq!(v["motionDetected"], false);
    assert!(v["uptime"].is_u64());
}

#[tokio::test]
async fn rssi_is_zero_without_station_link() {
    let rig = rig(true, None);
    rig.state.ap_mode.store(true, Ordering::Relaxed);
    let addr = serve(rig.state.clone()).await;

    let v = request(addr, "GET", "/api/status").await.json();
    assert_eq!(v["wifiRSSI"], 0);
}

#[tokio::test]
async fn toggle_is_visible_on_next_status() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "POST", "/api/led/toggle").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json()["status"], "ON");
    assert!(rig.probe.led_level.load(Ordering::SeqCst));
    assert_eq!(request(addr, "GET", "/api/status").await.json()["ledStatus"], true);

    assert_eq!(request(addr, "POST", "/api/led/toggle").await.json()["status"], "OFF");
    assert_eq!(request(addr, "GET", "/api/status").await.json()["ledStatus"], false);
    assert!(!rig.probe.led_level.load(Ordering::SeqCst));
}

#[tokio::test]
async fn toggle_requires_post() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/api/led/toggle").await;
    assert_eq!(r.status, 405);
    assert!(!rig.state.led_on());
}

#[tokio::test]
async fn wifi_scan_returns_count() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "POST", "/api/wifi/scan").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json()["networks"], 3);
    assert_eq!(rig.probe.scans.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn restart_answers_before_restarting() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "POST", "/api/restart").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json()["status"], "restarting");
    assert!(!rig.probe.restarted.load(Ordering::SeqCst));

    sleep(Duration::from_millis(500)).await;
    assert!(rig.probe.restarted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn capture_before_init_is_an_error() {
    let rig = rig(true, Some(JPEG.to_vec()));
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/api/camera/capture").await;
    assert_eq!(r.status, 500);
    assert_eq!(r.header("content-type"), Some("application/json"));
    assert_eq!(r.json()["error"], "Camera not initialized");
    assert_eq!(rig.probe.grabs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_init_leaves_camera_offline() {
    let rig = rig(false, Some(JPEG.to_vec()));
    assert!(!rig.state.init_camera(&PinConfig::XIAO_ESP32S3_SENSE).await);
    assert!(!rig.state.camera_ready());
    assert_eq!(rig.state.last_error().await, "Camera init failed with error 0x105");

    let addr = serve(rig.state.clone()).await;
    let r = request(addr, "GET", "/api/camera/capture").await;
    assert_eq!(r.status, 500);
    assert_eq!(r.json()["error"], "Camera not initialized");
    assert_eq!(rig.probe.grabs.load(Ordering::SeqCst), 0);

    // the rest of the API keeps working
    assert_eq!(request(addr, "GET", "/api/status").await.status, 200);
}

#[tokio::test]
async fn capture_returns_jpeg() {
    let rig = rig(true, Some(JPEG.to_vec()));
    assert!(rig.state.init_camera(&PinConfig::XIAO_ESP32S3_SENSE).await);
    let addr = serve(rig.state.clone()).await;

    // cache busting query strings are ignored
    let r = request(addr, "GET", "/api/camera/capture?1718000000000").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.header("content-type"), Some("image/jpeg"));
    assert_eq!(r.header("cache-control"), Some("no-cache"));
    assert_eq!(r.body, JPEG);
    assert_eq!(rig.probe.grabs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn capture_failure_is_reported_per_request() {
    let rig = rig(true, None);
    assert!(rig.state.init_camera(&PinConfig::XIAO_ESP32S3_SENSE).await);
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/api/camera/capture").await;
    assert_eq!(r.status, 500);
    assert_eq!(r.json()["error"], "Camera capture failed");
    // no internal retry, camera stays usable
    assert_eq!(rig.probe.grabs.load(Ordering::SeqCst), 1);
    assert!(rig.state.camera_ready());
}

#[tokio::test]
async fn camera_page_needs_camera() {
    let rig = rig(true, Some(JPEG.to_vec()));
    let addr = serve(rig.state.clone()).await;

    let r = request(addr, "GET", "/camera").await;
    assert_eq!(r.status, 500);
    assert!(r.header("content-type").unwrap().starts_with("text/plain"));
    assert_eq!(r.text(), "Camera not initialized");

    rig.state.init_camera(&PinConfig::XIAO_ESP32S3_SENSE).await;
    let r = request(addr, "GET", "/camera").await;
    assert_eq!(r.status, 200);
    let page = r.text();
    assert!(page.contains("/api/camera/capture"));
    // PSRAM fitted, so the large profile
    assert!(page.contains("1600x1200"));
}

#[tokio::test]
async fn requests_are_counted() {
    let rig = rig(true, None);
    let addr = serve(rig.state.clone()).await;

    request(addr, "GET", "/api/status").await;
    request(addr, "POST", "/api/led/toggle").await;
    assert_eq!(rig.state.api_cnt.load(Ordering::Relaxed), 2);
}

// EOF
