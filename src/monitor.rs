// monitor.rs

use crate::*;

/// The firmware main loop: LED heartbeat, periodic WiFi scan and the boot button.
pub struct Monitor {
    scheduler: Scheduler<MyState>,
    scan: TaskId,
    button: Box<dyn Button>,
    edge: EdgeDetector,
}

impl Monitor {
    pub fn new(config: &MyConfig, button: Box<dyn Button>) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.every("blink", config.blink_interval.as_millis() as Millis, blink);
        let scan = scheduler.every(
            "scan",
            config.scan_interval.as_millis() as Millis,
            |state: &MyState, _now| scan_networks(state),
        );
        Self {
            scheduler,
            scan,
            button,
            edge: EdgeDetector::default(),
        }
    }

    pub fn scheduler(&self) -> &Scheduler<MyState> {
        &self.scheduler
    }

    /// One pass of the loop. Returns true when a button press was seen and
    /// the caller should wait out the debounce delay.
    pub fn iterate(&mut self, state: &MyState, now: Millis) -> bool {
        self.scheduler.tick(state, now);

        let high = !self.button.is_low();
        if self.edge.falling(high) {
            info!("Button pressed! Performing WiFi scan now...");
            self.scheduler.force_due(self.scan, now);
            return true;
        }
        false
    }
}

pub async fn run_monitor(state: Arc<Pin<Box<MyState>>>, mut monitor: Monitor) -> anyhow::Result<()> {
    info!("Monitor loop running.");
    loop {
        if monitor.iterate(&state, state.uptime_ms()) {
            sleep(state.config.debounce).await;
        }
        sleep(state.config.loop_pause).await;
    }
}

fn blink(state: &MyState, now: Millis) {
    let on = state.toggle_led();
    let heap = state.system.free_heap();

    let link = if state.wifi_connected() && lock(&state.radio).is_connected() {
        format!("WiFi RSSI: {} dBm", lock(&state.radio).rssi())
    } else if state.ap_mode() {
        format!("AP Mode | Connected clients: {}", lock(&state.radio).ap_clients())
    } else {
        state.wifi_connected.store(false, Ordering::Relaxed);
        "WiFi: Disconnected".to_string()
    };

    info!(
        "Uptime: {now} ms | Free Heap: {heap} bytes | LED: {} | {link}",
        if on { "ON" } else { "OFF" }
    );
}

fn scan_networks(state: &MyState) {
    info!("=== WiFi Network Scan ===");
    let res = lock(&state.radio).scan();
    match res {
        Ok(aps) => log_scan_table(&aps, &state.config.wifi_ssid),
        Err(e) => error!("WiFi scan failed: {e:#}"),
    }
    info!("========================");
}


// EOF
