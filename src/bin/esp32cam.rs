// bin/esp32cam.rs

#![warn(clippy::large_futures)]

#[cfg(all(feature = "xiao-esp32s3", feature = "esp32-wrover"))]
compile_error!("Select only one board feature: `xiao-esp32s3` or `esp32-wrover`");
#[cfg(not(any(feature = "xiao-esp32s3", feature = "esp32-wrover")))]
compile_error!("Select a board feature: `xiao-esp32s3` or `esp32-wrover`");

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::main()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("esp32cam only runs on an ESP-IDF target")
}

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_hal::{
        delay::FreeRtos,
        gpio::{IOPin, OutputPin, PinDriver, Pull},
        prelude::Peripherals,
    };
    use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs};
    use esp_idf_sys::esp;

    use esp32cam::esp::*;
    use esp32cam::*;

    pub fn main() -> anyhow::Result<()> {
        esp_idf_sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        // eventfd is needed by our mio poll implementation.  Note you should set max_fds
        // higher if you have other code that may need eventfd.
        #[allow(clippy::needless_update)]
        let config = esp_idf_sys::esp_vfs_eventfd_config_t {
            max_fds: 1,
            ..Default::default()
        };
        esp! { unsafe { esp_idf_sys::esp_vfs_eventfd_register(&config) } }?;

        // give the serial monitor a moment to attach
        FreeRtos::delay_ms(2000);

        info!("========================================");
        info!("{BOARD_NAME} starting up, firmware version {FW_VERSION} ({BUILD_TIMESTAMP})");
        info!("========================================");

        let system = EspSystem;
        log_system_info(&system);

        let config = MyConfig::default();
        info!("My config:\n{config:#?}");

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        #[cfg(feature = "xiao-esp32s3")]
        let (led, button, camera_pins) = (
            pins.gpio21.downgrade_output(),
            pins.gpio0.downgrade(),
            PinConfig::XIAO_ESP32S3_SENSE,
        );

        #[cfg(feature = "esp32-wrover")]
        let (led, button, camera_pins) = (
            pins.gpio2.downgrade_output(),
            pins.gpio0.downgrade(),
            PinConfig::FREENOVE_WROVER,
        );

        let mut led = PinDriver::output(led)?;
        led.set_low()?;
        let mut button = PinDriver::input(button)?;
        button.set_pull(Pull::Up)?;
        info!("LED and button pins configured");

        let sysloop = EspSystemEventLoop::take()?;
        let nvs_default_partition = nvs::EspDefaultNvsPartition::take()?;
        let radio = EspRadio::new(peripherals.modem, sysloop, Some(nvs_default_partition))?;

        let hw = MyHardware {
            led: Box::new(PinLed(led)),
            radio: Box::new(radio),
            camera: Box::new(EspCamera::new()),
            system: Box::new(system),
        };
        let monitor = Monitor::new(&config, Box::new(PinButton(button)));
        let shared_state = Arc::new(Box::pin(MyState::new(config, hw)));

        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(Box::pin(async move {
                if let Err(e) = Box::pin(boot(shared_state.clone(), &camera_pins)).await {
                    error!("Boot failed: {e:#}");
                    return;
                }

                info!("Entering main loop...");
                tokio::select! {
                    _ = Box::pin(run_api_server(shared_state.clone())) => { error!("run_api_server() ended."); }
                    _ = Box::pin(run_monitor(shared_state.clone(), monitor)) => { error!("run_monitor() ended."); }
                };
            }));

        // not actually returning from main() but we reboot instead!
        info!("main() finished, reboot.");
        FreeRtos::delay_ms(3000);
        esp_idf_hal::reset::restart();
    }

    // nothing else runs during boot, the radio lock is held across the connect polling
    #[allow(clippy::await_holding_lock)]
    async fn boot(state: Arc<Pin<Box<MyState>>>, camera_pins: &PinConfig) -> anyhow::Result<()> {
        info!("--- WiFi ---");
        let res = {
            let mut radio = lock(&state.radio);
            bootstrap(&mut **radio, &state.config).await?
        };
        state.apply_connectivity(&res).await;

        info!("--- Camera ---");
        if state.init_camera(camera_pins).await {
            for line in psram_report(state.system.as_ref()) {
                info!("{line}");
            }
        }

        info!("========================================");
        info!("SETUP COMPLETE - System Status:");
        info!(
            "- Camera: {}",
            if state.camera_ready() { "OK" } else { "FAILED" }
        );
        let wifi = match (res.connected, res.ap_mode) {
            (true, _) => "Connected",
            (false, true) => "AP Mode",
            _ => "Failed",
        };
        info!("- WiFi: {wifi} ({})", res.address);
        info!("- Free Heap: {} bytes", state.system.free_heap());
        if !state.camera_ready() {
            info!("- Last error: {}", state.last_error().await);
        }
        info!("========================================");
        Ok(())
    }

    fn log_system_info(system: &EspSystem) {
        for line in system_report(system) {
            info!("{line}");
        }
    }
}

// EOF
