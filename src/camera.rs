// camera.rs

use thiserror::Error;

use crate::*;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera not initialized")]
    NotInitialized,

    #[error("Camera init failed with error 0x{0:x}")]
    Init(i32),

    #[error("Camera capture failed")]
    CaptureFailed,

    #[error("Camera sensor not available")]
    NoSensor,

    #[error("Sensor setting {0} failed with error 0x{1:x}")]
    Setting(&'static str, i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSize {
    /// 800x600
    Svga,
    /// 1600x1200
    Uxga,
}

impl FrameSize {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            FrameSize::Svga => (800, 600),
            FrameSize::Uxga => (1600, 1200),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureProfile {
    pub frame_size: FrameSize,
    /// Lower is better quality, 0..=63.
    pub jpeg_quality: u8,
    pub fb_count: u8,
    pub fb_in_psram: bool,
    pub xclk_freq_hz: u32,
}

impl CaptureProfile {
    /// Full resolution double buffering only fits when external PSRAM is present.
    pub fn for_memory(has_psram: bool) -> Self {
        match has_psram {
            true => Self {
                frame_size: FrameSize::Uxga,
                jpeg_quality: 10,
                fb_count: 2,
                fb_in_psram: true,
                xclk_freq_hz: 20_000_000,
            },
            false => Self {
                frame_size: FrameSize::Svga,
                jpeg_quality: 12,
                fb_count: 1,
                fb_in_psram: false,
                xclk_freq_hz: 20_000_000,
            },
        }
    }
}

/// Camera wiring. `-1` marks a pin that is not connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinConfig {
    pub pwdn: i32,
    pub reset: i32,
    pub xclk: i32,
    pub sda: i32,
    pub scl: i32,
    /// D0..D7 (Y2..Y9 on the schematics)
    pub data: [i32; 8],
    pub vsync: i32,
    pub href: i32,
    pub pclk: i32,
}

impl PinConfig {
    pub const XIAO_ESP32S3_SENSE: PinConfig = PinConfig {
        pwdn: -1,
        reset: -1,
        xclk: 10,
        sda: 40,
        scl: 39,
        data: [15, 17, 18, 16, 14, 12, 11, 48],
        vsync: 38,
        href: 47,
        pclk: 13,
    };

    pub const FREENOVE_WROVER: PinConfig = PinConfig {
        pwdn: -1,
        reset: -1,
        xclk: 21,
        sda: 26,
        scl: 27,
        data: [4, 5, 18, 19, 36, 39, 34, 35],
        vsync: 25,
        href: 23,
        pclk: 22,
    };

    pub fn log(&self) {
        info!("Camera pin configuration:");
        info!(
            "  XCLK: {}, PCLK: {}, VSYNC: {}, HREF: {}",
            self.xclk, self.pclk, self.vsync, self.href
        );
        info!("  SDA: {}, SCL: {}", self.sda, self.scl);
        info!("  Data pins: {:?}", self.data);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorParam {
    Brightness,
    Contrast,
    Saturation,
    SpecialEffect,
    WhiteBalance,
    AwbGain,
    WbMode,
    ExposureCtrl,
    Aec2,
    AeLevel,
    AecValue,
    GainCtrl,
    AgcGain,
    GainCeiling,
    Bpc,
    Wpc,
    RawGamma,
    LensCorrection,
    HMirror,
    VFlip,
    Dcw,
    Colorbar,
}

impl SensorParam {
    pub fn name(self) -> &'static str {
        match self {
            SensorParam::Brightness => "brightness",
            SensorParam::Contrast => "contrast",
            SensorParam::Saturation => "saturation",
            SensorParam::SpecialEffect => "special_effect",
            SensorParam::WhiteBalance => "whitebal",
            SensorParam::AwbGain => "awb_gain",
            SensorParam::WbMode => "wb_mode",
            SensorParam::ExposureCtrl => "exposure_ctrl",
            SensorParam::Aec2 => "aec2",
            SensorParam::AeLevel => "ae_level",
            SensorParam::AecValue => "aec_value",
            SensorParam::GainCtrl => "gain_ctrl",
            SensorParam::AgcGain => "agc_gain",
            SensorParam::GainCeiling => "gainceiling",
            SensorParam::Bpc => "bpc",
            SensorParam::Wpc => "wpc",
            SensorParam::RawGamma => "raw_gma",
            SensorParam::LensCorrection => "lenc",
            SensorParam::HMirror => "hmirror",
            SensorParam::VFlip => "vflip",
            SensorParam::Dcw => "dcw",
            SensorParam::Colorbar => "colorbar",
        }
    }
}

/// Sensor tuning applied after every successful init, in this order.
pub const SENSOR_TUNING: &[(SensorParam, i32)] = &[
    (SensorParam::Brightness, 0),    // -2..2
    (SensorParam::Contrast, 0),      // -2..2
    (SensorParam::Saturation, 0),    // -2..2
    (SensorParam::SpecialEffect, 0), // 0 = none .. 6 = sepia
    (SensorParam::WhiteBalance, 1),
    (SensorParam::AwbGain, 1),
    (SensorParam::WbMode, 0), // 0 = auto
    (SensorParam::ExposureCtrl, 1),
    (SensorParam::Aec2, 0),
    (SensorParam::AeLevel, 0),   // -2..2
    (SensorParam::AecValue, 300), // 0..1200
    (SensorParam::GainCtrl, 1),
    (SensorParam::AgcGain, 0),     // 0..30
    (SensorParam::GainCeiling, 0), // 0..6
    (SensorParam::Bpc, 0),
    (SensorParam::Wpc, 1),
    (SensorParam::RawGamma, 1),
    (SensorParam::LensCorrection, 1),
    (SensorParam::HMirror, 0),
    (SensorParam::VFlip, 0),
    (SensorParam::Dcw, 1),
    (SensorParam::Colorbar, 0),
];

/// One captured JPEG, copied out of the driver's frame buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub trait CameraDriver: Send {
    fn init(&mut self, pins: &PinConfig, profile: &CaptureProfile) -> Result<(), CameraError>;
    fn apply(&mut self, param: SensorParam, value: i32) -> Result<(), CameraError>;
    /// Grab one frame. The driver's buffer must be handed back before returning.
    fn grab(&mut self) -> Option<Frame>;
}

pub struct Camera {
    driver: Box<dyn CameraDriver>,
    profile: Option<CaptureProfile>,
}

impl Camera {
    pub fn new(driver: Box<dyn CameraDriver>) -> Self {
        Self {
            driver,
            profile: None,
        }
    }

    pub fn profile(&self) -> Option<CaptureProfile> {
        self.profile
    }

    pub fn init(&mut self, pins: &PinConfig, has_psram: bool) -> Result<CaptureProfile, CameraError> {
        let profile = CaptureProfile::for_memory(has_psram);
        info!(
            "PSRAM {}, using {:?} q={} fb_count={}",
            if has_psram { "found" } else { "not found" },
            profile.frame_size,
            profile.jpeg_quality,
            profile.fb_count
        );
        self.driver.init(pins, &profile)?;

        for &(param, value) in SENSOR_TUNING {
            if let Err(e) = self.driver.apply(param, value) {
                warn!("{e}");
            }
        }

        self.profile = Some(profile);
        Ok(profile)
    }

    pub fn capture(&mut self) -> Result<Frame, CameraError> {
        if self.profile.is_none() {
            return Err(CameraError::NotInitialized);
        }
        match self.driver.grab() {
            Some(frame) if !frame.is_empty() => Ok(frame),
            _ => Err(CameraError::CaptureFailed),
        }
    }
}


// EOF
