// lib.rs
//! Camera monitor firmware for ESP32 boards.
//!
//! Everything that touches ESP-IDF lives in [`esp`] behind
//! `#[cfg(target_os = "espidf")]`; the rest builds and tests on the host.

#![warn(clippy::large_futures)]

pub use anyhow::bail;
pub use std::{pin::Pin, sync::atomic::Ordering, sync::Arc};
pub use tokio::time::{sleep, Duration, Instant};
pub use tracing::{debug, error, info, warn};

mod config;
pub use config::*;

mod platform;
pub use platform::*;

mod state;
pub use state::*;

mod camera;
pub use camera::*;

mod wifi;
pub use wifi::*;

mod scheduler;
pub use scheduler::*;

mod monitor;
pub use monitor::*;

mod apiserver;
pub use apiserver::*;

#[cfg(target_os = "espidf")]
pub mod esp;

// EOF
