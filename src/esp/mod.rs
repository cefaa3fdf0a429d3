// esp/mod.rs
//! ESP-IDF implementations of the hardware seams.

mod board;
pub use board::*;

mod espcam;
pub use espcam::*;

// EOF
