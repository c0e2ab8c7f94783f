use std::time::Duration;

pub use dmg_core::ppu::{GB_HEIGHT, GB_WIDTH};

pub const TARGET_FPS: u32 = 60;
pub const TARGET_FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000u64 / TARGET_FPS as u64);

/// How much to scale the native 160x144 framebuffer up for display.
pub const SCALE_FACTOR: u32 = 4;
pub const WINDOW_WIDTH: u32 = GB_WIDTH as u32 * SCALE_FACTOR;
pub const WINDOW_HEIGHT: u32 = GB_HEIGHT as u32 * SCALE_FACTOR;
