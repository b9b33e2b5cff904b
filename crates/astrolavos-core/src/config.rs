//! Compile-time fleet configuration.
//!
//! A tracker fleet is a fixed set of devices that all ship the same
//! manifest; only `own_id` differs per build. There is no runtime pairing.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

/// Number of identity slots in a fleet. Device ids live in
/// `[0, DEVICE_COUNT)`.
pub const DEVICE_COUNT: usize = 4;

/// Widest name the 160 px panel leaves room for next to the range text.
pub const MAX_NAME_LEN: usize = 5;

/// One device in the fleet manifest.
#[derive(Debug, Clone, Copy)]
pub struct FleetEntry {
    pub id: u8,
    /// Display name; truncated to [`MAX_NAME_LEN`] characters on configure.
    pub name: &'static str,
    /// Color used for this device's row and banner.
    pub color: Rgb565,
}

/// The full manifest a device boots with: every fleet member (self
/// included) plus which entry is this device.
#[derive(Debug, Clone, Copy)]
pub struct FleetManifest {
    pub own_id: u8,
    pub entries: &'static [FleetEntry],
}

/// Stock four-device crew. Firmware builds override this table; the
/// simulator uses it as-is.
pub static DEFAULT_FLEET: [FleetEntry; DEVICE_COUNT] = [
    FleetEntry {
        id: 0,
        name: "Maria",
        color: Rgb565::RED,
    },
    FleetEntry {
        id: 1,
        name: "Niko",
        color: Rgb565::GREEN,
    },
    FleetEntry {
        id: 2,
        name: "Eleni",
        color: Rgb565::YELLOW,
    },
    FleetEntry {
        id: 3,
        name: "Fotis",
        color: Rgb565::CYAN,
    },
];
