//! Own-device health aggregation.
//!
//! Producers (battery monitor, GNSS driver, magnetometer driver) push
//! observations from their own loops; the renderer reads a consistent
//! snapshot. One coarse lock guards the whole struct; critical sections
//! are a few loads and stores, never held across an await.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use log::error;

/// Receiver channel limit; satellite counts above this are sensor noise.
pub const MAX_SATELLITES: u8 = 96;

/// Magnetometer driver state as reported by its feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetometerHealth {
    Healthy,
    Error,
    Uninitialized,
}

#[derive(Debug, Clone, Copy)]
pub struct BatteryStatus {
    /// Charge percentage; `None` when unknown.
    pub percent: Option<u8>,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct GnssStatus {
    /// Satellites in view; `None` while there is no fix.
    pub satellites: Option<u8>,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct MagnetometerStatus {
    pub state: MagnetometerHealth,
    pub timestamp: Instant,
}

/// Snapshot of every health leg.
#[derive(Debug, Clone, Copy)]
pub struct HealthStatus {
    pub battery: BatteryStatus,
    pub gnss: GnssStatus,
    pub magnetometer: MagnetometerStatus,
}

impl HealthStatus {
    const fn unknown() -> Self {
        Self {
            battery: BatteryStatus {
                percent: None,
                timestamp: Instant::from_ticks(0),
            },
            gnss: GnssStatus {
                satellites: None,
                timestamp: Instant::from_ticks(0),
            },
            magnetometer: MagnetometerStatus {
                state: MagnetometerHealth::Uninitialized,
                timestamp: Instant::from_ticks(0),
            },
        }
    }
}

/// Shared aggregator for the three health legs.
pub struct HealthAggregator {
    inner: Mutex<CriticalSectionRawMutex, RefCell<HealthStatus>>,
}

impl HealthAggregator {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(HealthStatus::unknown())),
        }
    }

    /// Record a battery report. Percentages over 100 are logged and stored
    /// as unknown rather than propagated.
    pub fn set_battery(&self, percent: Option<u8>, now: Instant) {
        let percent = match percent {
            Some(p) if p > 100 => {
                error!("battery report {}% out of range, storing unknown", p);
                None
            }
            other => other,
        };
        self.inner.lock(|status| {
            status.borrow_mut().battery = BatteryStatus {
                percent,
                timestamp: now,
            };
        });
    }

    /// Record a satellites-in-view report. `None` means no fix; counts
    /// above [`MAX_SATELLITES`] are logged and stored as no fix.
    pub fn set_gnss_satellites(&self, satellites: Option<u8>, now: Instant) {
        let satellites = match satellites {
            Some(s) if s > MAX_SATELLITES => {
                error!("satellite count {} exceeds receiver limit, storing no fix", s);
                None
            }
            other => other,
        };
        self.inner.lock(|status| {
            status.borrow_mut().gnss = GnssStatus {
                satellites,
                timestamp: now,
            };
        });
    }

    pub fn set_magnetometer(&self, state: MagnetometerHealth, now: Instant) {
        self.inner.lock(|status| {
            status.borrow_mut().magnetometer = MagnetometerStatus {
                state,
                timestamp: now,
            };
        });
    }

    /// Consistent copy of all three legs for rendering.
    pub fn snapshot(&self) -> HealthStatus {
        self.inner.lock(|status| *status.borrow())
    }
}

impl Default for HealthAggregator {
    fn default() -> Self {
        Self::new()
    }
}
