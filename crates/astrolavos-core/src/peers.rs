//! Fixed-size registry of fleet devices.
//!
//! One slot per possible identity, the own device included; ids index the
//! arena directly. Slots are configured once from the fleet manifest and
//! never evicted. Position data only moves forward: a no-fix report from a
//! peer keeps the last known fix.

use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;
use heapless::String;
use log::warn;

use crate::config::{DEVICE_COUNT, FleetEntry, MAX_NAME_LEN};
use crate::error::Error;
use crate::geo::GeoPosition;

/// A position older than this is advisory-stale. Nothing evicts it; the
/// flag is for consumers that care about freshness.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// State tracked for one fleet device.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub active: bool,
    pub name: String<MAX_NAME_LEN>,
    pub color: Rgb565,
    /// Last known fix, stamped with the local receive/observe time.
    pub position: Option<GeoPosition>,
    pub wants_to_meet: bool,
}

impl PeerRecord {
    const EMPTY: Self = Self {
        active: false,
        name: String::new(),
        color: Rgb565::BLACK,
        position: None,
        wants_to_meet: false,
    };

    /// True when the record has no fix or the fix is older than
    /// [`STALE_AFTER`] relative to `now`.
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.position {
            None => true,
            Some(p) => {
                now.as_micros().saturating_sub(p.timestamp.as_micros()) > STALE_AFTER.as_micros()
            }
        }
    }
}

/// Identity-indexed arena of [`PeerRecord`]s.
pub struct PeerRegistry {
    slots: [PeerRecord; DEVICE_COUNT],
    self_id: Option<u8>,
}

impl PeerRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [PeerRecord::EMPTY; DEVICE_COUNT],
            self_id: None,
        }
    }

    /// Activate the slot for one manifest entry.
    ///
    /// Entries whose id falls outside the arena are dropped with a log,
    /// never an error: a larger manifest on a smaller build is a config
    /// mistake, not a runtime failure. Names are truncated to fit.
    pub fn configure(&mut self, entry: &FleetEntry) {
        let Some(slot) = self.slots.get_mut(entry.id as usize) else {
            warn!(
                "too many devices configured, dropping id {} ({})",
                entry.id, entry.name
            );
            return;
        };

        let mut name: String<MAX_NAME_LEN> = String::new();
        for c in entry.name.chars() {
            if name.push(c).is_err() {
                warn!(
                    "device {} name '{}' is too long, truncating to '{}'",
                    entry.id, entry.name, name
                );
                break;
            }
        }

        *slot = PeerRecord {
            active: true,
            name,
            color: entry.color,
            position: None,
            wants_to_meet: false,
        };
    }

    /// Mark which configured slot is this device. Fails when the manifest
    /// never configured that id.
    pub fn set_self(&mut self, id: u8) -> Result<(), Error> {
        match self.slots.get(id as usize) {
            Some(slot) if slot.active => {
                self.self_id = Some(id);
                Ok(())
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    pub fn self_id(&self) -> Option<u8> {
        self.self_id
    }

    pub fn is_self(&self, id: u8) -> bool {
        self.self_id == Some(id)
    }

    /// Apply a received peer report.
    ///
    /// A `Some` position is stamped with the local `now` (the sender's
    /// clock is never trusted for staleness); `None` keeps whatever fix is
    /// already stored. The want-to-meet flag always follows the report.
    pub fn update(
        &mut self,
        id: u8,
        position: Option<(f32, f32)>,
        wants_to_meet: bool,
        now: Instant,
    ) -> Result<(), Error> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::InvalidArgument)?;
        if !slot.active {
            return Err(Error::NotFound);
        }

        if let Some((latitude, longitude)) = position {
            slot.position = Some(GeoPosition::new(latitude, longitude, now));
        }
        slot.wants_to_meet = wants_to_meet;
        Ok(())
    }

    /// Overwrite the own slot's fix from the local GNSS.
    pub fn record_own_position(&mut self, position: GeoPosition) -> Result<(), Error> {
        let id = self.self_id.ok_or(Error::InvalidArgument)?;
        // set_self guarantees the slot exists and is active.
        self.slots[id as usize].position = Some(position);
        Ok(())
    }

    /// Snapshot one record by identity.
    pub fn lookup(&self, id: u8) -> Result<PeerRecord, Error> {
        let slot = self.slots.get(id as usize).ok_or(Error::InvalidArgument)?;
        if !slot.active {
            return Err(Error::NotFound);
        }
        Ok(slot.clone())
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
