//! The orchestrator every task loop talks to.
//!
//! `Astrolavos` owns the peer registry, the health snapshot, the latest
//! heading and the mode controller, and exposes the one public surface the
//! I/O loops use: sensor feeds push readings in, the radio loops pull
//! announcements out and push received ones in, and the render loop reads
//! everything to draw the 160x80 layout.
//!
//! Locking is coarse and short. Each accessor takes one lock, copies what
//! it needs, and releases before any await point; nothing here ever holds
//! a lock across I/O.

use core::cell::RefCell;
use core::fmt::Write;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String;
use log::{debug, info, warn};

use crate::config::{DEVICE_COUNT, FleetManifest};
use crate::display::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, DisplaySurface, TextSize};
use crate::error::Error;
use crate::geo::{self, GeoPosition, Heading, MAX_PLAUSIBLE_DISTANCE_M};
use crate::health::{HealthAggregator, HealthStatus, MagnetometerHealth};
use crate::message::{self, BroadcastMessage};
use crate::mode::{ModeController, OperatingMode, SleepProfile};
use crate::peers::{PeerRecord, PeerRegistry};

/// One peer row per small-font line.
const ROW_PITCH_PX: i32 = 10;

/// Want-to-meet banner row.
const BANNER_Y_PX: i32 = 60;

/// Battery/satellites/heading strip, bottom line of the panel.
const HEALTH_Y_PX: i32 = 70;

pub struct Astrolavos {
    registry: Mutex<CriticalSectionRawMutex, RefCell<PeerRegistry>>,
    health: HealthAggregator,
    heading: Mutex<CriticalSectionRawMutex, RefCell<Option<Heading>>>,
    mode: ModeController,
}

impl Astrolavos {
    pub const fn new() -> Self {
        Self {
            registry: Mutex::new(RefCell::new(PeerRegistry::new())),
            health: HealthAggregator::new(),
            heading: Mutex::new(RefCell::new(None)),
            mode: ModeController::new(),
        }
    }

    /// Load the fleet manifest and claim our own identity.
    ///
    /// Must run before any loop starts; everything else assumes the slots
    /// are configured.
    pub fn init(&self, manifest: &FleetManifest) -> Result<(), Error> {
        self.registry.lock(|registry| {
            let mut registry = registry.borrow_mut();
            for entry in manifest.entries {
                registry.configure(entry);
            }
            registry.set_self(manifest.own_id)
        })?;

        info!("Fleet configured, this device is id {}", manifest.own_id);
        Ok(())
    }

    // --- Sensor feeds ---

    /// Record a GNSS fix for this device, stamped with the local clock.
    pub fn update_own_position(
        &self,
        latitude: f32,
        longitude: f32,
        now: Instant,
    ) -> Result<(), Error> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || latitude < -90.0
            || latitude > 90.0
            || longitude < -180.0
            || longitude > 180.0
        {
            warn!("Rejecting implausible fix ({}, {})", latitude, longitude);
            return Err(Error::InvalidArgument);
        }

        self.registry.lock(|registry| {
            registry
                .borrow_mut()
                .record_own_position(GeoPosition::new(latitude, longitude, now))
        })
    }

    /// Record a magnetometer heading in degrees `[0, 360)`.
    ///
    /// Out-of-domain samples are rejected and never overwrite the last
    /// good heading.
    pub fn update_heading(&self, degrees: f32, now: Instant) -> Result<(), Error> {
        if !degrees.is_finite() || !(0.0..360.0).contains(&degrees) {
            warn!("Rejecting out-of-domain heading {}", degrees);
            return Err(Error::InvalidArgument);
        }

        self.heading.lock(|heading| {
            heading.borrow_mut().replace(Heading::new(degrees, now));
        });
        Ok(())
    }

    /// Latest accepted heading, if the magnetometer has produced one.
    pub fn heading(&self) -> Option<Heading> {
        self.heading.lock(|heading| *heading.borrow())
    }

    pub fn update_battery(&self, percent: Option<u8>, now: Instant) {
        self.health.set_battery(percent, now);
    }

    pub fn update_gnss_satellites(&self, satellites: Option<u8>, now: Instant) {
        self.health.set_gnss_satellites(satellites, now);
    }

    pub fn update_magnetometer(&self, state: MagnetometerHealth, now: Instant) {
        self.health.set_magnetometer(state, now);
    }

    pub fn health_snapshot(&self) -> HealthStatus {
        self.health.snapshot()
    }

    // --- Radio exchange ---

    /// Build the next announcement.
    ///
    /// Fails while the device has no identity yet; a tracker must never
    /// broadcast as somebody unknown. No fix is fine, the frame then
    /// carries the no-fix sentinel.
    pub fn construct_message(&self) -> Result<BroadcastMessage, Error> {
        self.registry.lock(|registry| {
            let registry = registry.borrow();
            let Some(self_id) = registry.self_id() else {
                warn!("Refusing to broadcast without an identity");
                return Err(Error::InvalidArgument);
            };
            let record = registry.lookup(self_id)?;
            Ok(BroadcastMessage::new(
                self_id,
                record.position.as_ref(),
                self.mode.want_to_meet(),
            ))
        })
    }

    /// Apply one received radio buffer.
    ///
    /// The buffer may coalesce several announcements; each unit is applied
    /// independently, and one bad unit only costs itself.
    pub fn handle_frame(&self, frame: &[u8], now: Instant) -> Result<(), Error> {
        let units = message::frame_units(frame).map_err(|err| {
            warn!("Dropping malformed radio buffer of {} bytes", frame.len());
            err
        })?;

        for unit in units {
            match BroadcastMessage::from_bytes(unit) {
                Ok(parsed) => self.apply_message(&parsed, now),
                Err(_) => warn!("Dropping frame unit with bad magic"),
            }
        }
        Ok(())
    }

    fn apply_message(&self, parsed: &BroadcastMessage, now: Instant) {
        self.registry.lock(|registry| {
            let mut registry = registry.borrow_mut();

            if registry.is_self(parsed.sender) {
                debug!("Ignoring our own echo (id {})", parsed.sender);
                return;
            }

            match registry.update(parsed.sender, parsed.position(), parsed.wants_to_meet, now) {
                Ok(()) => debug!(
                    "Peer {} updated, sender fix time {} us, wants_to_meet={}",
                    parsed.sender, parsed.timestamp_us, parsed.wants_to_meet
                ),
                Err(err) => warn!("Rejected announcement from id {}: {}", parsed.sender, err),
            }
        });
    }

    // --- Geometry queries ---

    /// Great-circle distance to a peer in meters.
    ///
    /// Anything beyond the plausible range reads as bogus peer data and is
    /// reported as [`Error::StaleOrImplausible`], not as a huge number.
    pub fn distance_to(&self, id: u8) -> Result<f32, Error> {
        let (own, peer) = self.position_pair(id)?;
        let meters = geo::haversine_distance(&own, &peer);
        if meters > MAX_PLAUSIBLE_DISTANCE_M {
            debug!("Peer {} is {} m away, beyond plausible range", id, meters);
            return Err(Error::StaleOrImplausible);
        }
        Ok(meters)
    }

    /// Initial great-circle bearing to a peer in degrees `[0, 360)`.
    pub fn bearing_to(&self, id: u8) -> Result<f32, Error> {
        let (own, peer) = self.position_pair(id)?;
        Ok(geo::initial_bearing(&own, &peer))
    }

    fn position_pair(&self, id: u8) -> Result<(GeoPosition, GeoPosition), Error> {
        self.registry.lock(|registry| {
            let registry = registry.borrow();

            let Some(self_id) = registry.self_id() else {
                return Err(Error::InvalidArgument);
            };
            let own = registry.lookup(self_id)?;
            let peer = registry.lookup(id)?;

            let own_position = own.position.ok_or(Error::InvalidArgument)?;
            let peer_position = peer.position.ok_or(Error::InvalidArgument)?;
            Ok((own_position, peer_position))
        })
    }

    // --- Mode ---

    /// Stage an isolation toggle from a button edge. Interrupt-safe.
    pub fn trigger_isolation(&self) {
        self.mode.trigger_isolation();
    }

    /// Stage a want-to-meet toggle from a button edge. Interrupt-safe.
    pub fn trigger_want_to_meet(&self) {
        self.mode.trigger_want_to_meet();
    }

    pub fn want_to_meet(&self) -> bool {
        self.mode.want_to_meet()
    }

    pub fn operating_mode(&self) -> OperatingMode {
        self.mode.mode()
    }

    pub fn is_isolation(&self) -> bool {
        self.mode.is_isolation()
    }

    pub fn sleep_profile(&self) -> &'static SleepProfile {
        self.mode.sleep_profile()
    }

    // --- Rendering ---

    /// Boot splash: color bands top and bottom, title and greeting in
    /// this device's fleet color.
    pub fn render_welcome<D: DisplaySurface>(&self, display: &mut D) -> Result<(), D::Error> {
        let own = self.self_record();
        let color = own.as_ref().map(|record| record.color).unwrap_or(Rgb565::WHITE);
        let band_height = TextSize::Large.char_height();

        display.clear()?;
        display.fill_rect(
            Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX, band_height)),
            color,
        )?;
        display.fill_rect(
            Rectangle::new(
                Point::new(0, (DISPLAY_HEIGHT_PX - band_height) as i32),
                Size::new(DISPLAY_WIDTH_PX, band_height),
            ),
            color,
        )?;

        display.write_text(
            Point::new(25, band_height as i32),
            "Astrolavos",
            TextSize::Large,
            color,
            Rgb565::BLACK,
        )?;

        if let Some(own) = own {
            let mut greeting: String<16> = String::new();
            write!(greeting, "Hey {}", own.name.as_str()).ok();
            display.write_text(
                Point::new(30, 2 * band_height as i32),
                &greeting,
                TextSize::Large,
                color,
                Rgb565::BLACK,
            )?;
        }
        Ok(())
    }

    /// Draw one full frame, servicing any staged button toggles first.
    ///
    /// In isolation mode the panel is off and this returns after the
    /// toggle bookkeeping without drawing.
    pub fn render_frame<D: DisplaySurface>(&self, display: &mut D) -> Result<(), D::Error> {
        if self.mode.take_meet_trigger() {
            let engaged = self.mode.toggle_want_to_meet();
            info!("Want-to-meet {}", if engaged { "on" } else { "off" });
        }

        if self.mode.take_isolation_trigger() {
            match self.mode.toggle_isolation() {
                OperatingMode::Isolation => {
                    info!("Entering isolation mode");
                    display.set_power(false)?;
                }
                OperatingMode::Normal => {
                    info!("Leaving isolation mode");
                    display.set_power(true)?;
                    display.clear()?;
                }
            }
        }

        if self.mode.is_isolation() {
            return Ok(());
        }

        self.render_peer_rows(display)?;
        self.render_meet_banner(display)?;
        self.render_health_bar(display)
    }

    /// One row per peer: name in fleet color, then distance and direction.
    ///
    /// Rows are keyed by id so every peer keeps a stable line. A peer that
    /// announces want-to-meet gets its name highlighted; a peer we cannot
    /// place falls back to "No Data".
    fn render_peer_rows<D: DisplaySurface>(&self, display: &mut D) -> Result<(), D::Error> {
        for id in 0..DEVICE_COUNT as u8 {
            let record = self.registry.lock(|registry| {
                let registry = registry.borrow();
                if registry.is_self(id) {
                    None
                } else {
                    registry.lookup(id).ok()
                }
            });
            let Some(record) = record else {
                continue;
            };

            let y = i32::from(id) * ROW_PITCH_PX;
            let name_background = if record.wants_to_meet {
                Rgb565::WHITE
            } else {
                Rgb565::BLACK
            };

            let mut line: String<32> = String::new();
            match (self.distance_to(id), self.bearing_to(id)) {
                (Ok(meters), Ok(bearing)) => {
                    let direction = match self.heading() {
                        Some(heading) => geo::octant(heading.degrees, bearing).abbreviation(),
                        None => "?",
                    };
                    write!(line, " {}m go {} ({})", meters as i32, direction, bearing as i32).ok();
                }
                _ => {
                    line.push_str(": No Data").ok();
                }
            }

            display.fill_rect(
                Rectangle::new(
                    Point::new(0, y),
                    Size::new(DISPLAY_WIDTH_PX, ROW_PITCH_PX as u32),
                ),
                Rgb565::BLACK,
            )?;
            display.write_text(
                Point::new(0, y),
                record.name.as_str(),
                TextSize::Small,
                record.color,
                name_background,
            )?;
            let x = (record.name.len() as u32 * TextSize::Small.char_width()) as i32;
            display.write_text(Point::new(x, y), &line, TextSize::Small, record.color, Rgb565::BLACK)?;
        }
        Ok(())
    }

    /// Our own want-to-meet state: colored blocks flanking the text so the
    /// row reads at a glance in this device's color.
    fn render_meet_banner<D: DisplaySurface>(&self, display: &mut D) -> Result<(), D::Error> {
        let row = Rectangle::new(
            Point::new(0, BANNER_Y_PX),
            Size::new(DISPLAY_WIDTH_PX, ROW_PITCH_PX as u32),
        );
        display.fill_rect(row, Rgb565::BLACK)?;

        if self.mode.want_to_meet() {
            let color = self.self_record().map(|own| own.color).unwrap_or(Rgb565::WHITE);
            let char_width = TextSize::Small.char_width();

            display.fill_rect(
                Rectangle::new(
                    Point::new(0, BANNER_Y_PX),
                    Size::new(3 * char_width, ROW_PITCH_PX as u32),
                ),
                color,
            )?;
            display.write_text(
                Point::new((4 * char_width) as i32, BANNER_Y_PX),
                "I Want To Meet",
                TextSize::Small,
                color,
                Rgb565::BLACK,
            )?;
            display.fill_rect(
                Rectangle::new(
                    Point::new((20 * char_width) as i32, BANNER_Y_PX),
                    Size::new(DISPLAY_WIDTH_PX - 20 * char_width, ROW_PITCH_PX as u32),
                ),
                color,
            )?;
        }
        Ok(())
    }

    /// Bottom strip: battery, satellite count, heading.
    ///
    /// Unknown values render as "xx" placeholders; a failed magnetometer
    /// replaces the heading segment entirely.
    fn render_health_bar<D: DisplaySurface>(&self, display: &mut D) -> Result<(), D::Error> {
        let health = self.health.snapshot();
        let mut line: String<32> = String::new();

        match health.battery.percent {
            Some(percent) => write!(line, "Bat:{}% ", percent).ok(),
            None => line.push_str("Bat:xx% ").ok(),
        };
        match health.gnss.satellites {
            Some(satellites) => write!(line, "Sat:{} ", satellites).ok(),
            None => line.push_str("Sat:xx ").ok(),
        };
        match health.magnetometer.state {
            MagnetometerHealth::Error => {
                line.push_str("Mag Failed").ok();
            }
            MagnetometerHealth::Uninitialized => {
                line.push_str("Hdg:---").ok();
            }
            MagnetometerHealth::Healthy => {
                match self.heading() {
                    Some(heading) => write!(line, "Hdg:{}", heading.degrees as i32).ok(),
                    None => line.push_str("Hdg:---").ok(),
                };
            }
        }

        display.fill_rect(
            Rectangle::new(
                Point::new(0, HEALTH_Y_PX),
                Size::new(DISPLAY_WIDTH_PX, ROW_PITCH_PX as u32),
            ),
            Rgb565::BLACK,
        )?;
        display.write_text(
            Point::new(0, HEALTH_Y_PX),
            &line,
            TextSize::Small,
            Rgb565::WHITE,
            Rgb565::BLACK,
        )
    }

    fn self_record(&self) -> Option<PeerRecord> {
        self.registry.lock(|registry| {
            let registry = registry.borrow();
            registry.self_id().and_then(|id| registry.lookup(id).ok())
        })
    }
}

impl Default for Astrolavos {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FLEET, FleetEntry};
    use crate::mode::{ISOLATION_PROFILE, NORMAL_PROFILE};

    struct TestSurface {
        powered: bool,
        power_changes: heapless::Vec<bool, 8>,
        fills: usize,
        texts: heapless::Vec<String<32>, 16>,
    }

    impl TestSurface {
        fn new() -> Self {
            Self {
                powered: true,
                power_changes: heapless::Vec::new(),
                fills: 0,
                texts: heapless::Vec::new(),
            }
        }

        fn saw_text(&self, needle: &str) -> bool {
            self.texts.iter().any(|text| text.contains(needle))
        }
    }

    impl DisplaySurface for TestSurface {
        type Error = core::convert::Infallible;

        fn fill_rect(&mut self, _area: Rectangle, _color: Rgb565) -> Result<(), Self::Error> {
            self.fills += 1;
            Ok(())
        }

        fn write_text(
            &mut self,
            _position: Point,
            text: &str,
            _size: TextSize,
            _foreground: Rgb565,
            _background: Rgb565,
        ) -> Result<(), Self::Error> {
            let mut copy: String<32> = String::new();
            copy.push_str(text).ok();
            self.texts.push(copy).ok();
            Ok(())
        }

        fn set_power(&mut self, on: bool) -> Result<(), Self::Error> {
            self.powered = on;
            self.power_changes.push(on).ok();
            Ok(())
        }
    }

    fn app() -> Astrolavos {
        let app = Astrolavos::new();
        app.init(&FleetManifest {
            own_id: 0,
            entries: &DEFAULT_FLEET,
        })
        .unwrap();
        app
    }

    fn peer_frame(sender: u8, latitude: f32, longitude: f32, wants: bool) -> [u8; 20] {
        let position = GeoPosition::new(latitude, longitude, Instant::from_secs(1));
        BroadcastMessage::new(sender, Some(&position), wants).to_bytes()
    }

    #[test]
    fn test_construct_requires_identity() {
        let app = Astrolavos::new();
        assert_eq!(app.construct_message().unwrap_err(), Error::InvalidArgument);

        let app = self::app();
        let message = app.construct_message().unwrap();
        assert_eq!(message.sender, 0);
        assert_eq!(message.position(), None);
    }

    #[test]
    fn test_construct_carries_fix_and_meet_flag() {
        let app = app();
        app.update_own_position(52.52, 13.405, Instant::from_secs(2)).unwrap();
        app.trigger_want_to_meet();

        let mut display = TestSurface::new();
        app.render_frame(&mut display).unwrap();

        let message = app.construct_message().unwrap();
        assert_eq!(message.position(), Some((52.52, 13.405)));
        assert!(message.wants_to_meet);
    }

    #[test]
    fn test_handle_frame_updates_peer() {
        let app = app();
        app.update_own_position(52.52, 13.405, Instant::from_secs(2)).unwrap();

        app.handle_frame(&peer_frame(1, 52.52, 13.415, false), Instant::from_secs(3))
            .unwrap();

        let meters = app.distance_to(1).unwrap();
        assert!(meters > 600.0 && meters < 760.0);
        let bearing = app.bearing_to(1).unwrap();
        assert!(bearing > 88.0 && bearing < 92.0);
    }

    #[test]
    fn test_own_echo_is_ignored() {
        let app = app();

        app.handle_frame(&peer_frame(0, 1.0, 1.0, true), Instant::from_secs(3))
            .unwrap();

        let own = app.self_record().unwrap();
        assert_eq!(own.position, None);
        assert!(!own.wants_to_meet);
    }

    #[test]
    fn test_distance_error_taxonomy() {
        static SHORT_FLEET: [FleetEntry; 2] = [
            FleetEntry { id: 0, name: "Maria", color: Rgb565::RED },
            FleetEntry { id: 1, name: "Niko", color: Rgb565::GREEN },
        ];

        let app = Astrolavos::new();
        app.init(&FleetManifest { own_id: 0, entries: &SHORT_FLEET }).unwrap();
        app.update_own_position(52.52, 13.405, Instant::from_secs(2)).unwrap();

        // Out of the identity range entirely.
        assert_eq!(app.distance_to(200).unwrap_err(), Error::InvalidArgument);
        // In range but never configured.
        assert_eq!(app.distance_to(3).unwrap_err(), Error::NotFound);
        // Configured but never heard from.
        assert_eq!(app.distance_to(1).unwrap_err(), Error::InvalidArgument);
    }

    #[test]
    fn test_far_peer_reads_as_implausible() {
        let app = app();
        app.update_own_position(52.52, 13.405, Instant::from_secs(2)).unwrap();

        // Roughly Munich, several hundred km away.
        app.handle_frame(&peer_frame(1, 48.14, 11.58, false), Instant::from_secs(3))
            .unwrap();

        assert_eq!(app.distance_to(1).unwrap_err(), Error::StaleOrImplausible);
        // Bearing has no plausibility cap.
        assert!(app.bearing_to(1).is_ok());
    }

    #[test]
    fn test_heading_domain() {
        let app = app();

        assert!(app.update_heading(f32::NAN, Instant::from_secs(1)).is_err());
        assert!(app.update_heading(360.0, Instant::from_secs(1)).is_err());
        assert!(app.update_heading(-0.1, Instant::from_secs(1)).is_err());
        assert_eq!(app.heading(), None);

        app.update_heading(123.0, Instant::from_secs(1)).unwrap();
        assert_eq!(app.heading().map(|heading| heading.degrees), Some(123.0));

        // A bad sample never clobbers the last good one.
        assert!(app.update_heading(400.0, Instant::from_secs(2)).is_err());
        assert_eq!(app.heading().map(|heading| heading.degrees), Some(123.0));
    }

    #[test]
    fn test_own_position_domain() {
        let app = app();
        let now = Instant::from_secs(1);

        assert!(app.update_own_position(91.0, 0.0, now).is_err());
        assert!(app.update_own_position(0.0, -180.5, now).is_err());
        assert!(app.update_own_position(f32::NAN, 0.0, now).is_err());
        assert!(app.update_own_position(52.52, 13.405, now).is_ok());
    }

    #[test]
    fn test_isolation_toggle_swaps_profile_and_display_power() {
        let app = app();
        let mut display = TestSurface::new();

        app.trigger_isolation();
        app.render_frame(&mut display).unwrap();
        assert!(app.is_isolation());
        assert_eq!(app.sleep_profile(), &ISOLATION_PROFILE);
        assert!(!display.powered);

        app.trigger_isolation();
        app.render_frame(&mut display).unwrap();
        assert!(!app.is_isolation());
        assert_eq!(app.sleep_profile(), &NORMAL_PROFILE);
        assert!(display.powered);

        assert_eq!(display.power_changes.as_slice(), &[false, true]);
    }

    #[test]
    fn test_isolation_frame_draws_nothing() {
        let app = app();
        let mut display = TestSurface::new();

        app.trigger_isolation();
        app.render_frame(&mut display).unwrap();
        display.texts.clear();

        app.render_frame(&mut display).unwrap();
        assert!(display.texts.is_empty());
        assert_eq!(display.fills, 0);
    }

    #[test]
    fn test_welcome_greets_by_name() {
        let app = app();
        let mut display = TestSurface::new();

        app.render_welcome(&mut display).unwrap();

        assert!(display.saw_text("Astrolavos"));
        assert!(display.saw_text("Hey Maria"));
    }

    #[test]
    fn test_render_rows_and_health_placeholders() {
        let app = app();
        let mut display = TestSurface::new();

        app.render_frame(&mut display).unwrap();

        // Peers are configured but unheard: names with "No Data" rows.
        assert!(display.saw_text("Niko"));
        assert!(display.saw_text("No Data"));
        // Health strip renders placeholders, not silence.
        assert!(display.saw_text("Bat:xx%"));
        assert!(display.saw_text("Hdg:---"));
        // Our own name is not a peer row.
        assert!(!display.saw_text("Maria"));
    }

    #[test]
    fn test_render_peer_with_fix_and_banner() {
        let app = app();
        let mut display = TestSurface::new();

        app.update_own_position(52.52, 13.405, Instant::from_secs(2)).unwrap();
        app.update_heading(0.0, Instant::from_secs(2)).unwrap();
        app.handle_frame(&peer_frame(1, 52.52, 13.415, false), Instant::from_secs(3))
            .unwrap();
        app.trigger_want_to_meet();

        app.render_frame(&mut display).unwrap();

        assert!(display.saw_text("go R ("));
        assert!(display.saw_text("I Want To Meet"));
    }

    #[test]
    fn test_mag_failure_replaces_heading_segment() {
        let app = app();
        let mut display = TestSurface::new();

        app.update_heading(45.0, Instant::from_secs(1)).unwrap();
        app.update_magnetometer(MagnetometerHealth::Error, Instant::from_secs(2));

        app.render_frame(&mut display).unwrap();

        assert!(display.saw_text("Mag Failed"));
        assert!(!display.saw_text("Hdg:"));
    }
}
