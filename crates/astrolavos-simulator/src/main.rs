//! Desktop simulator for the Astrolavos group tracker.
//!
//! Runs the real core task loops (render, radio TX/RX) on the std executor
//! against simulated hardware: a logging display surface, a channel-backed
//! radio and synthetic GNSS/magnetometer/battery feeds. A crew simulator
//! injects announcements from the other fleet devices through the actual
//! wire codec, so the full receive path (parse, registry, geometry, layout)
//! runs exactly as on the device.
//!
//! The display is rendered as log lines. Run with `RUST_LOG=debug` to also
//! see rectangle fills, LED blinks and dropped frames; the default level
//! is info.

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info, warn};
use rand_core::{RngCore, SeedableRng};
use rand_wyrand::WyRand;

use astrolavos_core::app::Astrolavos;
use astrolavos_core::config::{DEFAULT_FLEET, DEVICE_COUNT, FleetManifest};
use astrolavos_core::display::{DisplaySurface, TextSize};
use astrolavos_core::geo::GeoPosition;
use astrolavos_core::health::MagnetometerHealth;
use astrolavos_core::message::BroadcastMessage;
use astrolavos_core::radio::{RadioLink, RadioTransport};
use astrolavos_core::tasks;

// ---------------------------------------------------------------------------
// Simulated fleet
// ---------------------------------------------------------------------------

/// Which manifest entry this simulated device runs as.
const OWN_ID: u8 = 0;

/// Where the simulated hike takes place.
const BASE_LATITUDE: f32 = 52.5205;
const BASE_LONGITUDE: f32 = 13.4049;

/// Meter-to-degree factors near the base latitude, for peer offsets.
const METERS_TO_DEGREES_LAT: f32 = 1.0 / 111_000.0;
const METERS_TO_DEGREES_LON: f32 = 0.000_014_76;

/// How far simulated peers wander from us, in meters.
const PEER_MAX_OFFSET_M: f32 = 5000.0;

/// One radio frame in flight. Large enough for a few coalesced units.
type Frame = heapless::Vec<u8, 64>;

static APP: Astrolavos = Astrolavos::new();
static AIRWAVES: Channel<CriticalSectionRawMutex, Frame, 8> = Channel::new();
static RADIO: RadioLink<SimRadio> = RadioLink::new(SimRadio);

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// Radio over a local channel. Transmissions have no listener (the crew
/// simulator fabricates inbound traffic instead), so `send` only logs.
struct SimRadio;

impl RadioTransport for SimRadio {
    type Error = core::convert::Infallible;

    async fn init(&mut self) -> Result<(), Self::Error> {
        info!("[radio] simulated radio up");
        Ok(())
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        debug!("[radio] tx {} bytes", frame.len());
        Ok(())
    }

    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let frame = AIRWAVES.receive().await;
        let n = frame.len().min(buffer.len());
        buffer[..n].copy_from_slice(&frame[..n]);
        Ok(n)
    }
}

/// Display surface that prints the layout instead of driving a panel.
struct TermDisplay {
    powered: bool,
}

impl TermDisplay {
    fn new() -> Self {
        Self { powered: true }
    }
}

impl DisplaySurface for TermDisplay {
    type Error = core::convert::Infallible;

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        debug!(
            "[display] fill ({:>3},{:>2}) {}x{} {:?}",
            area.top_left.x, area.top_left.y, area.size.width, area.size.height, color
        );
        Ok(())
    }

    fn write_text(
        &mut self,
        position: Point,
        text: &str,
        _size: TextSize,
        _foreground: Rgb565,
        _background: Rgb565,
    ) -> Result<(), Self::Error> {
        info!("[display] ({:>3},{:>2}) {}", position.x, position.y, text);
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), Self::Error> {
        self.powered = on;
        info!("[display] panel {}", if on { "on" } else { "off" });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task wrappers (the executor cannot spawn generic functions)
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn render_task() {
    let mut display = TermDisplay::new();
    tasks::render_loop(&APP, &mut display).await
}

#[embassy_executor::task]
async fn radio_tx_task(rng_seed: u64) {
    tasks::radio_tx_loop(&APP, &RADIO, rng_seed).await
}

#[embassy_executor::task]
async fn radio_rx_task() {
    tasks::radio_rx_loop(&APP, &RADIO).await
}

// ---------------------------------------------------------------------------
// Synthetic sensor feeds
// ---------------------------------------------------------------------------

/// Random walk around the base coordinates plus a wandering satellite count.
#[embassy_executor::task]
async fn gnss_feed_task() {
    let mut rng = WyRand::seed_from_u64(0x6E55);
    let mut latitude = BASE_LATITUDE;
    let mut longitude = BASE_LONGITUDE;

    loop {
        // Steps of a few meters per sample.
        latitude += centered(&mut rng) * 10.0 * METERS_TO_DEGREES_LAT;
        longitude += centered(&mut rng) * 10.0 * METERS_TO_DEGREES_LON;

        let now = Instant::now();
        APP.update_own_position(latitude, longitude, now).ok();
        let satellites = 5 + (rng.next_u64() % 8) as u8;
        APP.update_gnss_satellites(Some(satellites), now);

        Timer::after(APP.sleep_profile().heading).await;
    }
}

/// Slowly sweeping heading, with occasional sensor failure episodes so the
/// health bar's "Mag Failed" path gets exercised.
#[embassy_executor::task]
async fn magnetometer_feed_task() {
    let mut rng = WyRand::seed_from_u64(0x3A61);
    let mut degrees = 0.0f32;

    loop {
        let now = Instant::now();
        if rng.next_u64() % 20 == 0 {
            APP.update_magnetometer(MagnetometerHealth::Error, now);
        } else {
            APP.update_magnetometer(MagnetometerHealth::Healthy, now);
            APP.update_heading(degrees, now).ok();
        }

        degrees = (degrees + 7.0) % 360.0;
        Timer::after(APP.sleep_profile().heading).await;
    }
}

/// Battery drains one percent per poll.
#[embassy_executor::task]
async fn battery_feed_task() {
    let mut percent: u8 = 100;

    loop {
        APP.update_battery(Some(percent), Instant::now());
        percent = percent.saturating_sub(1);
        Timer::after(APP.sleep_profile().battery).await;
    }
}

/// Status LED stand-in, blinking on the profile cadence.
#[embassy_executor::task]
async fn status_led_task() {
    let mut lit = false;

    loop {
        lit = !lit;
        debug!("[led] {}", if lit { "on" } else { "off" });
        Timer::after(APP.sleep_profile().blink).await;
    }
}

// ---------------------------------------------------------------------------
// Crew traffic and buttons
// ---------------------------------------------------------------------------

/// Fabricates announcements from the rest of the fleet.
///
/// Waits until we have a fix, then keeps placing random peers within
/// [`PEER_MAX_OFFSET_M`] of us, at a 2.0 to 5.5 s cadence with a 25 %
/// want-to-meet rate. Every few frames it coalesces two announcements into
/// one buffer, and rarely it emits our own id back or corrupts the magic,
/// so the reject paths show up in the logs too.
#[embassy_executor::task]
async fn crew_simulator_task() {
    let mut rng = WyRand::seed_from_u64(0xC4E0);

    loop {
        let own_fix = APP.construct_message().ok().and_then(|message| message.position());
        let Some((own_latitude, own_longitude)) = own_fix else {
            debug!("[crew] waiting for our own fix");
            Timer::after(Duration::from_millis(2000)).await;
            continue;
        };

        let mut frame = Frame::new();
        push_announcement(&mut frame, &mut rng, own_latitude, own_longitude);
        if rng.next_u64() % 8 == 0 {
            push_announcement(&mut frame, &mut rng, own_latitude, own_longitude);
        }
        if rng.next_u64() % 16 == 0 {
            frame[0] ^= 0xFF;
        }

        if AIRWAVES.try_send(frame).is_err() {
            debug!("[crew] airwaves full, frame lost");
        }

        let pause = 2000 + rng.next_u64() % 3501;
        Timer::after(Duration::from_millis(pause)).await;
    }
}

fn push_announcement(frame: &mut Frame, rng: &mut WyRand, own_latitude: f32, own_longitude: f32) {
    // Mostly other devices; our own id now and then to exercise the echo drop.
    let sender = if rng.next_u64() % 12 == 0 {
        OWN_ID
    } else {
        let mut candidate = OWN_ID;
        while candidate == OWN_ID {
            candidate = (rng.next_u64() % DEVICE_COUNT as u64) as u8;
        }
        candidate
    };

    let latitude = own_latitude + centered(rng) * 2.0 * PEER_MAX_OFFSET_M * METERS_TO_DEGREES_LAT;
    let longitude = own_longitude + centered(rng) * 2.0 * PEER_MAX_OFFSET_M * METERS_TO_DEGREES_LON;
    let wants_to_meet = rng.next_u64() % 4 == 0;

    let position = GeoPosition::new(latitude, longitude, Instant::now());
    let message = BroadcastMessage::new(sender, Some(&position), wants_to_meet);
    if frame.extend_from_slice(&message.to_bytes()).is_err() {
        warn!("[crew] frame buffer full, unit dropped");
    }
}

/// Scripted button presses: want-to-meet toggles, then an isolation dip.
#[embassy_executor::task]
async fn button_script_task() {
    loop {
        Timer::after(Duration::from_secs(20)).await;
        info!("[buttons] want-to-meet pressed");
        APP.trigger_want_to_meet();

        Timer::after(Duration::from_secs(25)).await;
        info!("[buttons] isolation pressed");
        APP.trigger_isolation();

        Timer::after(Duration::from_secs(15)).await;
        info!("[buttons] isolation pressed");
        APP.trigger_isolation();
    }
}

/// Uniform in [-0.5, 0.5].
fn centered(rng: &mut WyRand) -> f32 {
    (rng.next_u64() % 4096) as f32 / 4096.0 - 0.5
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting Astrolavos simulator as fleet id {}", OWN_ID);

    APP.init(&FleetManifest {
        own_id: OWN_ID,
        entries: &DEFAULT_FLEET,
    })
    .expect("default fleet manifest is valid");

    spawner.spawn(render_task()).unwrap();
    spawner.spawn(radio_rx_task()).unwrap();
    spawner.spawn(radio_tx_task(0x51ED)).unwrap();
    spawner.spawn(gnss_feed_task()).unwrap();
    spawner.spawn(magnetometer_feed_task()).unwrap();
    spawner.spawn(battery_feed_task()).unwrap();
    spawner.spawn(status_led_task()).unwrap();
    spawner.spawn(crew_simulator_task()).unwrap();
    spawner.spawn(button_script_task()).unwrap();
}
