//! The periodic loops the executor runs.
//!
//! Each loop owns its own cadence, re-read from the active sleep profile
//! every iteration so a mode toggle takes effect on the next wake without
//! any cross-task signalling. None of them ever returns; a radio loop that
//! cannot bring the hardware up parks itself and leaves the rest of the
//! device running.

use embassy_time::{Duration, Instant, Timer};
use log::{error, warn};
use rand_core::{RngCore, SeedableRng};
use rand_wyrand::WyRand;

use crate::app::Astrolavos;
use crate::display::DisplaySurface;
use crate::radio::{RX_BUFFER_SIZE, RadioLink, RadioTransport};

/// Upper bound of the random delay added to every announcement period.
///
/// Fleet devices run free-running clocks with identical periods; without
/// jitter two of them can lock into colliding transmissions indefinitely.
/// This is the only collision avoidance on the channel.
pub const MAX_TX_JITTER_MS: u64 = 2000;

/// How long the boot splash stays up before live data replaces it.
const WELCOME_HOLD: Duration = Duration::from_secs(3);

/// Draw the welcome screen, then redraw the live layout forever.
pub async fn render_loop<D: DisplaySurface>(app: &Astrolavos, display: &mut D) -> ! {
    if let Err(err) = app.render_welcome(display) {
        warn!("Welcome screen failed: {:?}", err);
    }
    Timer::after(WELCOME_HOLD).await;
    if let Err(err) = display.clear() {
        warn!("Display clear failed: {:?}", err);
    }

    loop {
        if let Err(err) = app.render_frame(display) {
            warn!("Frame render failed: {:?}", err);
        }
        Timer::after(app.sleep_profile().main_refresh).await;
    }
}

/// Broadcast our announcement on the configured cadence plus jitter.
pub async fn radio_tx_loop<R: RadioTransport>(
    app: &Astrolavos,
    link: &RadioLink<R>,
    rng_seed: u64,
) -> ! {
    if link.ensure_init().await.is_err() {
        park("transmit").await;
    }
    let mut rng = WyRand::seed_from_u64(rng_seed);

    loop {
        match app.construct_message() {
            Ok(message) => {
                if let Err(err) = link.send_frame(&message.to_bytes()).await {
                    warn!("Announcement transmit failed: {}", err);
                }
            }
            Err(err) => warn!("Skipping announcement: {}", err),
        }

        Timer::after(app.sleep_profile().lora_tx + tx_jitter(&mut rng)).await;
    }
}

/// Listen for announcements and feed them into the registry.
pub async fn radio_rx_loop<R: RadioTransport>(app: &Astrolavos, link: &RadioLink<R>) -> ! {
    if link.ensure_init().await.is_err() {
        park("receive").await;
    }
    let mut buffer = [0u8; RX_BUFFER_SIZE];

    loop {
        match link.receive_frame(&mut buffer).await {
            Ok(0) => {}
            Ok(received) => {
                // Rejections are logged inside; a bad buffer costs nothing.
                app.handle_frame(&buffer[..received], Instant::now()).ok();
            }
            Err(err) => warn!("Receive window failed: {}", err),
        }

        Timer::after(app.sleep_profile().lora_rx).await;
    }
}

fn tx_jitter(rng: &mut WyRand) -> Duration {
    Duration::from_millis(rng.next_u64() % MAX_TX_JITTER_MS)
}

/// Suspend a radio loop for good. Radio failure is terminal for the two
/// radio loops but must never take down the sensor feeds or the display.
async fn park(which: &str) -> ! {
    error!("Radio {} loop parked after init failure", which);
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
