//! Radio transport seam and the shared link around it.
//!
//! The core never talks to a concrete LoRa chip. Firmware implements
//! [`RadioTransport`] over its driver, the simulator implements it over a
//! channel, and both hand the transport to a [`RadioLink`] that the send
//! and receive loops share. The link owns the one-time bring-up: the first
//! loop to run performs init, and a failed init is terminal so both loops
//! can park instead of hammering dead hardware.

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use log::{error, info, warn};

use crate::error::Error;

/// Receive scratch size. Generous for 20-byte announcements so a burst of
/// coalesced frames still lands in one read.
pub const RX_BUFFER_SIZE: usize = 1024;

/// Async interface to whatever carries the announcements.
pub trait RadioTransport {
    type Error: core::fmt::Debug;

    /// Bring the hardware up. Called once, before any send or receive.
    async fn init(&mut self) -> Result<(), Self::Error>;

    /// Transmit one buffer as a single frame.
    async fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Wait out one receive window and copy anything heard into `buffer`.
    ///
    /// Returns the number of bytes written; 0 means the window closed with
    /// nothing on the air, which is not an error.
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
}

const STATE_UNINIT: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_FAILED: u8 = 2;

/// Shared handle over one radio transport.
///
/// The transmit and receive loops both hold `&'static RadioLink` and never
/// touch the transport outside the internal mutex, mirroring how the chip
/// itself can only do one thing at a time.
pub struct RadioLink<R> {
    transport: Mutex<CriticalSectionRawMutex, R>,
    state: AtomicU8,
}

impl<R: RadioTransport> RadioLink<R> {
    pub const fn new(transport: R) -> Self {
        Self {
            transport: Mutex::new(transport),
            state: AtomicU8::new(STATE_UNINIT),
        }
    }

    /// Bring the radio up exactly once.
    ///
    /// Whichever loop gets here first performs the real init; the loser of
    /// the race re-checks under the lock and inherits the outcome. A failed
    /// init sticks, so every later call returns [`Error::TransportFailure`]
    /// without retrying.
    pub async fn ensure_init(&self) -> Result<(), Error> {
        match self.state.load(Ordering::Acquire) {
            STATE_READY => return Ok(()),
            STATE_FAILED => return Err(Error::TransportFailure),
            _ => {}
        }

        let mut transport = self.transport.lock().await;

        // Re-check under the lock; the other loop may have won the race.
        match self.state.load(Ordering::Acquire) {
            STATE_READY => return Ok(()),
            STATE_FAILED => return Err(Error::TransportFailure),
            _ => {}
        }

        match transport.init().await {
            Ok(()) => {
                info!("Radio initialized");
                self.state.store(STATE_READY, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                error!("Radio init failed: {:?}", err);
                self.state.store(STATE_FAILED, Ordering::Release);
                Err(Error::TransportFailure)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_READY
    }

    /// Transmit one frame through the shared transport.
    pub async fn send_frame(&self, frame: &[u8]) -> Result<(), Error> {
        if !self.is_ready() {
            return Err(Error::TransportFailure);
        }

        let mut transport = self.transport.lock().await;
        transport.send(frame).await.map_err(|err| {
            warn!("Radio send failed: {:?}", err);
            Error::TransportFailure
        })
    }

    /// Run one receive window through the shared transport.
    pub async fn receive_frame(&self, buffer: &mut [u8]) -> Result<usize, Error> {
        if !self.is_ready() {
            return Err(Error::TransportFailure);
        }

        let mut transport = self.transport.lock().await;
        transport.receive(buffer).await.map_err(|err| {
            warn!("Radio receive failed: {:?}", err);
            Error::TransportFailure
        })
    }
}
