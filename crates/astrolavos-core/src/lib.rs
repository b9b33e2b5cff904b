//! Hardware-independent core library for Astrolavos.
//!
//! This crate contains all platform-agnostic logic for the Astrolavos
//! handheld group tracker: the peer registry, geometry, health snapshot,
//! operating modes, the broadcast wire format, the 160x80 layout and the
//! task loops that tie them together.
//!
//! It is `#![no_std]` so it compiles on the embedded target and on desktop
//! hosts (for the simulator and tests). Firmware and simulator provide the
//! two hardware seams, [`display::DisplaySurface`] and
//! [`radio::RadioTransport`], and spawn the loops in [`tasks`].

#![no_std]
#![allow(async_fn_in_trait)] // Traits are consumed in-crate, never boxed

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod geo;
pub mod health;
pub mod message;
pub mod mode;
pub mod peers;
pub mod radio;
pub mod tasks;
