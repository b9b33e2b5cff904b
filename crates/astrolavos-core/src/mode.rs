//! Operating modes and their wake cadences.
//!
//! The device runs in one of two modes. Normal keeps the display and the
//! radio lively; isolation powers the panel down and stretches every
//! period so the battery lasts a multi-day hike. Button presses arrive
//! from interrupt context, so mode changes are staged as pending trigger
//! flags and serviced by the render loop on its next pass.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::Duration;

/// Power posture of the whole device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Normal,
    Isolation,
}

/// Wake periods for every recurring task, selected per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepProfile {
    /// Heading sampling period.
    pub heading: Duration,
    /// Full display redraw period.
    pub main_refresh: Duration,
    /// Battery gauge poll period.
    pub battery: Duration,
    /// Status LED blink period.
    pub blink: Duration,
    /// Pause between radio receive windows.
    pub lora_rx: Duration,
    /// Base pause between announcements, before jitter.
    pub lora_tx: Duration,
}

/// Cadences while the crew is actively navigating.
pub static NORMAL_PROFILE: SleepProfile = SleepProfile {
    heading: Duration::from_millis(1000),
    main_refresh: Duration::from_millis(2000),
    battery: Duration::from_millis(60_000),
    blink: Duration::from_millis(1500),
    lora_rx: Duration::from_millis(3000),
    lora_tx: Duration::from_millis(15_000),
};

/// Cadences while stowed in a backpack. Everything slows down; the
/// device still announces so the others keep a bearing on it.
pub static ISOLATION_PROFILE: SleepProfile = SleepProfile {
    heading: Duration::from_millis(300_000),
    main_refresh: Duration::from_millis(5000),
    battery: Duration::from_millis(300_000),
    blink: Duration::from_millis(5000),
    lora_rx: Duration::from_millis(10_000),
    lora_tx: Duration::from_millis(60_000),
};

/// Mode state shared between interrupt handlers and the task loops.
///
/// Triggers are set-once flags consumed exactly once by the render loop,
/// so a double press between two frames collapses into one toggle.
pub struct ModeController {
    isolation_pending: AtomicBool,
    meet_pending: AtomicBool,
    isolation: AtomicBool,
    want_to_meet: AtomicBool,
}

impl ModeController {
    pub const fn new() -> Self {
        Self {
            isolation_pending: AtomicBool::new(false),
            meet_pending: AtomicBool::new(false),
            isolation: AtomicBool::new(false),
            want_to_meet: AtomicBool::new(false),
        }
    }

    // --- Interrupt side ---

    /// Stage an isolation toggle. Safe to call from interrupt context.
    pub fn trigger_isolation(&self) {
        self.isolation_pending.store(true, Ordering::Relaxed);
    }

    /// Stage a want-to-meet toggle. Safe to call from interrupt context.
    pub fn trigger_want_to_meet(&self) {
        self.meet_pending.store(true, Ordering::Relaxed);
    }

    // --- Render loop side ---

    /// Consume a staged isolation toggle, if any.
    pub fn take_isolation_trigger(&self) -> bool {
        self.isolation_pending.swap(false, Ordering::Relaxed)
    }

    /// Consume a staged want-to-meet toggle, if any.
    pub fn take_meet_trigger(&self) -> bool {
        self.meet_pending.swap(false, Ordering::Relaxed)
    }

    /// Flip the operating mode and return what it became.
    pub fn toggle_isolation(&self) -> OperatingMode {
        let was = self.isolation.fetch_xor(true, Ordering::Relaxed);
        if was {
            OperatingMode::Normal
        } else {
            OperatingMode::Isolation
        }
    }

    /// Flip the want-to-meet flag and return what it became.
    pub fn toggle_want_to_meet(&self) -> bool {
        !self.want_to_meet.fetch_xor(true, Ordering::Relaxed)
    }

    // --- Observers ---

    pub fn mode(&self) -> OperatingMode {
        if self.isolation.load(Ordering::Relaxed) {
            OperatingMode::Isolation
        } else {
            OperatingMode::Normal
        }
    }

    pub fn is_isolation(&self) -> bool {
        self.isolation.load(Ordering::Relaxed)
    }

    pub fn want_to_meet(&self) -> bool {
        self.want_to_meet.load(Ordering::Relaxed)
    }

    /// The wake cadences for the current mode.
    ///
    /// The profile reference is read whole, so a toggle between two loop
    /// iterations never yields a mixed set of periods.
    pub fn sleep_profile(&self) -> &'static SleepProfile {
        if self.is_isolation() {
            &ISOLATION_PROFILE
        } else {
            &NORMAL_PROFILE
        }
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}
