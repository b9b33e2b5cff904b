//! Display abstraction for the 160x80 panel.
//!
//! Rendering code draws through [`DisplaySurface`] so the same layout runs
//! against the SPI panel on the device and against a plain logging surface
//! in the simulator. The trait is deliberately small: filled rectangles,
//! top-left anchored text with an explicit background, and panel power.
//! Power matters because isolation mode turns the panel off entirely while
//! the rest of the device keeps running.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Panel width in pixels.
pub const DISPLAY_WIDTH_PX: u32 = 160;

/// Panel height in pixels.
pub const DISPLAY_HEIGHT_PX: u32 = 80;

/// Text size presets used by the layout.
///
/// - `Small`: 6x10 font, one peer row per 10 px line
/// - `Large`: 10x20 font, welcome title only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_6X10,
            TextSize::Large => &FONT_10X20,
        }
    }

    /// Horizontal advance of one glyph, for column math.
    pub fn char_width(&self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    /// Glyph height, which is also the row pitch of the layout.
    pub fn char_height(&self) -> u32 {
        self.font().character_size.height
    }
}

/// Minimal draw target for the tracker layout.
///
/// `write_text` anchors at the glyph box top-left (not the baseline) and
/// paints `background` behind the glyphs, so rewriting a row over its old
/// content needs no separate erase.
pub trait DisplaySurface {
    type Error: core::fmt::Debug;

    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error>;

    /// Draw one line of text, top-left anchored at `position`.
    fn write_text(
        &mut self,
        position: Point,
        text: &str,
        size: TextSize,
        foreground: Rgb565,
        background: Rgb565,
    ) -> Result<(), Self::Error>;

    /// Switch the panel (and its backlight) on or off.
    fn set_power(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Blank the whole panel to black.
    fn clear(&mut self) -> Result<(), Self::Error> {
        self.fill_rect(
            Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)),
            Rgb565::BLACK,
        )
    }
}
