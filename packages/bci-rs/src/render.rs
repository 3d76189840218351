//! Rendering and input boundary.
//!
//! The control loop describes each frame as a list of [`DrawCommand`]s and
//! hands it to a [`RenderSurface`]; the surface owns the window (or lack of
//! one) and reports user input as [`InputEvent`]s.

use crate::error::Result;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Opaque `0xAARRGGBB`, the framebuffer layout used by `minifb`.
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | (self.0 as u32) << 16 | (self.1 as u32) << 8 | self.2 as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

/// One drawing primitive, in screen pixels with the origin top-left
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgb,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgb,
    },
    Text {
        x: f64,
        y: f64,
        size: TextSize,
        text: String,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed or process asked to stop
    Quit,
    KeyPressed(Key),
}

impl InputEvent {
    /// Quit and Escape both end the session.
    pub fn ends_session(&self) -> bool {
        matches!(self, InputEvent::Quit | InputEvent::KeyPressed(Key::Escape))
    }
}

pub trait RenderSurface {
    /// Drain pending input events.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Draw one complete frame.
    fn present(&mut self, scene: &[DrawCommand]) -> Result<()>;
}
