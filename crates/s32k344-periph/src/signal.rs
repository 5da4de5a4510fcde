//! Outbound signal seams: interrupt lines, pin outputs and transmitted bytes.
//!
//! Controllers own their collaborators as boxed trait objects handed over at
//! construction. Closures implement every seam directly, so a channel sender
//! or a shared buffer can be wired in with a `move` closure.

use std::fmt;

/// Receiver of interrupt line level changes.
pub trait IrqHandler: Send {
    /// Called with the new line level whenever it changes.
    fn set_level(&mut self, level: bool);
}

impl<F> IrqHandler for F
where
    F: FnMut(bool) + Send,
{
    fn set_level(&mut self, level: bool) {
        self(level);
    }
}

/// External driver for output-configured pins.
pub trait PinDriver: Send {
    /// Called when software writes the output level of an output pin.
    fn drive_pin(&mut self, pin: usize, level: bool);
}

impl<F> PinDriver for F
where
    F: FnMut(usize, bool) + Send,
{
    fn drive_pin(&mut self, pin: usize, level: bool) {
        self(pin, level);
    }
}

/// External transport consuming transmitted bytes.
pub trait ByteSink: Send {
    /// Called synchronously for every byte accepted by the transmitter.
    fn transmit_byte(&mut self, byte: u8);
}

impl<F> ByteSink for F
where
    F: FnMut(u8) + Send,
{
    fn transmit_byte(&mut self, byte: u8) {
        self(byte);
    }
}

/// Level-triggered interrupt output.
///
/// The handler only sees transitions: raising an already raised line is a
/// no-op at the boundary.
#[derive(Default)]
pub struct IrqLine {
    level: bool,
    handler: Option<Box<dyn IrqHandler>>,
}

impl IrqLine {
    /// Creates a low line with nothing attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: false,
            handler: None,
        }
    }

    /// Creates a low line forwarding transitions to `handler`.
    #[must_use]
    pub fn connect(handler: impl IrqHandler + 'static) -> Self {
        Self {
            level: false,
            handler: Some(Box::new(handler)),
        }
    }

    /// Drives the line, notifying the handler on a level change.
    pub fn set(&mut self, level: bool) {
        if self.level == level {
            return;
        }
        self.level = level;
        if let Some(handler) = self.handler.as_mut() {
            handler.set_level(level);
        }
    }

    /// Asserts the line.
    pub fn raise(&mut self) {
        self.set(true);
    }

    /// Deasserts the line.
    pub fn lower(&mut self) {
        self.set(false);
    }

    /// Returns the current line level.
    #[must_use]
    pub const fn level(&self) -> bool {
        self.level
    }

    /// Returns `true` when a handler is attached.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for IrqLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqLine")
            .field("level", &self.level)
            .field("connected", &self.is_connected())
            .finish()
    }
}
