//! Cross-thread handle serializing every entry point of one controller.
//!
//! The controllers assume a single caller at a time. When a transport thread
//! injects bytes or pin levels while the CPU thread issues register accesses,
//! both sides go through a [`SharedDevice`] clone so each call runs to
//! completion under the controller's lock.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{AccessDiagnostics, Lpuart, MmioDevice, Siul2};

/// Clonable, lock-protected handle to a controller or bus.
#[derive(Debug)]
pub struct SharedDevice<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> Clone for SharedDevice<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> SharedDevice<D> {
    /// Moves `device` behind a new lock.
    #[must_use]
    pub fn new(device: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Locks the device for a sequence of calls that must not interleave.
    pub fn lock(&self) -> MutexGuard<'_, D> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the device.
    #[must_use]
    pub fn with<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<D: MmioDevice> SharedDevice<D> {
    /// Locked [`MmioDevice::read`].
    #[must_use]
    pub fn read(&self, offset: u32, width: u8) -> u32 {
        self.inner.lock().read(offset, width)
    }

    /// Locked [`MmioDevice::write`].
    pub fn write(&self, offset: u32, width: u8, value: u32) {
        self.inner.lock().write(offset, width, value);
    }

    /// Locked [`MmioDevice::reset`].
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Copies the current fault counters.
    #[must_use]
    pub fn diagnostics(&self) -> AccessDiagnostics {
        *self.inner.lock().diagnostics()
    }
}

impl SharedDevice<Lpuart> {
    /// Locked [`Lpuart::receive_bytes`].
    #[must_use]
    pub fn receive_bytes(&self, bytes: &[u8]) -> usize {
        self.inner.lock().receive_bytes(bytes)
    }

    /// Locked [`Lpuart::can_receive`].
    #[must_use]
    pub fn can_receive(&self) -> usize {
        self.inner.lock().can_receive()
    }
}

impl SharedDevice<Siul2> {
    /// Locked [`Siul2::set_pin_input`].
    pub fn set_pin_input(&self, pin: usize, level: bool) {
        self.inner.lock().set_pin_input(pin, level);
    }
}
