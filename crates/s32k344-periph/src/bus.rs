//! Address dispatcher routing absolute CPU accesses to attached controllers.

use crate::map::{decode_peripheral, PeripheralId, LPUART_INSTANCE_COUNT};
use crate::{AccessDiagnostics, AccessFault, Lpuart, MmioDevice, Siul2};

/// Peripheral bus holding the SIUL2 and up to sixteen LPUART instances.
///
/// Implements [`MmioDevice`] over absolute addresses: accesses that decode to
/// an attached controller are forwarded at the window offset, and faults
/// inside a window are absorbed and counted by that controller. Addresses no
/// attached controller claims are counted in the bus's own diagnostics.
#[derive(Debug)]
pub struct PeripheralBus {
    siul2: Option<Siul2>,
    lpuarts: [Option<Lpuart>; LPUART_INSTANCE_COUNT],
    diag: AccessDiagnostics,
}

impl Default for PeripheralBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PeripheralBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            siul2: None,
            lpuarts: std::array::from_fn(|_| None),
            diag: AccessDiagnostics::new(),
        }
    }

    /// Attaches the pin controller.
    #[must_use]
    pub fn with_siul2(mut self, siul2: Siul2) -> Self {
        self.siul2 = Some(siul2);
        self
    }

    /// Attaches a serial controller at the slot selected by its instance.
    ///
    /// A controller whose instance has no window on the device is dropped.
    #[must_use]
    pub fn with_lpuart(mut self, lpuart: Lpuart) -> Self {
        let instance = lpuart.instance();
        match self.lpuarts.get_mut(usize::from(instance)) {
            Some(slot) => *slot = Some(lpuart),
            None => log::warn!("bus: lpuart{instance} has no window, not attached"),
        }
        self
    }

    /// Returns the pin controller, if attached.
    #[must_use]
    pub const fn siul2(&self) -> Option<&Siul2> {
        self.siul2.as_ref()
    }

    /// Returns the pin controller for update, if attached.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn siul2_mut(&mut self) -> Option<&mut Siul2> {
        self.siul2.as_mut()
    }

    /// Returns serial controller `instance`, if attached.
    #[must_use]
    pub fn lpuart(&self, instance: u8) -> Option<&Lpuart> {
        self.lpuarts.get(usize::from(instance))?.as_ref()
    }

    /// Returns serial controller `instance` for update, if attached.
    pub fn lpuart_mut(&mut self, instance: u8) -> Option<&mut Lpuart> {
        self.lpuarts.get_mut(usize::from(instance))?.as_mut()
    }

    fn route(&mut self, addr: u32) -> Option<(&mut dyn MmioDevice, u32)> {
        let (id, offset) = decode_peripheral(addr)?;
        let device: &mut dyn MmioDevice = match id {
            PeripheralId::Siul2 => self.siul2.as_mut()?,
            PeripheralId::Lpuart(instance) => self.lpuart_mut(instance)?,
        };
        Some((device, offset))
    }
}

impl MmioDevice for PeripheralBus {
    fn name(&self) -> &str {
        "bus"
    }

    fn try_read(&mut self, addr: u32, width: u8) -> Result<u32, AccessFault> {
        let (device, offset) = self
            .route(addr)
            .ok_or(AccessFault::InvalidAddress { offset: addr })?;
        Ok(device.read(offset, width))
    }

    fn try_write(&mut self, addr: u32, width: u8, value: u32) -> Result<(), AccessFault> {
        let (device, offset) = self
            .route(addr)
            .ok_or(AccessFault::InvalidAddress { offset: addr })?;
        device.write(offset, width, value);
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(siul2) = self.siul2.as_mut() {
            siul2.reset();
        }
        for lpuart in self.lpuarts.iter_mut().flatten() {
            lpuart.reset();
        }
    }

    fn diagnostics(&self) -> &AccessDiagnostics {
        &self.diag
    }

    fn diagnostics_mut(&mut self) -> &mut AccessDiagnostics {
        &mut self.diag
    }
}

#[cfg(test)]
mod tests {
    use super::PeripheralBus;
    use crate::map::{lpuart_base, LPUART0_BASE, SIUL2_BASE};
    use crate::{
        FaultKind, Lpuart, LpuartConfig, MmioDevice, Siul2, LPUART_CTRL, LPUART_VERID,
        LPUART_VERID_VALUE, SIUL2_MIDR1, SIUL2_MIDR1_RESET,
    };

    fn board() -> PeripheralBus {
        PeripheralBus::new()
            .with_siul2(Siul2::default())
            .with_lpuart(Lpuart::default())
            .with_lpuart(Lpuart::new(LpuartConfig { instance: 6 }))
    }

    #[test]
    fn routes_to_attached_windows() {
        let mut bus = board();
        assert_eq!(bus.read(SIUL2_BASE + SIUL2_MIDR1, 4), SIUL2_MIDR1_RESET);
        assert_eq!(bus.read(LPUART0_BASE + LPUART_VERID, 4), LPUART_VERID_VALUE);

        bus.write(lpuart_base(6) + LPUART_CTRL, 4, 0x0008_0000);
        assert_eq!(bus.read(lpuart_base(6) + LPUART_CTRL, 4), 0x0008_0000);
        assert_eq!(bus.lpuart(0).map(|u| u.ctrl().bits()), Some(0));
        assert_eq!(bus.diagnostics().total(), 0);
    }

    #[test]
    fn unattached_and_unmapped_addresses_fault_at_the_bus() {
        let mut bus = board();
        assert_eq!(bus.read(lpuart_base(1), 4), 0);
        assert_eq!(bus.read(0x2000_0000, 4), 0);
        bus.write(0xFFFF_FFFC, 4, 1);
        assert_eq!(bus.diagnostics().count(FaultKind::InvalidAddress), 3);
    }

    #[test]
    fn window_faults_are_counted_by_the_device() {
        let mut bus = board();
        assert_eq!(bus.read(LPUART0_BASE + LPUART_VERID, 2), 0);
        assert_eq!(bus.diagnostics().total(), 0);
        assert_eq!(
            bus.lpuart(0)
                .map(|u| u.diagnostics().count(FaultKind::InvalidWidth)),
            Some(1)
        );
    }

    #[test]
    fn out_of_range_instance_is_not_attached() {
        let bus = PeripheralBus::new().with_lpuart(Lpuart::new(LpuartConfig { instance: 16 }));
        assert!((0..=16).all(|n| bus.lpuart(n).is_none()));
        assert!(bus.siul2().is_none());
    }
}
