//! Reset values and reset idempotence for both controllers.

use bitflags as _;
use env_logger as _;
use log as _;
use parking_lot as _;
use proptest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use rstest::rstest;
use s32k344_periph::{
    Ctrl, Direction, Lpuart, LpuartConfig, MmioDevice, Mscr, PeripheralBus, Siul2,
    LPUART_BAUD, LPUART_CTRL, LPUART_DATA, LPUART_FIFO, LPUART_GLOBAL, LPUART_MATCH,
    LPUART_MODIR, LPUART_PARAM, LPUART_PINCFG, LPUART_STAT, LPUART_VERID, LPUART_WATER,
    SIUL2_DIRER0, SIUL2_DIRSR0, SIUL2_DISR0, SIUL2_GPDI_BASE, SIUL2_GPDO_BASE, SIUL2_IFEER0,
    SIUL2_IFER0, SIUL2_IREER0, SIUL2_MIDR1, SIUL2_MIDR2, SIUL2_MSCR_BASE, SIUL2_PIN_COUNT,
};

fn siul2_snapshot(siul2: &mut Siul2) -> Vec<u32> {
    let mut words = vec![
        siul2.read(SIUL2_MIDR1, 4),
        siul2.read(SIUL2_MIDR2, 4),
        siul2.read(SIUL2_DISR0, 4),
        siul2.read(SIUL2_DIRER0, 4),
        siul2.read(SIUL2_DIRSR0, 4),
        siul2.read(SIUL2_IREER0, 4),
        siul2.read(SIUL2_IFEER0, 4),
        siul2.read(SIUL2_IFER0, 4),
    ];
    for pin in 0..SIUL2_PIN_COUNT {
        let pin = u32::try_from(pin).expect("pin index fits in u32");
        words.push(siul2.read(SIUL2_MSCR_BASE + 4 * pin, 4));
        words.push(siul2.read(SIUL2_GPDO_BASE + pin, 1));
        words.push(siul2.read(SIUL2_GPDI_BASE + pin, 1));
    }
    words
}

fn dirty_siul2() -> Siul2 {
    let mut siul2 = Siul2::default();
    siul2.write(SIUL2_DIRER0, 4, 0xFFFF_FFFF);
    siul2.write(SIUL2_IREER0, 4, 0xFFFF_FFFF);
    siul2.write(SIUL2_IFEER0, 4, 0x0000_00F0);
    siul2.write(SIUL2_DIRSR0, 4, 0x55);
    siul2.write(SIUL2_IFER0, 4, 0xAA);
    for pin in [0_u32, 5, 12, 31, 100, 143] {
        siul2.write(SIUL2_MSCR_BASE + 4 * pin, 4, (Mscr::IBE | Mscr::OBE).bits());
        siul2.write(SIUL2_GPDO_BASE + pin, 1, 1);
        siul2.set_pin_input(pin as usize, true);
    }
    siul2
}

#[test]
fn siul2_reset_restores_every_register_and_pad() {
    let mut pristine = Siul2::default();
    let expected = siul2_snapshot(&mut pristine);

    let mut siul2 = dirty_siul2();
    assert!(siul2.irq_level());
    siul2.reset();

    assert_eq!(siul2_snapshot(&mut siul2), expected);
    assert!(!siul2.irq_level());
    for pin in 0..SIUL2_PIN_COUNT {
        let pad = siul2.pad(pin).expect("pad exists");
        assert_eq!(pad.direction(), Direction::Input);
        assert!(!pad.input_buffer_enabled());
        assert!(!pad.prev_input_level());
    }
}

#[test]
fn siul2_reset_twice_is_idempotent() {
    let mut siul2 = dirty_siul2();
    siul2.reset();
    let first = siul2_snapshot(&mut siul2);
    siul2.reset();
    assert_eq!(siul2_snapshot(&mut siul2), first);
}

#[test]
fn siul2_reset_keeps_diagnostics() {
    let mut siul2 = Siul2::default();
    siul2.write(SIUL2_GPDI_BASE, 1, 1);
    siul2.reset();
    assert_eq!(siul2.diagnostics().total(), 1);
}

#[rstest]
#[case(LPUART_VERID, 0x0403_0003)]
#[case(LPUART_PARAM, 0x0000_0F0F)]
#[case(LPUART_GLOBAL, 0)]
#[case(LPUART_PINCFG, 0)]
#[case(LPUART_BAUD, 0)]
#[case(LPUART_STAT, 0x00C0_0000)]
#[case(LPUART_CTRL, 0)]
#[case(LPUART_DATA, 0)]
#[case(LPUART_MATCH, 0)]
#[case(LPUART_MODIR, 0)]
#[case(LPUART_FIFO, 0x0000_0088)]
#[case(LPUART_WATER, 0)]
fn lpuart_reset_values(#[case] offset: u32, #[case] expected: u32) {
    let mut uart = Lpuart::new(LpuartConfig { instance: 3 });
    uart.write(LPUART_CTRL, 4, (Ctrl::RE | Ctrl::TE).bits());
    uart.write(LPUART_BAUD, 4, 0x0F00_0022);
    uart.write(LPUART_WATER, 4, 0x0001_0001);
    assert_eq!(uart.receive_bytes(b"xyz"), 3);

    uart.reset();
    assert_eq!(uart.read(offset, 4), expected);
}

#[test]
fn lpuart_reset_twice_is_idempotent() {
    let mut uart = Lpuart::default();
    uart.write(LPUART_CTRL, 4, (Ctrl::RE | Ctrl::RIE).bits());
    uart.receive_bytes(&[1, 2, 3, 4]);
    assert!(uart.irq_level());

    uart.reset();
    let first = *uart.registers();
    assert_eq!(uart.rx_fifo_len(), 0);
    assert!(!uart.irq_level());

    uart.reset();
    assert_eq!(*uart.registers(), first);
    assert_eq!(uart.can_receive(), 16);
}

#[test]
fn bus_reset_reaches_every_attached_controller() {
    let mut bus = PeripheralBus::new()
        .with_siul2(dirty_siul2())
        .with_lpuart(Lpuart::new(LpuartConfig { instance: 2 }));
    if let Some(uart) = bus.lpuart_mut(2) {
        uart.write(LPUART_CTRL, 4, Ctrl::RE.bits());
        uart.receive_bytes(b"hi");
    }

    bus.reset();

    assert!(bus.siul2().is_some_and(|siul2| !siul2.irq_level()));
    assert!(bus
        .siul2()
        .and_then(|siul2| siul2.pad(12))
        .is_some_and(|pad| pad.direction() == Direction::Input));
    assert_eq!(bus.lpuart(2).map(Lpuart::rx_fifo_len), Some(0));
}
