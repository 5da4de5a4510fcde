//! Serial controller transmit path, receive FIFO and interrupt behavior.

use bitflags as _;
use env_logger as _;
use log as _;
use parking_lot as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use rstest::rstest;
use s32k344_periph::{
    Ctrl, FaultKind, Lpuart, LpuartConfig, MmioDevice, Stat, LPUART_CTRL, LPUART_DATA,
    LPUART_FIFO_DEPTH, LPUART_STAT,
};

fn uart_with_sink(ctrl: Ctrl) -> (Lpuart, Arc<Mutex<Vec<u8>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sent);
    let mut uart = Lpuart::default().with_byte_sink(move |byte: u8| {
        sink.lock().unwrap().push(byte);
    });
    uart.write(LPUART_CTRL, 4, ctrl.bits());
    (uart, sent)
}

fn stat(uart: &mut Lpuart) -> Stat {
    Stat::from_bits_retain(uart.read(LPUART_STAT, 4))
}

#[test]
fn fifo_round_trip_preserves_order() {
    let mut uart = Lpuart::default();
    uart.write(LPUART_CTRL, 4, Ctrl::RE.bits());

    assert_eq!(uart.receive_bytes(&[0x41, 0x42]), 2);
    assert_eq!(uart.read(LPUART_DATA, 4), 0x41);
    assert_eq!(uart.read(LPUART_DATA, 4), 0x42);
    assert_eq!(uart.read(LPUART_DATA, 4), 0);
    assert!(!stat(&mut uart).contains(Stat::RDRF));
}

#[test]
fn capacity_clamp_drops_excess_silently() {
    let mut uart = Lpuart::default();
    uart.write(LPUART_CTRL, 4, Ctrl::RE.bits());

    assert_eq!(uart.receive_bytes(&[0x55; 20]), 16);
    assert_eq!(uart.rx_fifo_len(), 16);
    assert_eq!(uart.can_receive(), 0);
    assert!(!stat(&mut uart).contains(Stat::OR));
    assert_eq!(uart.diagnostics().total(), 0);
}

#[test]
fn transmit_echo_reaches_sink_once() {
    let (mut uart, sent) = uart_with_sink(Ctrl::TE);

    uart.write(LPUART_DATA, 4, 0x48);

    assert_eq!(*sent.lock().unwrap(), vec![0x48]);
    assert!(stat(&mut uart).contains(Stat::TDRE | Stat::TC));
}

#[test]
fn disabled_transmitter_drops_data_without_fault() {
    let (mut uart, sent) = uart_with_sink(Ctrl::RE);
    uart.write(LPUART_DATA, 4, 0x48);
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(uart.diagnostics().total(), 0);
}

#[test]
fn polled_puts_sees_transmitter_always_ready() {
    let (mut uart, sent) = uart_with_sink(Ctrl::TE | Ctrl::RE);
    for &byte in b"Hello S32K344!\r\n" {
        while !stat(&mut uart).contains(Stat::TDRE) {}
        uart.write(LPUART_DATA, 4, u32::from(byte));
        while !stat(&mut uart).contains(Stat::TC) {}
    }
    assert_eq!(sent.lock().unwrap().as_slice(), b"Hello S32K344!\r\n");
}

#[test]
fn receive_interrupt_tracks_enable_and_data() {
    let mut uart = Lpuart::default();
    uart.write(LPUART_CTRL, 4, (Ctrl::RE | Ctrl::RIE).bits());
    assert!(!uart.irq_level());

    uart.receive_bytes(b"a");
    assert!(uart.irq_level());

    uart.write(LPUART_CTRL, 4, Ctrl::RE.bits());
    assert!(!uart.irq_level());
}

#[test]
fn draining_then_control_write_lowers_receive_interrupt() {
    let mut uart = Lpuart::default();
    let rie = (Ctrl::RE | Ctrl::RIE).bits();
    uart.write(LPUART_CTRL, 4, rie);
    uart.receive_bytes(b"z");
    assert_eq!(uart.read(LPUART_DATA, 4), u32::from(b'z'));
    assert!(uart.irq_level());

    uart.write(LPUART_CTRL, 4, rie);
    assert!(!uart.irq_level());
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(15)]
fn instance_selects_label(#[case] instance: u8) {
    let uart = Lpuart::new(LpuartConfig { instance });
    assert_eq!(uart.name(), format!("lpuart{instance}"));
    assert_eq!(uart.instance(), instance);
}

#[rstest]
#[case(LPUART_DATA, 1)]
#[case(LPUART_DATA, 2)]
#[case(LPUART_STAT + 2, 4)]
fn malformed_data_accesses_have_no_side_effects(#[case] offset: u32, #[case] width: u8) {
    let (mut uart, sent) = uart_with_sink(Ctrl::TE | Ctrl::RE);
    uart.receive_bytes(b"q");

    uart.write(offset, width, 0x21);
    assert_eq!(uart.read(offset, width), 0);

    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(uart.rx_fifo_len(), 1);
    assert_eq!(
        uart.diagnostics().count(FaultKind::InvalidWidth)
            + uart.diagnostics().count(FaultKind::Unaligned),
        2
    );
}

proptest! {
    #[test]
    fn rdrf_mirrors_fifo_occupancy(
        bursts in proptest::collection::vec(
            (proptest::collection::vec(any::<u8>(), 0..24), 0_usize..20),
            1..8,
        ),
    ) {
        let mut uart = Lpuart::default();
        uart.write(LPUART_CTRL, 4, Ctrl::RE.bits());
        let mut model: VecDeque<u8> = VecDeque::new();

        for (burst, reads) in bursts {
            let room = LPUART_FIFO_DEPTH - model.len();
            let accepted = uart.receive_bytes(&burst);
            prop_assert_eq!(accepted, burst.len().min(room));
            model.extend(&burst[..accepted]);

            for _ in 0..reads {
                let expected = model.pop_front().map_or(0, u32::from);
                prop_assert_eq!(uart.read(LPUART_DATA, 4), expected);
            }

            prop_assert_eq!(uart.rx_fifo_len(), model.len());
            prop_assert_eq!(uart.can_receive(), LPUART_FIFO_DEPTH - model.len());
            let status = Stat::from_bits_retain(uart.read(LPUART_STAT, 4));
            prop_assert_eq!(status.contains(Stat::RDRF), !model.is_empty());
        }
    }
}
