//! Blinky + UART echo demo driven from the host side.
//!
//! Replays the register sequence of the board's demo firmware against a
//! SIUL2 + LPUART0 bus: configure PTA12 as the LED output and PTA13 as an
//! input, bring LPUART0 up at 115200 baud, print a banner with TDRE polling,
//! then toggle the LED while echoing whatever a host transport thread types.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=s32k344_periph=debug cargo run -p s32k344-periph --example blinky_echo
//! ```

#![allow(clippy::pedantic)]

use bitflags as _;
use parking_lot as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::io::Write as _;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use s32k344_periph::{
    Ctrl, Lpuart, MmioDevice, Mscr, PeripheralBus, SharedDevice, Siul2, Stat, LPUART0_BASE,
    LPUART_BAUD, LPUART_CTRL, LPUART_DATA, LPUART_GLOBAL, LPUART_STAT, SIUL2_BASE,
    SIUL2_GPDO_BASE, SIUL2_MSCR_BASE,
};

const LED_PIN: u32 = 12;
const BUTTON_PIN: u32 = 13;
const BAUD_115200: u32 = 0x0F00_0022;
const GLOBAL_RST: u32 = 1 << 1;
const BLINKS: usize = 6;

struct Guest {
    bus: SharedDevice<PeripheralBus>,
}

impl Guest {
    fn reg32(&self, addr: u32) -> u32 {
        self.bus.read(addr, 4)
    }

    fn set_reg32(&self, addr: u32, value: u32) {
        self.bus.write(addr, 4, value);
    }

    fn set_reg8(&self, addr: u32, value: u8) {
        self.bus.write(addr, 1, u32::from(value));
    }

    fn uart_putc(&self, byte: u8) {
        while !Stat::from_bits_retain(self.reg32(LPUART0_BASE + LPUART_STAT)).contains(Stat::TDRE)
        {
            thread::yield_now();
        }
        self.set_reg32(LPUART0_BASE + LPUART_DATA, u32::from(byte));
        while !Stat::from_bits_retain(self.reg32(LPUART0_BASE + LPUART_STAT)).contains(Stat::TC) {
            thread::yield_now();
        }
    }

    fn uart_puts(&self, text: &str) {
        for byte in text.bytes() {
            self.uart_putc(byte);
        }
    }

    fn uart_getc(&self) -> Option<u8> {
        let mut bus = self.bus.lock();
        let stat = Stat::from_bits_retain(bus.read(LPUART0_BASE + LPUART_STAT, 4));
        if !stat.contains(Stat::RDRF) {
            return None;
        }
        let [byte, ..] = bus.read(LPUART0_BASE + LPUART_DATA, 4).to_le_bytes();
        Some(byte)
    }

    fn init(&self) {
        self.set_reg32(SIUL2_BASE + SIUL2_MSCR_BASE + 4 * LED_PIN, Mscr::OBE.bits());
        self.set_reg32(SIUL2_BASE + SIUL2_MSCR_BASE + 4 * BUTTON_PIN, Mscr::IBE.bits());

        self.set_reg32(LPUART0_BASE + LPUART_GLOBAL, GLOBAL_RST);
        self.set_reg32(LPUART0_BASE + LPUART_GLOBAL, 0);
        self.set_reg32(LPUART0_BASE + LPUART_BAUD, BAUD_115200);
        self.set_reg32(LPUART0_BASE + LPUART_CTRL, (Ctrl::TE | Ctrl::RE).bits());
    }
}

fn main() {
    env_logger::init();

    let (tx_bytes, console) = mpsc::channel::<u8>();
    let bus = PeripheralBus::new()
        .with_siul2(Siul2::default().with_pin_driver(|pin: usize, level: bool| {
            log::info!("pin {pin} -> {}", if level { "high" } else { "low" });
        }))
        .with_lpuart(Lpuart::default().with_byte_sink(move |byte: u8| {
            let _ = tx_bytes.send(byte);
        }));
    let guest = Guest {
        bus: SharedDevice::new(bus),
    };

    let printer = thread::spawn(move || {
        let mut stdout = std::io::stdout();
        for byte in console {
            let _ = stdout.write_all(&[byte]);
            let _ = stdout.flush();
        }
    });

    let transport = guest.bus.clone();
    let typist = thread::spawn(move || {
        let mut rest: &[u8] = b"typed on the host\r\n";
        while !rest.is_empty() {
            let accepted = transport.with(|bus| {
                bus.lpuart_mut(0)
                    .map_or(0, |uart| uart.receive_bytes(&rest[..1]))
            });
            rest = &rest[accepted..];
            thread::sleep(Duration::from_millis(20));
        }
    });

    guest.init();
    guest.uart_puts("S32K344 Blinky + UART Echo\r\n");

    let mut led = 0_u8;
    for _ in 0..BLINKS {
        led ^= 1;
        guest.set_reg8(SIUL2_BASE + SIUL2_GPDO_BASE + LED_PIN, led);
        for _ in 0..10 {
            while let Some(byte) = guest.uart_getc() {
                guest.uart_putc(byte);
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    let _ = typist.join();
    while let Some(byte) = guest.uart_getc() {
        guest.uart_putc(byte);
    }

    let diagnostics = guest.bus.diagnostics();
    drop(guest);
    let _ = printer.join();
    log::info!("bus faults: {}", diagnostics.total());
}
