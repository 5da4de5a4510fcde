#![no_main]

use libfuzzer_sys::fuzz_target;
use s32k344_periph::{
    Lpuart, MmioDevice, PeripheralBus, Siul2, LPUART0_BASE, SIUL2_BASE, SIUL2_PIN_COUNT,
};

const RECORD: usize = 8;

fuzz_target!(|data: &[u8]| {
    let mut bus = PeripheralBus::new()
        .with_siul2(Siul2::default())
        .with_lpuart(Lpuart::default());

    for record in data.chunks_exact(RECORD) {
        let op = record[0];
        let width = record[1];
        let offset = u32::from(u16::from_le_bytes([record[2], record[3]]));
        let value = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        let base = if op & 0x80 == 0 { SIUL2_BASE } else { LPUART0_BASE };

        match op & 0x7 {
            0 => {
                let _ = bus.read(base.wrapping_add(offset), width);
            }
            1 => bus.write(base.wrapping_add(offset), width, value),
            2 => {
                let _ = bus.try_read(value, width);
            }
            3 => {
                if let Some(siul2) = bus.siul2_mut() {
                    let pin = usize::from(record[2]) % (SIUL2_PIN_COUNT + 8);
                    siul2.set_pin_input(pin, value & 1 != 0);
                }
            }
            4 => {
                if let Some(uart) = bus.lpuart_mut(0) {
                    let _ = uart.receive_bytes(&record[2..]);
                }
            }
            5 => bus.reset(),
            _ => {
                let _ = bus.try_write(base.wrapping_add(offset), width, value);
            }
        }

        if let Some(uart) = bus.lpuart(0) {
            assert!(uart.rx_fifo_len() <= 16);
        }
    }
});
