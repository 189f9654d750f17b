//! Transmit path over any `embedded-hal` SPI bus
//!
//! `embedded-hal` buses are configured when they are created, so the settings
//! handed to [`SpiPeripheral::configure`] are only recorded. LSB-first order is
//! done in software; 9-bit frames cannot be expressed and are dropped.

use embedded_hal::spi::SpiBus;

use crate::esp32spi::buffer::DATA_BUF_LEN;
use crate::esp32spi::host::{BitOrder, BusSettings, SpiPeripheral};

pub struct HalPeripheral<B> {
    bus: B,
    settings: Option<BusSettings>,
}

impl<B: SpiBus> HalPeripheral<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            settings: None,
        }
    }

    /// Last settings passed to `configure`
    pub fn settings(&self) -> Option<&BusSettings> {
        self.settings.as_ref()
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn write_all(&mut self, bytes: &[u8]) {
        let result = self.bus.write(bytes).and_then(|()| self.bus.flush());
        if let Err(e) = result {
            log::error!("SPI write of {} bytes failed: {:?}", bytes.len(), e);
        }
    }
}

impl<B: SpiBus> SpiPeripheral for HalPeripheral<B> {
    fn configure(&mut self, settings: &BusSettings) {
        if self.settings.as_ref() != Some(settings) {
            log::debug!(
                "SPI settings: {} Hz, {:?}, {:?}",
                settings.frequency(),
                settings.data_mode,
                settings.bit_order
            );
        }
        self.settings = Some(*settings);
    }

    fn transmit(&mut self, bytes: &[u8]) {
        let lsb_first = self
            .settings
            .is_some_and(|s| s.bit_order == BitOrder::LsbFirst);
        if !lsb_first {
            self.write_all(bytes);
            return;
        }

        let mut reversed = [0u8; DATA_BUF_LEN];
        for chunk in bytes.chunks(DATA_BUF_LEN) {
            for (out, byte) in reversed.iter_mut().zip(chunk) {
                *out = byte.reverse_bits();
            }
            self.write_all(&reversed[..chunk.len()]);
        }
    }

    fn transmit_bits(&mut self, word: u32, bits: u8) {
        log::error!(
            "{}-bit frame 0x{:03X} dropped: byte oriented SPI bus",
            bits,
            word
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esp32spi::host::DataMode;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Wire {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl embedded_hal::spi::ErrorType for Wire {
        type Error = Infallible;
    }

    impl SpiBus for Wire {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.bytes.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            self.bytes.extend_from_slice(write);
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.bytes.extend_from_slice(words);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn msb_first_is_passed_through() {
        let mut p = HalPeripheral::new(Wire::default());
        p.configure(&BusSettings::default());
        p.transmit(&[0x01, 0x80]);
        let wire = p.release();
        assert_eq!(wire.bytes, vec![0x01, 0x80]);
        assert_eq!(wire.flushes, 1);
    }

    #[test]
    fn lsb_first_reverses_each_byte() {
        let mut p = HalPeripheral::new(Wire::default());
        p.configure(&BusSettings {
            bit_order: BitOrder::LsbFirst,
            data_mode: DataMode::Mode3,
            ..BusSettings::default()
        });
        p.transmit(&[0x01, 0x80, 0xF0]);
        assert_eq!(p.settings().map(|s| s.data_mode), Some(DataMode::Mode3));
        assert_eq!(p.release().bytes, vec![0x80, 0x01, 0x0F]);
    }

    #[test]
    fn nine_bit_frames_are_dropped() {
        let mut p = HalPeripheral::new(Wire::default());
        p.transmit_bits(0x12A, 9);
        assert!(p.release().bytes.is_empty());
    }
}
