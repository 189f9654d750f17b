//! Bus pin configuration
//!
//! Pin numbers follow the Arduino convention: a negative number marks a pin as
//! unused, which turns the matching feature off instead of failing.

use crate::esp32spi::error::ConfigError;

/// Pin assignment and requested clock of one display bus.
///
/// Immutable once built; the facade owns its copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    dc: Option<u8>,
    cs: Option<u8>,
    sck: Option<u8>,
    mosi: Option<u8>,
    miso: Option<u8>,
    speed: u32,
}

impl BusConfig {
    /// Build a config from raw pin numbers, `-1` (or any negative) meaning unused
    pub const fn new(dc: i8, cs: i8, sck: i8, mosi: i8, miso: i8) -> Self {
        Self {
            dc: pin(dc),
            cs: pin(cs),
            sck: pin(sck),
            mosi: pin(mosi),
            miso: pin(miso),
            speed: 0,
        }
    }

    /// Requested SPI clock in Hz, 0 leaves the choice to [`crate::esp32spi::DataBus::begin`]
    pub const fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Data/command pin
    pub const fn dc(&self) -> Option<u8> {
        self.dc
    }

    /// Chip select pin
    pub const fn cs(&self) -> Option<u8> {
        self.cs
    }

    /// Clock pin
    pub const fn sck(&self) -> Option<u8> {
        self.sck
    }

    /// Data out pin
    pub const fn mosi(&self) -> Option<u8> {
        self.mosi
    }

    /// Data in pin, usually unused for displays
    pub const fn miso(&self) -> Option<u8> {
        self.miso
    }

    /// Requested clock in Hz (0 = unspecified)
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Check the SPI driver was built on the clock and data pins named here.
    ///
    /// The driver takes its GPIOs as typed peripherals, so the numbers are
    /// compared once at startup.
    pub fn verify_bus_pins(
        &self,
        sck: Option<u8>,
        mosi: Option<u8>,
        miso: Option<u8>,
    ) -> Result<(), ConfigError> {
        for (signal, configured, actual) in [
            ("SCK", self.sck, sck),
            ("MOSI", self.mosi, mosi),
            ("MISO", self.miso, miso),
        ] {
            if configured != actual {
                return Err(ConfigError::PinMismatch {
                    signal,
                    configured,
                    actual,
                });
            }
        }
        Ok(())
    }
}

const fn pin(raw: i8) -> Option<u8> {
    if raw < 0 {
        None
    } else {
        Some(raw as u8)
    }
}

/// Pin configuration constants for the demo board (ESP32 DevKit + ILI9341 on VSPI)
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: i8 = 2;
    /// Chip Select pin for the display
    pub const CS: i8 = 5;
    /// VSPI clock
    pub const SCK: i8 = 18;
    /// VSPI Master Out Slave In
    pub const MOSI: i8 = 23;
    /// Not wired, the panel is write only
    pub const MISO: i8 = -1;
    /// Panel reset
    pub const RST: i8 = 4;
    /// Backlight enable
    pub const BL: i8 = 15;

    /// Bus configuration for the pins above
    pub const fn bus_config() -> BusConfig {
        BusConfig::new(Self::DC, Self::CS, Self::SCK, Self::MOSI, Self::MISO)
    }
}
