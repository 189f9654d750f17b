//! Configuration errors
//!
//! The transmit path never fails. Everything that can go wrong is decided
//! while wiring the bus up, and is reported here.

use thiserror::Error;

/// Invalid bus, pin or registry setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ESP32 only has SPI0..SPI3
    #[error("SPI bus {0} does not exist (valid: 0..=3)")]
    InvalidBus(u8),
    /// GPIO number past the last pad
    #[error("GPIO{0} does not exist")]
    InvalidPin(u8),
    /// GPIO34..GPIO39 have no output driver
    #[error("GPIO{0} is input only and cannot drive the data/command line")]
    InputOnlyPin(u8),
    /// A peripheral was registered twice for the same bus
    #[error("SPI bus {0} is already registered")]
    SlotOccupied(u8),
    /// Lookup of a bus nobody registered
    #[error("SPI bus {0} has no registered peripheral")]
    SlotEmpty(u8),
    /// SPI driver built on other GPIOs than the bus config names
    #[error("{signal} is on GPIO {actual:?} but the bus config says {configured:?}")]
    PinMismatch {
        signal: &'static str,
        configured: Option<u8>,
        actual: Option<u8>,
    },
}
