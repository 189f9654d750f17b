//! ESP32 SPI data bus
//!
//! Display data bus for the ESP32 SPI peripherals, built around a fixed
//! staging buffer and injected hardware capabilities.
//!
//! ## Architecture
//!
//! ```text
//!   DataBus (begin_write / write* / end_write / send*)
//!        |
//!   Esp32Spi ---- ControlLine (DC set/clear register pair)
//!        |
//!   TransactionBuffer (64 bytes, big-endian words)
//!        |
//!   SpiHost { BusLock, SpiPeripheral } <- SpiHostRegistry[BusId]
//! ```
//!
//! ### Transactions
//!
//! `begin_write` takes the host lock, applies this device's clock and mode,
//! drives DC to data and pulls chip select low. Writes are buffered and only
//! reach the peripheral when the buffer cannot take the next value, when the
//! data/command phase changes, or when the transaction ends.
//!
//! ### Errors
//!
//! Nothing on the transmit path returns an error. Backends log faults with
//! `log::error!` and carry on; only configuration (bus numbers, pins, registry
//! slots) is reported through [`ConfigError`].

pub mod buffer;
pub mod clock;
pub mod control;
pub mod databus;
pub mod encoder;
pub mod error;
pub mod hal;
pub mod host;
pub mod interface;
pub mod lock;
pub mod pins;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use buffer::{TransactionBuffer, DATA_BUF_LEN};
pub use clock::{ClockDivider, APB_CLK_FREQ, DEFAULT_SPEED};
pub use control::{
    ControlLine, ControlLinePorts, Mmio, NoControlLine, PinControlLine, RegisterControlLine,
    RegisterWrite,
};
pub use databus::DataBus;
pub use error::ConfigError;
pub use hal::HalPeripheral;
pub use host::{
    BitOrder, BusId, BusSettings, DataMode, DeviceCache, SpiHost, SpiHostRegistry, SpiPeripheral,
};
pub use interface::{Esp32Spi, NoPin, Phase};
pub use lock::{BlockingLock, BusLock, DefaultLock, NoLock};
pub use pins::{BusConfig, Pins};

/// Number of SPI peripherals on the ESP32 (SPI0, SPI1, HSPI, VSPI)
pub const SPI_BUS_COUNT: usize = 4;
