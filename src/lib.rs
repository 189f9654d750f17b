//! Buffered SPI data bus for display controllers on the ESP32.
//!
//! The bus coalesces command and pixel writes into a 64 byte staging buffer,
//! drives the data/command line through a direct set/clear register pair and
//! puts every 16 and 32 bit value on the wire most significant byte first.
//!
//! ### Usage
//!
//! 1. register the SPI peripheral in a [`esp32spi::SpiHostRegistry`] at startup
//! 1. build an [`esp32spi::Esp32Spi`] from a [`esp32spi::BusConfig`], a host
//!    handle, a data/command line and an optional chip select pin
//! 1. call [`esp32spi::DataBus::begin`] once, then wrap writes in
//!    `begin_write` / `end_write`, or use the one-shot `send_*` helpers
//!
//! The [`panel`] module is a small ILI9341 driver written against
//! [`esp32spi::DataBus`], used by the demo firmware.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod esp32spi;
pub mod panel;

pub use esp32spi::{
    BusConfig, BusId, BusSettings, ConfigError, DataBus, DataMode, Esp32Spi, SpiHost,
    SpiHostRegistry, SpiPeripheral,
};
