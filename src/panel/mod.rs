//! ILI9341 TFT driver on top of the SPI data bus
//!
//! A 240x320 RGB565 controller, the panel on the demo board. Everything goes
//! through [`crate::esp32spi::DataBus`], so the driver works on any bus that
//! implements it.
//!
//! ### Usage
//! 1. create the bus and hand it to [`driver::Ili9341::new`]
//! 1. call [`driver::Ili9341::init`] once
//! 1. draw with [`embedded_graphics`] or push raw RGB565 with
//!    [`driver::Ili9341::draw_raw`]
#![allow(clippy::pedantic)]

pub mod cmd;
pub mod driver;
pub mod flag;

pub use driver::{hard_reset, Ili9341, Op, Rotation};

/// Panel width in the native (portrait) orientation
pub const WIDTH: u16 = 240;

/// Panel height in the native (portrait) orientation
pub const HEIGHT: u16 = 320;
