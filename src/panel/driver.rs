//! ILI9341 Driver Implementation
//!
//! ## Architecture
//!
//! ### Initialization Functions
//! - `new()` - Wrap a data bus, nothing is sent yet
//! - `hard_reset()` - Pulse the RST line (free function)
//! - `init()` - Software reset, sleep out, pixel format, rotation, display on
//!
//! ### Drawing Functions
//! - `fill_rect()` - Solid rectangle, streamed with `write_repeat`
//! - `draw_raw()` - Big-endian RGB565 bytes, streamed with `write_pixels`
//! - `DrawTarget` - `embedded-graphics` integration
//!
//! ### Power Management
//! - `sleep()` / `wake_up()`
//!
//! ## Address Window
//!
//! Every drawing call opens one bus transaction, sets the column and page
//! range with `CASET` / `PASET`, issues `RAMWR` and then streams pixels. The
//! controller wraps to the next row inside the window on its own, so a
//! rectangle is a single pixel stream.

use core::convert::Infallible;

pub use display_interface::DisplayError;

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::esp32spi::DataBus;
use crate::panel::{cmd::Cmd, flag::Flag, HEIGHT, WIDTH};

/// One step of a batched command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Command byte
    Command(u8),
    /// Parameter byte
    Data(u8),
    /// Pause in milliseconds; the pending bytes are flushed first
    Delay(u32),
}

/// Sequence run by [`Ili9341::init`] after the software reset
const INIT_OPS: &[Op] = &[
    Op::Command(Cmd::SLPOUT),
    Op::Delay(Flag::SLPOUT_DELAY_MS),
    Op::Command(Cmd::PIXFMT),
    Op::Data(Flag::PIXFMT_16BIT),
    Op::Command(Cmd::INVOFF),
    Op::Command(Cmd::DISPON),
    Op::Delay(20),
];

/// Panel orientation, expressed as a `MADCTL` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Portrait,
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl Rotation {
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Portrait => Flag::MADCTL_MX | Flag::MADCTL_BGR,
            Rotation::Landscape => Flag::MADCTL_MV | Flag::MADCTL_BGR,
            Rotation::PortraitFlipped => Flag::MADCTL_MY | Flag::MADCTL_BGR,
            Rotation::LandscapeFlipped => {
                Flag::MADCTL_MY | Flag::MADCTL_MX | Flag::MADCTL_MV | Flag::MADCTL_BGR
            }
        }
    }

    /// Row / column exchange, width and height swap
    pub const fn is_landscape(self) -> bool {
        matches!(self, Rotation::Landscape | Rotation::LandscapeFlipped)
    }
}

/// Pulse the reset line low, then wait for the controller to come back
pub fn hard_reset<RST: OutputPin>(
    rst: &mut RST,
    delay: &mut impl DelayNs,
) -> Result<(), DisplayError> {
    rst.set_high().map_err(|_| DisplayError::RSError)?;
    delay.delay_ms(10);
    rst.set_low().map_err(|_| DisplayError::RSError)?;
    delay.delay_ms(10);
    rst.set_high().map_err(|_| DisplayError::RSError)?;
    delay.delay_ms(Flag::RST_DELAY_MS);
    Ok(())
}

/// ILI9341 TFT driver
///
/// ## Type Parameters
///
/// - `B` - the data bus the controller sits on
pub struct Ili9341<B> {
    bus: B,
    rotation: Rotation,
}

impl<B: DataBus> Ili9341<B> {
    pub fn new(bus: B) -> Self {
        Ili9341 {
            bus,
            rotation: Rotation::default(),
        }
    }

    pub fn release(self) -> B {
        self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Width in the current orientation
    pub fn width(&self) -> u16 {
        if self.rotation.is_landscape() {
            HEIGHT
        } else {
            WIDTH
        }
    }

    /// Height in the current orientation
    pub fn height(&self) -> u16 {
        if self.rotation.is_landscape() {
            WIDTH
        } else {
            HEIGHT
        }
    }

    /// Initialise the controller
    ///
    /// The bus must already have been set up with [`DataBus::begin`].
    pub fn init(&mut self, delay: &mut impl DelayNs) {
        log::info!("ILI9341: software reset");
        self.bus.send_command(Cmd::SWRESET);
        delay.delay_ms(Flag::RST_DELAY_MS);

        log::info!("ILI9341: init sequence ({} ops)", INIT_OPS.len());
        self.run_ops(INIT_OPS, delay);
        self.set_rotation(self.rotation);
        log::info!("ILI9341: ready, {}x{}", self.width(), self.height());
    }

    /// Run a batched command table inside one transaction
    pub fn run_ops(&mut self, ops: &[Op], delay: &mut impl DelayNs) {
        self.bus.begin_write();
        for op in ops {
            match *op {
                Op::Command(c) => self.bus.write_command(c),
                Op::Data(d) => self.bus.write(d),
                Op::Delay(ms) => {
                    self.bus.flush_data_buf();
                    delay.delay_ms(ms);
                }
            }
        }
        self.bus.end_write();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.bus.begin_write();
        self.bus.write_command(Cmd::MADCTL);
        self.bus.write(rotation.madctl());
        self.bus.end_write();
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.bus
            .send_command(if invert { Cmd::INVON } else { Cmd::INVOFF });
    }

    pub fn sleep(&mut self, delay: &mut impl DelayNs) {
        self.bus.send_command(Cmd::DISPOFF);
        self.bus.send_command(Cmd::SLPIN);
        delay.delay_ms(Flag::SLPIN_DELAY_MS);
    }

    pub fn wake_up(&mut self, delay: &mut impl DelayNs) {
        self.bus.send_command(Cmd::SLPOUT);
        delay.delay_ms(Flag::SLPOUT_DELAY_MS);
        self.bus.send_command(Cmd::DISPON);
    }

    // ==================== Helper Functions ====================

    /// Set the column / page window and start a memory write.
    /// Must be called inside a transaction.
    fn set_addr_window(&mut self, x: u16, y: u16, w: u16, h: u16) {
        self.bus.write_command(Cmd::CASET);
        self.bus.write16(x);
        self.bus.write16(x + w - 1);
        self.bus.write_command(Cmd::PASET);
        self.bus.write16(y);
        self.bus.write16(y + h - 1);
        self.bus.write_command(Cmd::RAMWR);
    }

    /// Clip a rectangle to the visible area
    fn clip(&self, x: i32, y: i32, w: u32, h: u32) -> Option<(u16, u16, u16, u16)> {
        let area = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return None;
        }
        // The intersection lies inside the panel, every value fits in u16
        Some((
            area.top_left.x as u16,
            area.top_left.y as u16,
            area.size.width as u16,
            area.size.height as u16,
        ))
    }

    // ==================== End of Helper Functions ====================

    /// Fill a rectangle with one RGB565 colour, clipped to the panel
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u16) {
        let Some((x, y, w, h)) = self.clip(x, y, w, h) else {
            return;
        };
        self.bus.begin_write();
        self.set_addr_window(x, y, w, h);
        self.bus.write_repeat(color, u32::from(w) * u32::from(h));
        self.bus.end_write();
    }

    /// Blit big-endian RGB565 pixels, row by row
    ///
    /// The rectangle has to lie fully inside the panel and `data` must hold
    /// exactly `w * h * 2` bytes.
    pub fn draw_raw(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        if u32::from(x) + u32::from(w) > u32::from(self.width())
            || u32::from(y) + u32::from(h) > u32::from(self.height())
        {
            return Err(DisplayError::OutOfBoundsError);
        }
        if data.len() != usize::from(w) * usize::from(h) * 2 {
            log::warn!(
                "draw_raw: {} bytes for a {}x{} window",
                data.len(),
                w,
                h
            );
            return Err(DisplayError::InvalidFormatError);
        }
        self.bus.begin_write();
        self.set_addr_window(x, y, w, h);
        self.bus.write_pixels(data);
        self.bus.end_write();
        Ok(())
    }
}

impl<B: DataBus> OriginDimensions for Ili9341<B> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl<B: DataBus> DrawTarget for Ili9341<B> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        self.bus.begin_write();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            self.set_addr_window(point.x as u16, point.y as u16, 1, 1);
            self.bus.write16(color.into_storage());
        }
        self.bus.end_write();
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let visible = area.intersection(&self.bounding_box());
        if visible != *area {
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        }
        if area.is_zero_sized() {
            return Ok(());
        }
        self.bus.begin_write();
        self.set_addr_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            area.size.width as u16,
            area.size.height as u16,
        );
        let count = area.size.width * area.size.height;
        for color in colors.into_iter().take(count as usize) {
            self.bus.write16(color.into_storage());
        }
        self.bus.end_write();
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color.into_storage(),
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            0,
            0,
            u32::from(self.width()),
            u32::from(self.height()),
            color.into_storage(),
        );
        Ok(())
    }
}
