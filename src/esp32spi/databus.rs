//! Display data bus contract
//!
//! The operation set higher level panel drivers are written against. It
//! mirrors the Arduino GFX `Arduino_DataBus` class so existing init tables and
//! drawing code translate one to one.

use crate::esp32spi::host::DataMode;

/// Command/data bus towards a display controller.
///
/// Writes are only valid between [`DataBus::begin_write`] and
/// [`DataBus::end_write`]. The `send_*` helpers open and close their own
/// transaction and must be called outside of one.
pub trait DataBus {
    /// Configure clock (`0` = default) and mode. Call once at setup.
    fn begin(&mut self, speed: u32);

    /// Take the bus and select the device
    fn begin_write(&mut self);

    /// Flush, deselect, give the bus back
    fn end_write(&mut self);

    /// Command byte, DC low
    fn write_command(&mut self, c: u8);

    /// 16-bit command, MSB first, DC low
    fn write_command16(&mut self, c: u16);

    /// Send the low nine bits of `c` as one frame, for panels without a DC
    /// line that take the data/command flag as the first bit
    fn write_9bit_command(&mut self, c: u32);

    /// Data byte, DC high
    fn write(&mut self, d: u8);

    /// Data word, MSB first, DC high
    fn write16(&mut self, d: u16);

    fn write32(&mut self, d: u32);

    /// `len` copies of the 16-bit value `p`
    fn write_repeat(&mut self, p: u16, len: u32);

    /// Raw bytes, DC left as is
    fn write_bytes(&mut self, data: &[u8]);

    /// Pixel bytes already in wire order, DC left as is
    fn write_pixels(&mut self, data: &[u8]);

    /// `pattern` repeated `repeat` times
    fn write_pattern(&mut self, pattern: &[u8], repeat: u32);

    /// Push buffered bytes out without ending the transaction
    fn flush_data_buf(&mut self);

    /// Change SPI mode. Not allowed inside a transaction.
    fn set_data_mode(&mut self, mode: DataMode);

    fn send_command(&mut self, c: u8) {
        self.begin_write();
        self.write_command(c);
        self.end_write();
    }

    fn send_command16(&mut self, c: u16) {
        self.begin_write();
        self.write_command16(c);
        self.end_write();
    }

    fn send_data(&mut self, d: u8) {
        self.begin_write();
        self.write(d);
        self.end_write();
    }

    fn send_data16(&mut self, d: u16) {
        self.begin_write();
        self.write16(d);
        self.end_write();
    }

    fn send_data32(&mut self, d: u32) {
        self.begin_write();
        self.write32(d);
        self.end_write();
    }
}

impl<T: DataBus + ?Sized> DataBus for &mut T {
    fn begin(&mut self, speed: u32) {
        T::begin(self, speed);
    }

    fn begin_write(&mut self) {
        T::begin_write(self);
    }

    fn end_write(&mut self) {
        T::end_write(self);
    }

    fn write_command(&mut self, c: u8) {
        T::write_command(self, c);
    }

    fn write_command16(&mut self, c: u16) {
        T::write_command16(self, c);
    }

    fn write_9bit_command(&mut self, c: u32) {
        T::write_9bit_command(self, c);
    }

    fn write(&mut self, d: u8) {
        T::write(self, d);
    }

    fn write16(&mut self, d: u16) {
        T::write16(self, d);
    }

    fn write32(&mut self, d: u32) {
        T::write32(self, d);
    }

    fn write_repeat(&mut self, p: u16, len: u32) {
        T::write_repeat(self, p, len);
    }

    fn write_bytes(&mut self, data: &[u8]) {
        T::write_bytes(self, data);
    }

    fn write_pixels(&mut self, data: &[u8]) {
        T::write_pixels(self, data);
    }

    fn write_pattern(&mut self, pattern: &[u8], repeat: u32) {
        T::write_pattern(self, pattern, repeat);
    }

    fn flush_data_buf(&mut self) {
        T::flush_data_buf(self);
    }

    fn set_data_mode(&mut self, mode: DataMode) {
        T::set_data_mode(self, mode);
    }
}
