//! Data/command line drivers
//!
//! DC toggles on every command/data boundary, so the fast path writes the pin
//! mask straight into the GPIO write-one-to-set / write-one-to-clear registers
//! instead of going through a generic pin API. Low selects command, high data.

use embedded_hal::digital::OutputPin;

use crate::esp32spi::error::ConfigError;
use crate::esp32spi::pins::BusConfig;

/// ESP32 GPIO output registers (write one to set / clear)
mod reg {
    pub const GPIO_OUT_W1TS: usize = 0x3FF4_4008;
    pub const GPIO_OUT_W1TC: usize = 0x3FF4_400C;
    pub const GPIO_OUT1_W1TS: usize = 0x3FF4_4014;
    pub const GPIO_OUT1_W1TC: usize = 0x3FF4_4018;
}

const GPIO_PIN_COUNT: u8 = 40;
const FIRST_INPUT_ONLY_PIN: u8 = 34;

/// Drives the line that tells the controller what the bytes on the bus are
pub trait ControlLine {
    /// DC low: the following bytes are a command
    fn assert_command(&mut self);

    /// DC high: the following bytes are parameters or pixels
    fn assert_data(&mut self);
}

impl<T: ControlLine + ?Sized> ControlLine for &mut T {
    fn assert_command(&mut self) {
        T::assert_command(self);
    }

    fn assert_data(&mut self) {
        T::assert_data(self);
    }
}

/// Set/clear register pair and bit mask for one GPIO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLinePorts {
    pub set: usize,
    pub clear: usize,
    pub mask: u32,
}

impl ControlLinePorts {
    /// Registers driving `pin`.
    ///
    /// GPIO0..31 live in the first output bank, GPIO32..39 in the second.
    /// GPIO34..39 have no output driver.
    pub fn for_pin(pin: u8) -> Result<Self, ConfigError> {
        if pin >= GPIO_PIN_COUNT {
            return Err(ConfigError::InvalidPin(pin));
        }
        if pin >= FIRST_INPUT_ONLY_PIN {
            return Err(ConfigError::InputOnlyPin(pin));
        }

        let ports = if pin < 32 {
            Self {
                set: reg::GPIO_OUT_W1TS,
                clear: reg::GPIO_OUT_W1TC,
                mask: 1 << pin,
            }
        } else {
            Self {
                set: reg::GPIO_OUT1_W1TS,
                clear: reg::GPIO_OUT1_W1TC,
                mask: 1 << (pin - 32),
            }
        };
        Ok(ports)
    }

    /// Ports for the DC pin of `config`; `None` when the bus has no DC line
    pub fn from_config(config: &BusConfig) -> Result<Option<Self>, ConfigError> {
        config.dc().map(Self::for_pin).transpose()
    }
}

/// Raw 32-bit register store
pub trait RegisterWrite {
    fn write(&mut self, addr: usize, value: u32);
}

/// Volatile stores to physical addresses
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every address later passed to [`RegisterWrite::write`] must be a valid,
    /// aligned, memory mapped register on the running chip. Only
    /// [`ControlLinePorts::for_pin`] addresses are written by this crate.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterWrite for Mmio {
    #[inline(always)]
    fn write(&mut self, addr: usize, value: u32) {
        // SAFETY: upheld by the caller of `Mmio::new`
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }
}

/// Fast path: one register store per transition
#[derive(Debug)]
pub struct RegisterControlLine<W> {
    ports: ControlLinePorts,
    regs: W,
}

impl<W: RegisterWrite> RegisterControlLine<W> {
    pub fn new(ports: ControlLinePorts, regs: W) -> Self {
        Self { ports, regs }
    }

    pub fn ports(&self) -> ControlLinePorts {
        self.ports
    }

    /// Give back the register writer
    pub fn release(self) -> W {
        self.regs
    }
}

impl<W: RegisterWrite> ControlLine for RegisterControlLine<W> {
    #[inline(always)]
    fn assert_command(&mut self) {
        self.regs.write(self.ports.clear, self.ports.mask);
    }

    #[inline(always)]
    fn assert_data(&mut self) {
        self.regs.write(self.ports.set, self.ports.mask);
    }
}

/// Slow path through an `embedded-hal` output pin
pub struct PinControlLine<P> {
    pin: P,
}

impl<P: OutputPin> PinControlLine<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ControlLine for PinControlLine<P> {
    fn assert_command(&mut self) {
        if let Err(e) = self.pin.set_low() {
            log::error!("DC pin set_low failed: {:?}", e);
        }
    }

    fn assert_data(&mut self) {
        if let Err(e) = self.pin.set_high() {
            log::error!("DC pin set_high failed: {:?}", e);
        }
    }
}

/// No DC line (3-wire panels, 9-bit framing)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControlLine;

impl ControlLine for NoControlLine {
    fn assert_command(&mut self) {}

    fn assert_data(&mut self) {}
}
