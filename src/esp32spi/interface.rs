//! Display bus over an ESP32 SPI host
use std::convert::Infallible;
use std::sync::Arc;

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::esp32spi::buffer::{TransactionBuffer, DATA_BUF_LEN};
use crate::esp32spi::clock::{ClockDivider, APB_CLK_FREQ, DEFAULT_SPEED};
use crate::esp32spi::control::ControlLine;
use crate::esp32spi::databus::DataBus;
use crate::esp32spi::encoder::{encode16, encode32, encode_words16_into};
use crate::esp32spi::host::{BitOrder, BusSettings, DataMode, SpiHost, SpiPeripheral};
use crate::esp32spi::lock::BusLock;
use crate::esp32spi::pins::BusConfig;

/// Placeholder for an unwired chip select
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// What the controller is told the current bytes are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Command,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Idle,
    Open,
}

/// Buffered display bus on one ESP32 SPI host
///
/// ## Type Parameters
///
/// - `P` - transmit path of the shared host
/// - `L` - lock strategy of the shared host
/// - `DC` - Data/Command line (Low for command, High for data)
/// - `CS` - chip select output, [`NoPin`] when the panel is hard wired
pub struct Esp32Spi<P, L, DC, CS = NoPin> {
    config: BusConfig,
    host: Arc<SpiHost<P, L>>,
    dc: DC,
    cs: Option<CS>,
    settings: BusSettings,
    buffer: TransactionBuffer,
    phase: Phase,
    state: TransactionState,
}

impl<P, L, DC, CS> Esp32Spi<P, L, DC, CS> {
    /// Bind a bus to `host`. Nothing touches the hardware before `begin`.
    pub fn new(config: BusConfig, host: Arc<SpiHost<P, L>>, dc: DC, cs: Option<CS>) -> Self {
        Esp32Spi {
            config,
            host,
            dc,
            cs,
            settings: BusSettings::default(),
            buffer: TransactionBuffer::new(),
            phase: Phase::Data,
            state: TransactionState::Idle,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Clock, mode and bit order applied on every `begin_write`
    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Inside `begin_write` / `end_write`
    pub fn is_open(&self) -> bool {
        self.state == TransactionState::Open
    }

    /// Bytes buffered but not transmitted yet
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn host(&self) -> &Arc<SpiHost<P, L>> {
        &self.host
    }

    /// Take the bus apart
    pub fn release(self) -> (Arc<SpiHost<P, L>>, DC, Option<CS>) {
        (self.host, self.dc, self.cs)
    }
}

impl<P, L, DC, CS> Esp32Spi<P, L, DC, CS>
where
    P: SpiPeripheral,
    L: BusLock,
    DC: ControlLine,
    CS: OutputPin,
{
    /// Switch DC, sending whatever belongs to the previous phase first
    fn enter_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        self.flush_data_buf();
        match phase {
            Phase::Command => self.dc.assert_command(),
            Phase::Data => self.dc.assert_data(),
        }
        self.phase = phase;
    }

    fn push(&mut self, bytes: &[u8]) {
        debug_assert!(self.is_open(), "bus write outside begin_write/end_write");
        let host = &self.host;
        self.buffer
            .append(bytes, &mut |chunk: &[u8]| host.transmit(chunk));
    }

    fn push_cycle(&mut self, pattern: &[u8], total: u64) {
        debug_assert!(self.is_open(), "bus write outside begin_write/end_write");
        let host = &self.host;
        self.buffer
            .append_cycle(pattern, total, &mut |chunk: &[u8]| host.transmit(chunk));
    }

    fn cs_low(&mut self) {
        if let Some(cs) = self.cs.as_mut() {
            if let Err(e) = cs.set_low() {
                log::error!("CS pin set_low failed: {:?}", e);
            }
        }
    }

    fn cs_high(&mut self) {
        if let Some(cs) = self.cs.as_mut() {
            if let Err(e) = cs.set_high() {
                log::error!("CS pin set_high failed: {:?}", e);
            }
        }
    }

    /// Change bit order. Not allowed inside a transaction.
    pub fn set_bit_order(&mut self, order: BitOrder) {
        debug_assert!(!self.is_open(), "bit order changed inside a transaction");
        self.settings.bit_order = order;
    }

    /// Native 16-bit pixels, sent MSB first. DC is left as is.
    pub fn write_pixels16(&mut self, pixels: &[u16]) {
        let mut chunk = [0u8; DATA_BUF_LEN];
        let mut rest = pixels;
        while !rest.is_empty() {
            let words = encode_words16_into(rest, &mut chunk);
            self.push(&chunk[..words * 2]);
            rest = &rest[words..];
        }
    }

    fn push_format(&mut self, format: DataFormat<'_>) -> Result<(), DisplayError> {
        match format {
            DataFormat::U8(bytes) => self.push(bytes),
            DataFormat::U16(words) => {
                for word in words {
                    self.push(&word.to_ne_bytes());
                }
            }
            DataFormat::U16BE(words) => self.write_pixels16(words),
            DataFormat::U16LE(words) => {
                for word in words.iter() {
                    self.push(&word.to_le_bytes());
                }
            }
            DataFormat::U8Iter(iter) => {
                for byte in iter {
                    self.push(&[byte]);
                }
            }
            DataFormat::U16BEIter(iter) => {
                for word in iter {
                    self.push(&encode16(word));
                }
            }
            DataFormat::U16LEIter(iter) => {
                for word in iter {
                    self.push(&word.to_le_bytes());
                }
            }
            _ => return Err(DisplayError::DataFormatNotImplemented),
        }
        Ok(())
    }

    fn send_format(&mut self, phase: Phase, format: DataFormat<'_>) -> Result<(), DisplayError> {
        self.begin_write();
        self.enter_phase(phase);
        let result = self.push_format(format);
        self.end_write();
        result
    }
}

impl<P, L, DC, CS> DataBus for Esp32Spi<P, L, DC, CS>
where
    P: SpiPeripheral,
    L: BusLock,
    DC: ControlLine,
    CS: OutputPin,
{
    fn begin(&mut self, speed: u32) {
        let speed = match (speed, self.config.speed()) {
            (0, 0) => DEFAULT_SPEED,
            (0, configured) => configured,
            (requested, _) => requested,
        };

        self.settings = BusSettings {
            clock_div: ClockDivider::from_frequency(speed, APB_CLK_FREQ),
            data_mode: DataMode::Mode0,
            bit_order: BitOrder::MsbFirst,
        };

        self.dc.assert_data();
        self.phase = Phase::Data;
        self.cs_high();

        let lock = self.host.lock();
        lock.acquire();
        self.host.configure(&self.settings);
        lock.release();

        log::info!(
            "SPI bus {:?}: requested {} Hz, running at {} Hz (clock reg 0x{:08X})",
            self.host.id(),
            speed,
            self.settings.frequency(),
            self.settings.clock_div.raw()
        );
    }

    fn begin_write(&mut self) {
        debug_assert!(!self.is_open(), "begin_write inside an open transaction");
        self.host.lock().acquire();
        self.host.configure(&self.settings);
        self.dc.assert_data();
        self.phase = Phase::Data;
        self.cs_low();
        self.state = TransactionState::Open;
    }

    fn end_write(&mut self) {
        debug_assert!(self.is_open(), "end_write without begin_write");
        self.flush_data_buf();
        self.cs_high();
        self.state = TransactionState::Idle;
        self.host.lock().release();
    }

    fn write_command(&mut self, c: u8) {
        self.enter_phase(Phase::Command);
        self.push(&[c]);
    }

    fn write_command16(&mut self, c: u16) {
        self.enter_phase(Phase::Command);
        self.push(&encode16(c));
    }

    fn write_9bit_command(&mut self, c: u32) {
        debug_assert!(self.is_open(), "bus write outside begin_write/end_write");
        self.flush_data_buf();
        self.host.transmit_bits(c & 0x1FF, 9);
    }

    fn write(&mut self, d: u8) {
        self.enter_phase(Phase::Data);
        self.push(&[d]);
    }

    fn write16(&mut self, d: u16) {
        self.enter_phase(Phase::Data);
        self.push(&encode16(d));
    }

    fn write32(&mut self, d: u32) {
        self.enter_phase(Phase::Data);
        self.push(&encode32(d));
    }

    fn write_repeat(&mut self, p: u16, len: u32) {
        self.enter_phase(Phase::Data);
        self.push_cycle(&encode16(p), cycle_len(2, len));
    }

    fn write_bytes(&mut self, data: &[u8]) {
        self.push(data);
    }

    fn write_pixels(&mut self, data: &[u8]) {
        self.push(data);
    }

    fn write_pattern(&mut self, pattern: &[u8], repeat: u32) {
        self.enter_phase(Phase::Data);
        self.push_cycle(pattern, cycle_len(pattern.len(), repeat));
    }

    fn flush_data_buf(&mut self) {
        let host = &self.host;
        self.buffer.flush(&mut |chunk: &[u8]| host.transmit(chunk));
    }

    fn set_data_mode(&mut self, mode: DataMode) {
        debug_assert!(!self.is_open(), "data mode changed inside a transaction");
        self.settings.data_mode = mode;
    }
}

impl<P, L, DC, CS> WriteOnlyDataCommand for Esp32Spi<P, L, DC, CS>
where
    P: SpiPeripheral,
    L: BusLock,
    DC: ControlLine,
    CS: OutputPin,
{
    fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), DisplayError> {
        self.send_format(Phase::Command, cmd)
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        self.send_format(Phase::Data, buf)
    }
}

/// Bytes in `repeat` copies of a `unit` byte pattern, saturating
fn cycle_len(unit: usize, repeat: u32) -> u64 {
    u64::try_from(unit)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(repeat))
}
