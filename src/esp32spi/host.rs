//! SPI peripherals and the per-process host registry
//!
//! Each ESP32 SPI unit is wrapped in a [`SpiHost`]: the transmit capability,
//! the lock that serializes transactions, and the bus number. Hosts live in a
//! [`SpiHostRegistry`] filled once at startup; display buses borrow a shared
//! handle to one slot.

use std::sync::{Arc, Mutex, PoisonError};

use crate::esp32spi::clock::{ClockDivider, APB_CLK_FREQ, DEFAULT_SPEED};
use crate::esp32spi::error::ConfigError;
use crate::esp32spi::lock::{BusLock, DefaultLock};
use crate::esp32spi::SPI_BUS_COUNT;

/// Hardware transmit path.
///
/// Implementations block until the bytes are on the wire and never report
/// failure to the caller; faults are logged and dropped.
pub trait SpiPeripheral {
    /// Apply clock divider, SPI mode and bit order
    fn configure(&mut self, settings: &BusSettings);

    /// Clock out `bytes` in order
    fn transmit(&mut self, bytes: &[u8]);

    /// Clock out the low `bits` bits of `word`, most significant first.
    ///
    /// Used for 9-bit frames where the data/command flag travels as the first bit.
    fn transmit_bits(&mut self, word: u32, bits: u8);
}

/// SPI clock polarity / phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl From<u8> for DataMode {
    /// Arduino `SPI_MODEn` numbering, upper bits ignored
    fn from(mode: u8) -> Self {
        match mode & 0x03 {
            0 => DataMode::Mode0,
            1 => DataMode::Mode1,
            2 => DataMode::Mode2,
            _ => DataMode::Mode3,
        }
    }
}

impl From<DataMode> for embedded_hal::spi::Mode {
    fn from(mode: DataMode) -> Self {
        match mode {
            DataMode::Mode0 => embedded_hal::spi::MODE_0,
            DataMode::Mode1 => embedded_hal::spi::MODE_1,
            DataMode::Mode2 => embedded_hal::spi::MODE_2,
            DataMode::Mode3 => embedded_hal::spi::MODE_3,
        }
    }
}

/// Bit order within each byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// Mode state applied to the peripheral at `begin` and on every `begin_write`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    pub clock_div: ClockDivider,
    pub data_mode: DataMode,
    pub bit_order: BitOrder,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            clock_div: ClockDivider::from_frequency(DEFAULT_SPEED, APB_CLK_FREQ),
            data_mode: DataMode::Mode0,
            bit_order: BitOrder::MsbFirst,
        }
    }
}

impl BusSettings {
    /// Bus clock in Hz these settings produce from the APB clock
    pub const fn frequency(&self) -> u32 {
        self.clock_div.frequency(APB_CLK_FREQ)
    }
}

/// Driver-side device built for one set of [`BusSettings`].
///
/// Backends whose driver bakes clock, mode and bit order into a device handle
/// keep it here and rebuild it only when `begin_write` hands over different
/// settings.
pub struct DeviceCache<D> {
    settings: Option<BusSettings>,
    device: Option<D>,
}

impl<D> Default for DeviceCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DeviceCache<D> {
    pub const fn new() -> Self {
        Self {
            settings: None,
            device: None,
        }
    }

    /// Make sure the cached device matches `settings`.
    ///
    /// The old device is dropped before `build` runs, so a driver that limits
    /// devices per bus always has a free slot. A failed build is logged, leaves
    /// the cache empty and is retried on the next call. Returns `true` when
    /// `build` was called.
    pub fn update<E, F>(&mut self, settings: &BusSettings, build: F) -> bool
    where
        E: core::fmt::Debug,
        F: FnOnce(&BusSettings) -> Result<D, E>,
    {
        if self.device.is_some() && self.settings.as_ref() == Some(settings) {
            return false;
        }

        self.device = None;
        self.settings = None;
        match build(settings) {
            Ok(device) => {
                log::debug!(
                    "SPI device: {} Hz, {:?}, {:?}",
                    settings.frequency(),
                    settings.data_mode,
                    settings.bit_order
                );
                self.device = Some(device);
                self.settings = Some(*settings);
            }
            Err(e) => log::error!("SPI device setup failed: {:?}", e),
        }
        true
    }

    /// Settings the cached device was built with
    pub fn settings(&self) -> Option<&BusSettings> {
        self.settings.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }
}

/// ESP32 SPI unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BusId {
    /// Flash cache bus
    Spi0 = 0,
    /// Flash bus
    Spi1 = 1,
    /// General purpose SPI2
    Hspi = 2,
    /// General purpose SPI3, the usual display bus
    Vspi = 3,
}

impl BusId {
    pub const ALL: [BusId; SPI_BUS_COUNT] = [BusId::Spi0, BusId::Spi1, BusId::Hspi, BusId::Vspi];

    /// Slot index in the registry
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `ETS_SPIn_INTR_SOURCE` of this unit
    pub const fn interrupt_source(self) -> u32 {
        match self {
            BusId::Spi0 => 28,
            BusId::Spi1 => 29,
            BusId::Hspi => 30,
            BusId::Vspi => 31,
        }
    }
}

impl TryFrom<u8> for BusId {
    type Error = ConfigError;

    fn try_from(bus: u8) -> Result<Self, Self::Error> {
        BusId::ALL
            .get(usize::from(bus))
            .copied()
            .ok_or(ConfigError::InvalidBus(bus))
    }
}

/// One SPI unit shared by every display bus wired to it
pub struct SpiHost<P, L = DefaultLock> {
    id: BusId,
    lock: L,
    peripheral: Mutex<P>,
}

impl<P, L> SpiHost<P, L>
where
    P: SpiPeripheral,
    L: BusLock,
{
    /// Wrap `peripheral` with the default-constructed lock strategy
    pub fn new(id: BusId, peripheral: P) -> Self
    where
        L: Default,
    {
        Self::with_lock(id, peripheral, L::default())
    }

    pub fn with_lock(id: BusId, peripheral: P, lock: L) -> Self {
        Self {
            id,
            lock,
            peripheral: Mutex::new(peripheral),
        }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// Transaction lock of this unit
    pub fn lock(&self) -> &L {
        &self.lock
    }

    pub fn configure(&self, settings: &BusSettings) {
        self.with_peripheral(|p| p.configure(settings));
    }

    /// Blocking transmit; returns once the peripheral is done
    pub fn transmit(&self, bytes: &[u8]) {
        self.with_peripheral(|p| p.transmit(bytes));
    }

    pub fn transmit_bits(&self, word: u32, bits: u8) {
        self.with_peripheral(|p| p.transmit_bits(word, bits));
    }

    /// Run `f` with exclusive access to the peripheral
    pub fn with_peripheral<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let mut peripheral = self
            .peripheral
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut peripheral)
    }
}

/// Fixed table of SPI hosts indexed by [`BusId`]
pub struct SpiHostRegistry<P, L = DefaultLock> {
    slots: [Option<Arc<SpiHost<P, L>>>; SPI_BUS_COUNT],
}

impl<P, L> Default for SpiHostRegistry<P, L> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }
}

impl<P, L> SpiHostRegistry<P, L>
where
    P: SpiPeripheral,
    L: BusLock,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `peripheral` in the slot for `id`, with a default lock
    pub fn register(&mut self, id: BusId, peripheral: P) -> Result<Arc<SpiHost<P, L>>, ConfigError>
    where
        L: Default,
    {
        self.register_with_lock(id, peripheral, L::default())
    }

    pub fn register_with_lock(
        &mut self,
        id: BusId,
        peripheral: P,
        lock: L,
    ) -> Result<Arc<SpiHost<P, L>>, ConfigError> {
        let slot = &mut self.slots[id.index()];
        if slot.is_some() {
            return Err(ConfigError::SlotOccupied(id as u8));
        }
        let host = Arc::new(SpiHost::with_lock(id, peripheral, lock));
        *slot = Some(Arc::clone(&host));
        log::info!("Registered SPI host {:?}", id);
        Ok(host)
    }

    /// Shared handle to the host registered for `id`
    pub fn host(&self, id: BusId) -> Result<Arc<SpiHost<P, L>>, ConfigError> {
        self.slots[id.index()]
            .as_ref()
            .map(Arc::clone)
            .ok_or(ConfigError::SlotEmpty(id as u8))
    }

    /// Same as [`SpiHostRegistry::host`] from a raw bus number
    pub fn host_by_number(&self, bus: u8) -> Result<Arc<SpiHost<P, L>>, ConfigError> {
        self.host(BusId::try_from(bus)?)
    }

    /// Registered hosts in bus order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpiHost<P, L>>> {
        self.slots.iter().flatten()
    }
}
