//! ESP-IDF transmit path
//!
//! Runs on top of the IDF SPI master driver. One device is attached to the
//! shared driver and kept across flushes; it is only rebuilt when `begin` or
//! `set_data_mode` hand over different settings. Chip select stays with
//! [`Esp32Spi`](crate::esp32spi::Esp32Spi), so the device is added without one.
//!
//! 9-bit frames go through `spi_device_polling_transmit` with a bit-exact
//! transaction length.

use std::sync::Arc;

use esp_idf_svc::hal::gpio::AnyOutputPin;
use esp_idf_svc::hal::spi::{config, SpiDeviceDriver, SpiDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{
    esp, spi_device_polling_transmit, spi_transaction_t, spi_transaction_t__bindgen_ty_1,
    EspError, SPI_TRANS_USE_TXDATA,
};

use crate::esp32spi::encoder::encode_frame;
use crate::esp32spi::host::{BitOrder, BusSettings, DeviceCache, SpiPeripheral};

type Device<'d> = SpiDeviceDriver<'d, Arc<SpiDriver<'d>>>;

pub struct EspPeripheral<'d> {
    driver: Arc<SpiDriver<'d>>,
    device: DeviceCache<Device<'d>>,
}

impl<'d> EspPeripheral<'d> {
    pub fn new(driver: SpiDriver<'d>) -> Self {
        let mut peripheral = Self {
            driver: Arc::new(driver),
            device: DeviceCache::new(),
        };
        peripheral.configure(&BusSettings::default());
        peripheral
    }

    fn device_config(settings: &BusSettings) -> config::Config {
        let bit_order = match settings.bit_order {
            BitOrder::MsbFirst => config::BitOrder::MsbFirst,
            BitOrder::LsbFirst => config::BitOrder::LsbFirst,
        };
        config::Config::new()
            .baudrate(Hertz(settings.frequency()))
            .data_mode(settings.data_mode.into())
            .bit_order(bit_order)
            .write_only(true)
    }

    fn polling_transmit(device: &Device<'d>, frame: [u8; 4], bits: u8) -> Result<(), EspError> {
        let mut transaction = spi_transaction_t {
            flags: SPI_TRANS_USE_TXDATA,
            length: usize::from(bits),
            __bindgen_anon_1: spi_transaction_t__bindgen_ty_1 { tx_data: frame },
            ..Default::default()
        };
        // SAFETY: the handle belongs to a live device and the frame is stored
        // inline in the transaction, which outlives the blocking call
        esp!(unsafe { spi_device_polling_transmit(device.device(), &mut transaction) })
    }
}

impl SpiPeripheral for EspPeripheral<'_> {
    fn configure(&mut self, settings: &BusSettings) {
        let driver = &self.driver;
        self.device.update(settings, |settings| {
            SpiDeviceDriver::new(
                Arc::clone(driver),
                Option::<AnyOutputPin>::None,
                &Self::device_config(settings),
            )
        });
    }

    fn transmit(&mut self, bytes: &[u8]) {
        let Some(device) = self.device.device_mut() else {
            log::error!("SPI write of {} bytes dropped: no device", bytes.len());
            return;
        };
        if let Err(e) = device.write(bytes) {
            log::error!("SPI write of {} bytes failed: {:?}", bytes.len(), e);
        }
    }

    fn transmit_bits(&mut self, word: u32, bits: u8) {
        let Some(frame) = encode_frame(word, bits) else {
            log::error!("{}-bit frame 0x{:03X} dropped: bad width", bits, word);
            return;
        };
        let Some(device) = self.device.device_mut() else {
            log::error!("{}-bit frame 0x{:03X} dropped: no device", bits, word);
            return;
        };
        if let Err(e) = Self::polling_transmit(device, frame, bits) {
            log::error!("{}-bit frame 0x{:03X} failed: {:?}", bits, word, e);
        }
    }
}
