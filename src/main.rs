//! Demo firmware: ILI9341 on the VSPI host of an ESP32 DevKit
//!
//! Brings the bus up through the host registry, drives DC through the GPIO
//! set/clear registers, then fills the screen, prints some text and blits the
//! splash image converted by `build.rs`.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("databus-demo only runs on the ESP-IDF target (xtensa-esp32-espidf)")
}

#[cfg(target_os = "espidf")]
mod firmware {
    use embedded_graphics::mono_font::ascii::FONT_10X20;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::pixelcolor::Rgb565;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use embedded_graphics::{prelude::*, text::Text};

    use esp_idf_svc::hal::delay::Delay;
    use esp_idf_svc::hal::gpio::{self, Pin};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::spi;

    use esp32spi_databus::esp32spi::esp::EspPeripheral;
    use esp32spi_databus::esp32spi::{
        BusId, ControlLinePorts, DataBus, Esp32Spi, Mmio, Pins, RegisterControlLine,
        SpiHostRegistry,
    };
    use esp32spi_databus::panel::{self, Ili9341};

    // Big-endian RGB565, 240x320, empty when splash.png was missing at build time
    const SPLASH: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/splash.bin"));

    // https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
    pub fn run() -> anyhow::Result<()> {
        // It is necessary to call this function once. Otherwise some patches to the runtime
        // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
        esp_idf_svc::sys::link_patches();

        // Bind the log crate to the ESP Logging facilities
        esp_idf_svc::log::EspLogger::initialize_default();

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;
        let mut delay = Delay::default();

        log::info!("Configuring VSPI");
        let config = Pins::bus_config();
        let (sck, mosi) = (pins.gpio18, pins.gpio23);
        config.verify_bus_pins(
            u8::try_from(sck.pin()).ok(),
            u8::try_from(mosi.pin()).ok(),
            None,
        )?;
        let driver = spi::SpiDriver::new(
            peripherals.spi3,
            sck,
            mosi,
            Option::<gpio::AnyIOPin>::None,
            &spi::SpiDriverConfig::new(),
        )?;

        let mut registry: SpiHostRegistry<EspPeripheral<'static>> = SpiHostRegistry::new();
        let host = registry.register(BusId::Vspi, EspPeripheral::new(driver))?;

        // The pin driver puts GPIO2 in output mode; after that DC is toggled
        // straight through the W1TS / W1TC registers.
        let _dc_pin = gpio::PinDriver::output(pins.gpio2)?; // Pins::DC
        let ports = ControlLinePorts::from_config(&config)?
            .ok_or_else(|| anyhow::anyhow!("demo board needs a DC pin"))?;
        // SAFETY: only the GPIO output set/clear registers of the pin above are written
        let dc = RegisterControlLine::new(ports, unsafe { Mmio::new() });

        let cs = gpio::PinDriver::output(pins.gpio5)?; // Pins::CS
        let mut rst = gpio::PinDriver::output(pins.gpio4)?; // Pins::RST
        let mut backlight = gpio::PinDriver::output(pins.gpio15)?; // Pins::BL

        let mut bus = Esp32Spi::new(config, host, dc, Some(cs));
        bus.begin(0);

        log::info!("Resetting panel");
        panel::hard_reset(&mut rst, &mut delay).map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let mut display = Ili9341::new(bus);
        display.init(&mut delay);
        backlight.set_high()?;

        log::info!("Filling screen");
        display.clear(Rgb565::BLACK)?;

        let bar_height = u32::from(display.height()) / 4;
        for (i, color) in [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE]
            .into_iter()
            .enumerate()
        {
            Rectangle::new(
                Point::new(0, i as i32 * bar_height as i32),
                Size::new(u32::from(display.width()), bar_height),
            )
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut display)?;
        }

        let text_style = MonoTextStyle::new(&FONT_10X20, Rgb565::BLACK);
        Text::new("esp32spi databus", Point::new(20, 300), text_style).draw(&mut display)?;
        delay.delay_ms(3000);

        if SPLASH.is_empty() {
            log::warn!("Splash image not available (splash.png not found at build time)");
        } else {
            log::info!("Splash image embedded, size: {} bytes", SPLASH.len());
            display
                .draw_raw(0, 0, panel::WIDTH, panel::HEIGHT, SPLASH)
                .map_err(|e| anyhow::anyhow!("Failed to draw splash: {:?}", e))?;
        }

        log::info!("Demo done");
        Ok(())
    }
}
