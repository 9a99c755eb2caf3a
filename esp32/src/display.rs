// SSD1306 128x64 OLED on the shared I2C bus, at the alternate address 0x3D.

use atmosphere_boi_common::display::TextDisplay;
use atmosphere_boi_common::report::OLED_COLUMNS;
use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

const ROWS: usize = 8;
const ROW_HEIGHT: i32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum OledError {
    #[error("display interface error: {0}")]
    Interface(String),
}

fn interface_error(e: impl core::fmt::Debug) -> OledError {
    OledError::Interface(format!("{e:?}"))
}

type Driver<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct Oled<I2C> {
    driver: Driver<I2C>,
}

impl<I2C: I2c> Oled<I2C> {
    /// Initializes the panel and blanks it.
    pub fn new(i2c: I2C) -> Result<Self, OledError> {
        let interface = I2CDisplayInterface::new_alternate_address(i2c);
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        driver.init().map_err(interface_error)?;
        driver.clear_buffer();
        driver.flush().map_err(interface_error)?;

        Ok(Self { driver })
    }
}

impl<I2C: I2c> TextDisplay for Oled<I2C> {
    type Error = OledError;

    fn columns(&self) -> usize {
        OLED_COLUMNS
    }

    fn show(&mut self, lines: &[String]) -> Result<(), Self::Error> {
        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);

        self.driver.clear_buffer();
        for (row, line) in lines.iter().take(ROWS).enumerate() {
            Text::with_baseline(
                line,
                Point::new(0, row as i32 * ROW_HEIGHT),
                style,
                Baseline::Top,
            )
            .draw(&mut self.driver)
            .map_err(interface_error)?;
        }
        self.driver.flush().map_err(interface_error)
    }
}
