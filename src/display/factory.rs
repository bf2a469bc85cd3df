/*
 *  display/factory.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Build a display controller from configuration
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::{Arc, Mutex};

use log::info;

use crate::config::{BusConfig, DisplayConfig};
use crate::display::drivers::mock::MockSsd1306;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::DisplayController;
use crate::display::SharedDisplay;

#[cfg(feature = "linux-hal")]
use log::debug;

#[cfg(feature = "linux-hal")]
use crate::display::drivers::ssd1306::Ssd1306;
#[cfg(feature = "linux-hal")]
use crate::display::transport::{I2cTransport, SpiTransport};

/// Type alias for boxed display controller trait objects
pub type BoxedDisplay = Box<dyn DisplayController>;

#[cfg(feature = "linux-hal")]
const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";
#[cfg(feature = "linux-hal")]
const DEFAULT_SPI_SPEED_HZ: u32 = 8_000_000;
#[cfg(feature = "linux-hal")]
const GPIO_CONSUMER: &str = "ssd1306-pi";

/// Factory for creating display controllers from configuration
pub struct DisplayFactory;

impl DisplayFactory {
    /// Create a display controller from configuration
    ///
    /// The bus section picks the wiring: `mock` needs no hardware, `i2c`
    /// and `spi` open Linux character devices. The returned controller has
    /// not been started; call `startup` before drawing.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     bus: Some(BusConfig::I2c {
    ///         bus: "/dev/i2c-1".to_string(),
    ///         address: 0x3C,
    ///     }),
    ///     ..Default::default()
    /// };
    ///
    /// let mut display = DisplayFactory::create_from_config(&config)?;
    /// display.startup(false)?;
    /// ```
    pub fn create_from_config(
        config: &DisplayConfig
    ) -> Result<BoxedDisplay, DisplayFactoryError> {
        Self::validate_config(config)?;

        let width = config.width_or_default();
        let height = config.height_or_default();
        let bus_config = config.bus.as_ref()
            .ok_or(DisplayFactoryError::NoBusConfiguration)?;

        info!("Creating {}x{} display on {:?}", width, height, bus_config);

        match bus_config {
            BusConfig::Mock => Ok(Box::new(MockSsd1306::new(width, height)?)),

            #[cfg(feature = "linux-hal")]
            BusConfig::I2c { bus, address } => Self::create_i2c(bus, *address, width, height),

            #[cfg(feature = "linux-hal")]
            BusConfig::Spi { bus, speed_hz, gpio_chip, dc_pin, rst_pin } => Self::create_spi(
                bus,
                speed_hz.unwrap_or(DEFAULT_SPI_SPEED_HZ),
                gpio_chip.as_deref().unwrap_or(DEFAULT_GPIO_CHIP),
                *dc_pin,
                *rst_pin,
                width,
                height,
            ),

            #[cfg(not(feature = "linux-hal"))]
            BusConfig::I2c { .. } => Err(DisplayFactoryError::UnsupportedBus(
                "i2c requires the linux-hal feature".to_string()
            )),

            #[cfg(not(feature = "linux-hal"))]
            BusConfig::Spi { .. } => Err(DisplayFactoryError::UnsupportedBus(
                "spi requires the linux-hal feature".to_string()
            )),
        }
    }

    #[cfg(feature = "linux-hal")]
    fn create_i2c(
        bus: &str,
        address: u8,
        width: u32,
        height: u32,
    ) -> Result<BoxedDisplay, DisplayFactoryError> {
        use linux_embedded_hal::{Delay, I2cdev};

        debug!("Opening {} at 0x{:02X}", bus, address);
        let i2c = I2cdev::new(bus).map_err(|e| {
            DisplayFactoryError::ConfigError(format!("Failed to open {}: {:?}", bus, e))
        })?;

        let display = Ssd1306::new(I2cTransport::new(i2c, address), Delay, width, height)?;
        Ok(Box::new(display))
    }

    #[cfg(feature = "linux-hal")]
    #[allow(clippy::too_many_arguments)]
    fn create_spi(
        bus: &str,
        speed_hz: u32,
        gpio_chip: &str,
        dc_pin: u32,
        rst_pin: Option<u32>,
        width: u32,
        height: u32,
    ) -> Result<BoxedDisplay, DisplayFactoryError> {
        use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
        use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
        use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};

        debug!("Opening {} at {} Hz, D/C line {} on {}", bus, speed_hz, dc_pin, gpio_chip);
        let mut spi = SpidevDevice::open(bus).map_err(|e| {
            DisplayFactoryError::ConfigError(format!("Failed to open {}: {:?}", bus, e))
        })?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(|e| {
            DisplayFactoryError::ConfigError(format!("Failed to configure {}: {:?}", bus, e))
        })?;

        let mut chip = Chip::new(gpio_chip).map_err(|e| {
            DisplayFactoryError::ConfigError(format!("Failed to open {}: {:?}", gpio_chip, e))
        })?;

        // both lines idle high: data selected, reset released
        let mut output = |line: u32| -> Result<CdevPin, DisplayFactoryError> {
            let handle = chip
                .get_line(line)
                .and_then(|l| l.request(LineRequestFlags::OUTPUT, 1, GPIO_CONSUMER))
                .map_err(|e| {
                    DisplayFactoryError::ConfigError(format!("GPIO line {}: {:?}", line, e))
                })?;
            CdevPin::new(handle).map_err(|e| {
                DisplayFactoryError::ConfigError(format!("GPIO line {}: {:?}", line, e))
            })
        };

        let dc = output(dc_pin)?;
        let rst = rst_pin.map(&mut output).transpose()?;

        let transport = SpiTransport::new(spi, dc, rst);
        let display = Ssd1306::new(transport, Delay, width, height)?;
        Ok(Box::new(display))
    }

    /// Push the optional panel settings from configuration to a started display
    pub fn apply_settings(
        display: &mut dyn DisplayController,
        config: &DisplayConfig,
    ) -> Result<(), DisplayFactoryError> {
        if let Some(contrast) = config.contrast {
            display.set_contrast(contrast as i32)?;
        }
        if let Some(invert) = config.invert {
            display.set_inverted(invert)?;
        }
        if let Some(offset) = config.offset {
            display.set_offset(offset as i32)?;
        }
        if let Some(v_flip) = config.v_flip {
            display.set_v_flipped(v_flip)?;
        }
        if let Some(h_flip) = config.h_flip {
            display.set_h_flipped(h_flip)?;
        }
        Ok(())
    }

    /// Wrap a display for use from several threads
    pub fn into_shared(display: BoxedDisplay) -> SharedDisplay {
        Arc::new(Mutex::new(display))
    }

    /// Validate a configuration without creating a display
    ///
    /// This is useful for checking configuration at startup before attempting
    /// to initialize hardware.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let _bus_config = config.bus.as_ref()
            .ok_or(DisplayFactoryError::NoBusConfiguration)?;

        let width = config.width_or_default();
        let height = config.height_or_default();
        if width == 0 || width > 128 {
            return Err(DisplayFactoryError::ConfigError(
                format!("Invalid width: {} (must be 1..=128)", width)
            ));
        }
        if height == 0 || height > 64 || height % 8 != 0 {
            return Err(DisplayFactoryError::ConfigError(
                format!("Invalid height: {} (must be a multiple of 8, at most 64)", height)
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> DisplayConfig {
        DisplayConfig {
            height: Some(32),
            bus: Some(BusConfig::Mock),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_config_no_bus() {
        let config = DisplayConfig {
            bus: None,
            ..Default::default()
        };

        assert!(matches!(
            DisplayFactory::validate_config(&config),
            Err(DisplayFactoryError::NoBusConfiguration)
        ));
        assert!(DisplayFactory::create_from_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_height() {
        let config = DisplayConfig {
            height: Some(20), // Invalid!
            ..mock_config()
        };

        assert!(DisplayFactory::validate_config(&config).is_err());
    }

    #[test]
    fn test_create_mock() {
        let display = DisplayFactory::create_from_config(&mock_config()).unwrap();
        assert_eq!(display.width(), 128);
        assert_eq!(display.height(), 32);
        assert_eq!(display.pages(), 4);
        assert!(!display.is_display_on());
    }

    #[test]
    fn test_apply_settings() {
        let config = DisplayConfig {
            contrast: Some(10),
            invert: Some(true),
            h_flip: Some(true),
            v_flip: Some(true),
            offset: Some(4),
            ..mock_config()
        };

        let mut display = DisplayFactory::create_from_config(&config).unwrap();
        display.startup(false).unwrap();
        DisplayFactory::apply_settings(display.as_mut(), &config).unwrap();

        assert_eq!(display.contrast(), 10);
        assert!(display.is_inverted());
        assert!(display.is_h_flipped());
        assert!(display.is_v_flipped());
        assert_eq!(display.offset(), 4);
    }

    #[test]
    fn test_apply_settings_leaves_unset_fields() {
        let config = mock_config();
        let mut display = DisplayFactory::create_from_config(&config).unwrap();
        display.startup(false).unwrap();
        let before = display.state().clone();

        DisplayFactory::apply_settings(display.as_mut(), &config).unwrap();
        assert_eq!(display.state(), &before);
    }
}
