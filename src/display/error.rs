/*
 *  display/error.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the display subsystem
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

use std::fmt;
use std::error::Error;

/// Unified error type for all display operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// I2C communication error
    I2cError(String),

    /// SPI communication error
    SpiError(String),

    /// GPIO pin error (D/C or reset line)
    GpioError(String),

    /// A command carried more parameter bytes than a frame can hold
    TooManyParameters { opcode: u8, count: usize },

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Framebuffer size mismatch
    BufferSizeMismatch { expected: usize, actual: usize },
}

impl DisplayError {
    /// True when the error came from the underlying bus or a control line,
    /// i.e. a write may not have reached the panel.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DisplayError::I2cError(_) | DisplayError::SpiError(_) | DisplayError::GpioError(_)
        )
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::I2cError(msg) =>
                write!(f, "I2C communication error: {}", msg),
            DisplayError::SpiError(msg) =>
                write!(f, "SPI communication error: {}", msg),
            DisplayError::GpioError(msg) =>
                write!(f, "GPIO error: {}", msg),
            DisplayError::TooManyParameters { opcode, count } =>
                write!(f, "Command 0x{:02X} has too many parameters: {}", opcode, count),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Buffer size mismatch: expected {} bytes, got {}", expected, actual),
        }
    }
}

impl Error for DisplayError {}

/// Factory error types
#[derive(Debug)]
pub enum DisplayFactoryError {
    /// No bus configuration specified
    NoBusConfiguration,

    /// Bus kind not available in this build
    UnsupportedBus(String),

    /// Display driver initialization failed
    DriverInitFailed(DisplayError),

    /// Configuration validation error
    ConfigError(String),
}

impl fmt::Display for DisplayFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayFactoryError::NoBusConfiguration =>
                write!(f, "No bus configuration specified"),
            DisplayFactoryError::UnsupportedBus(kind) =>
                write!(f, "Unsupported bus: {}", kind),
            DisplayFactoryError::DriverInitFailed(err) =>
                write!(f, "Driver initialization failed: {}", err),
            DisplayFactoryError::ConfigError(msg) =>
                write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for DisplayFactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayFactoryError::DriverInitFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DisplayError> for DisplayFactoryError {
    fn from(err: DisplayError) -> Self {
        DisplayFactoryError::DriverInitFailed(err)
    }
}
