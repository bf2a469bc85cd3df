/*
 *  display/transport/mod.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Byte transports carrying SSD1306 command and data frames
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

use crate::display::error::DisplayError;

pub mod i2c;
pub mod noop;
pub mod spi;

pub use i2c::I2cTransport;
pub use noop::NoopTransport;
pub use spi::SpiTransport;

/// Minimal write-only link to the controller.
///
/// A transport knows how to mark a transfer as command or data (selection
/// bit on I2C, D/C line on SPI) and, where wired, how to drive the reset
/// line. It holds no display state of its own. Every bus or pin failure is
/// returned to the caller.
pub trait Transport {
    /// Send an opcode and its parameters as one command transfer
    fn write_command(&mut self, opcode: u8, params: &[u8]) -> Result<(), DisplayError>;

    /// Send raw display RAM bytes as one data transfer
    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    /// Whether a reset line is wired to this transport
    fn has_reset_line(&self) -> bool {
        false
    }

    /// Drive the reset line to its active (low) level
    fn assert_reset(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Return the reset line to its inactive (high) level
    fn release_reset(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_command(&mut self, opcode: u8, params: &[u8]) -> Result<(), DisplayError> {
        (**self).write_command(opcode, params)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        (**self).write_data(data)
    }

    fn has_reset_line(&self) -> bool {
        (**self).has_reset_line()
    }

    fn assert_reset(&mut self) -> Result<(), DisplayError> {
        (**self).assert_reset()
    }

    fn release_reset(&mut self) -> Result<(), DisplayError> {
        (**self).release_reset()
    }
}
