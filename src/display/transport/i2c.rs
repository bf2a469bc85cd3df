/*
 *  display/transport/i2c.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  I2C transport: command/data selection folded into a control byte
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

use arrayvec::ArrayVec;
use embedded_hal::i2c::I2c;
use log::{debug, trace};

use crate::display::command::{DC_BIT, MAX_PARAMS};
use crate::display::error::DisplayError;
use crate::display::transport::Transport;

/// Control byte announcing a command transfer
pub const CONTROL_COMMAND: u8 = 0 << DC_BIT;

/// Control byte announcing a data transfer
pub const CONTROL_DATA: u8 = 1 << DC_BIT;

/// Typical 7-bit addresses (SA0 low / high)
pub const ADDRESS_PRIMARY: u8 = 0x3C;
pub const ADDRESS_SECONDARY: u8 = 0x3D;

/// SSD1306 over I2C.
///
/// Every message is a single bus write led by a control byte: bit 6 clear
/// for commands, set for data. Opcode and parameters travel together in
/// one transfer. There is no reset line on this bus.
#[derive(Debug)]
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cTransport<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        self.i2c.write(self.address, frame).map_err(|e| {
            debug!("I2C write to 0x{:02X} failed: {:?}", self.address, e);
            DisplayError::I2cError(format!("write to 0x{:02X} failed: {:?}", self.address, e))
        })
    }
}

impl<I2C: I2c> Transport for I2cTransport<I2C> {
    fn write_command(&mut self, opcode: u8, params: &[u8]) -> Result<(), DisplayError> {
        let mut frame = ArrayVec::<u8, { MAX_PARAMS + 2 }>::new();
        frame.push(CONTROL_COMMAND);
        frame.push(opcode);
        frame
            .try_extend_from_slice(params)
            .map_err(|_| DisplayError::TooManyParameters { opcode, count: params.len() })?;

        trace!("i2c cmd {:02X?}", &frame[1..]);
        self.write(&frame)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(CONTROL_DATA);
        frame.extend_from_slice(data);

        trace!("i2c data {} bytes", data.len());
        self.write(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn test_control_bytes() {
        assert_eq!(CONTROL_COMMAND & (1 << 6), 0);
        assert_eq!(CONTROL_DATA & (1 << 6), 1 << 6);
        assert_eq!(CONTROL_DATA, 0x40);
    }

    #[test]
    fn test_command_is_one_transfer() {
        let expectations = [
            I2cTransaction::write(0x3C, vec![0x00, 0x81, 0xCF]),
            I2cTransaction::write(0x3C, vec![0x00, 0x27, 0x00, 0x00, 0x07, 0x07, 0x00, 0xFF]),
            I2cTransaction::write(0x3C, vec![0x00, 0xAF]),
        ];
        let mut transport = I2cTransport::new(I2cMock::new(&expectations), 0x3C);

        transport.write_command(0x81, &[0xCF]).unwrap();
        transport.write_command(0x27, &[0x00, 0x00, 0x07, 0x07, 0x00, 0xFF]).unwrap();
        transport.write_command(0xAF, &[]).unwrap();

        transport.release().done();
    }

    #[test]
    fn test_data_sets_dc_bit() {
        let expectations = [
            I2cTransaction::write(0x3D, vec![0x40, 0xDE, 0xAD, 0xBE, 0xEF]),
        ];
        let mut transport = I2cTransport::new(I2cMock::new(&expectations), 0x3D);

        transport.write_data(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        transport.release().done();
    }

    #[test]
    fn test_no_reset_line() {
        let expectations: [I2cTransaction; 0] = [];
        let mut transport = I2cTransport::new(I2cMock::new(&expectations), ADDRESS_PRIMARY);
        assert!(!transport.has_reset_line());
        assert!(transport.assert_reset().is_ok());
        assert!(transport.release_reset().is_ok());
        transport.release().done();
    }

    #[test]
    fn test_bus_error_surfaces() {
        let expectations = [
            I2cTransaction::write(0x3C, vec![0x00, 0xAE]).with_error(ErrorKind::Other),
        ];
        let mut transport = I2cTransport::new(I2cMock::new(&expectations), 0x3C);

        let err = transport.write_command(0xAE, &[]).unwrap_err();
        assert!(matches!(err, DisplayError::I2cError(_)));

        transport.release().done();
    }

    #[test]
    fn test_oversized_command_rejected() {
        let expectations: [I2cTransaction; 0] = [];
        let mut transport = I2cTransport::new(I2cMock::new(&expectations), 0x3C);
        let err = transport.write_command(0x27, &[0; MAX_PARAMS + 1]).unwrap_err();
        assert_eq!(err, DisplayError::TooManyParameters { opcode: 0x27, count: MAX_PARAMS + 1 });
        transport.release().done();
    }
}
