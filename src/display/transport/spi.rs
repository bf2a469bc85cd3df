/*
 *  display/transport/spi.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  4-wire SPI transport: command/data selection on a dedicated D/C line
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

use core::convert::Infallible;

use arrayvec::ArrayVec;
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::spi::SpiDevice;
use log::{debug, trace};

use crate::display::command::MAX_PARAMS;
use crate::display::error::DisplayError;
use crate::display::transport::Transport;

/// Placeholder for panels whose reset line is not wired to the host
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResetPin;

impl ErrorType for NoResetPin {
    type Error = Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// SSD1306 over 4-wire SPI.
///
/// D/C is driven low before an opcode and its parameters, high before
/// display RAM bytes. The bytes go out exactly as given, with no selection
/// byte in front.
#[derive(Debug)]
pub struct SpiTransport<SPI, DC, RST = NoResetPin> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
}

impl<SPI, DC> SpiTransport<SPI, DC, NoResetPin>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    /// Transport for a panel without a reset line
    pub fn without_reset(spi: SPI, dc: DC) -> Self {
        Self { spi, dc, rst: None }
    }
}

impl<SPI, DC, RST> SpiTransport<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>) -> Self {
        Self { spi, dc, rst }
    }

    /// Give the bus and pins back
    pub fn release(self) -> (SPI, DC, Option<RST>) {
        (self.spi, self.dc, self.rst)
    }

    fn select(&mut self, data: bool) -> Result<(), DisplayError> {
        let res = if data { self.dc.set_high() } else { self.dc.set_low() };
        res.map_err(|e| {
            debug!("D/C line failed: {:?}", e);
            DisplayError::GpioError(format!("D/C line: {:?}", e))
        })
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi.write(bytes).map_err(|e| {
            debug!("SPI write of {} bytes failed: {:?}", bytes.len(), e);
            DisplayError::SpiError(format!("write failed: {:?}", e))
        })
    }

    fn drive_reset(&mut self, active: bool) -> Result<(), DisplayError> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        let res = if active { rst.set_low() } else { rst.set_high() };
        res.map_err(|e| {
            debug!("reset line failed: {:?}", e);
            DisplayError::GpioError(format!("reset line: {:?}", e))
        })
    }
}

impl<SPI, DC, RST> Transport for SpiTransport<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn write_command(&mut self, opcode: u8, params: &[u8]) -> Result<(), DisplayError> {
        let mut frame = ArrayVec::<u8, { MAX_PARAMS + 1 }>::new();
        frame.push(opcode);
        frame
            .try_extend_from_slice(params)
            .map_err(|_| DisplayError::TooManyParameters { opcode, count: params.len() })?;

        trace!("spi cmd {:02X?}", &frame[..]);
        self.select(false)?;
        self.write(&frame)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        trace!("spi data {} bytes", data.len());
        self.select(true)?;
        self.write(data)
    }

    fn has_reset_line(&self) -> bool {
        self.rst.is_some()
    }

    fn assert_reset(&mut self) -> Result<(), DisplayError> {
        self.drive_reset(true)
    }

    fn release_reset(&mut self) -> Result<(), DisplayError> {
        self.drive_reset(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn test_dc_line_follows_transfer_kind() {
        let spi_expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x81, 0x9F]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x01, 0x02, 0x03]),
            SpiTransaction::transaction_end(),
        ];
        let dc_expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];

        let mut transport = SpiTransport::without_reset(
            SpiMock::new(&spi_expectations),
            PinMock::new(&dc_expectations),
        );

        transport.write_command(0x81, &[0x9F]).unwrap();
        transport.write_data(&[0x01, 0x02, 0x03]).unwrap();

        let (mut spi, mut dc, _) = transport.release();
        spi.done();
        dc.done();
    }

    #[test]
    fn test_reset_line_levels() {
        let spi_expectations: [SpiTransaction<u8>; 0] = [];
        let dc_expectations: [PinTransaction; 0] = [];
        let rst_expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];

        let mut transport = SpiTransport::new(
            SpiMock::new(&spi_expectations),
            PinMock::new(&dc_expectations),
            Some(PinMock::new(&rst_expectations)),
        );

        assert!(transport.has_reset_line());
        transport.assert_reset().unwrap();
        transport.release_reset().unwrap();

        let (mut spi, mut dc, rst) = transport.release();
        spi.done();
        dc.done();
        rst.unwrap().done();
    }

    #[test]
    fn test_missing_reset_line_is_noop() {
        let spi_expectations: [SpiTransaction<u8>; 0] = [];
        let dc_expectations: [PinTransaction; 0] = [];
        let mut transport = SpiTransport::without_reset(
            SpiMock::new(&spi_expectations),
            PinMock::new(&dc_expectations),
        );

        assert!(!transport.has_reset_line());
        assert!(transport.assert_reset().is_ok());
        assert!(transport.release_reset().is_ok());

        let (mut spi, mut dc, _) = transport.release();
        spi.done();
        dc.done();
    }

    #[test]
    fn test_dc_failure_aborts_write() {
        let spi_expectations: [SpiTransaction<u8>; 0] = [];
        let mut transport = SpiTransport::without_reset(SpiMock::new(&spi_expectations), BrokenPin);

        let err = transport.write_command(0xAF, &[]).unwrap_err();
        assert!(matches!(err, DisplayError::GpioError(_)));
        assert!(transport.write_data(&[0x00]).is_err());

        let (mut spi, _, _) = transport.release();
        spi.done();
    }
}
