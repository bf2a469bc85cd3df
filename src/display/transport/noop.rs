/*
 *  display/transport/noop.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Transport that accepts everything and sends nothing
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
use crate::display::transport::Transport;

/// Host-side stand-in for a bus.
///
/// Every write succeeds immediately. Nothing is buffered or logged; wrap
/// your own spy around [`Transport`] when the frames matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopTransport;

impl NoopTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for NoopTransport {
    fn write_command(&mut self, _opcode: u8, _params: &[u8]) -> Result<(), DisplayError> {
        Ok(())
    }

    fn write_data(&mut self, _data: &[u8]) -> Result<(), DisplayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_always_succeeds() {
        let mut t = NoopTransport::new();
        assert!(t.write_command(0xAF, &[]).is_ok());
        assert!(t.write_data(&[0xFF; 1024]).is_ok());
        assert!(!t.has_reset_line());
        assert!(t.assert_reset().is_ok());
        assert!(t.release_reset().is_ok());
    }
}
