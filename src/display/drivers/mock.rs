/*
 *  display/drivers/mock.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock SSD1306 for testing without hardware
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

use log::debug;

use crate::display::command::{Opcode, ScrollDirection, ScrollSpeed};
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{DisplayController, DisplayState, check_dimensions};

/// Mock SSD1306 display
///
/// Same contract as the real driver with every bus write removed. State
/// setters and the contrast guard behave exactly as on hardware, so tests
/// can assert on [`DisplayState`] transitions alone. Useful for:
/// - Unit tests
/// - Integration tests
/// - Development without a panel attached
#[derive(Debug, Clone)]
pub struct MockSsd1306 {
    /// Last commanded state
    state: DisplayState,

    /// Framebuffer for drawing operations
    framebuffer: FrameBuffer,

    /// Call counters for sequence checks
    stats: MockStats,
}

/// Call counters kept by the mock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockStats {
    /// Number of times reset() was called
    pub reset_count: usize,

    /// Number of times display() was called
    pub display_count: usize,

    /// Number of commands that would have been sent
    pub command_count: usize,

    /// Number of raw data() calls
    pub data_count: usize,
}

impl MockSsd1306 {
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        check_dimensions(width, height)?;

        Ok(Self {
            state: DisplayState::new(width, height),
            framebuffer: FrameBuffer::new(width, height),
            stats: MockStats::default(),
        })
    }

    pub fn stats(&self) -> MockStats {
        self.stats
    }

    /// Reset call counters (useful between test phases)
    pub fn reset_stats(&mut self) {
        self.stats = MockStats::default();
    }

    fn emit(&mut self) {
        self.stats.command_count += 1;
    }
}

impl DisplayController for MockSsd1306 {
    fn state(&self) -> &DisplayState {
        &self.state
    }

    fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    fn startup(&mut self, external_vcc: bool) -> Result<(), DisplayError> {
        debug!("Mock startup (external VCC: {})", external_vcc);
        self.reset()?;
        self.set_inverted(false)?;
        self.set_display_on(true)?;
        self.clear();
        self.display()
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.stats.reset_count += 1;
        Ok(())
    }

    fn display(&mut self) -> Result<(), DisplayError> {
        self.stats.display_count += 1;
        Ok(())
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.emit();
        self.state.display_on = on;
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.emit();
        self.state.inverted = inverted;
        Ok(())
    }

    fn set_contrast(&mut self, contrast: i32) -> Result<(), DisplayError> {
        if !(0..=255).contains(&contrast) {
            debug!("Ignoring out of range contrast {}", contrast);
            return Ok(());
        }

        self.emit();
        self.state.contrast = contrast as u8;
        Ok(())
    }

    fn set_offset(&mut self, offset: i32) -> Result<(), DisplayError> {
        self.emit();
        self.state.offset = offset as u8;
        Ok(())
    }

    fn set_h_flipped(&mut self, h_flipped: bool) -> Result<(), DisplayError> {
        self.emit();
        self.state.h_flipped = h_flipped;
        self.display()
    }

    fn set_v_flipped(&mut self, v_flipped: bool) -> Result<(), DisplayError> {
        self.emit();
        self.state.v_flipped = v_flipped;
        Ok(())
    }

    fn scroll_horizontally(
        &mut self,
        _direction: ScrollDirection,
        _start: u8,
        _end: u8,
        _speed: ScrollSpeed,
    ) -> Result<(), DisplayError> {
        self.emit();
        Ok(())
    }

    fn scroll_diagonally(
        &mut self,
        _direction: ScrollDirection,
        _start: u8,
        _end: u8,
        _offset: u8,
        _rows: u8,
        _speed: ScrollSpeed,
        _step: u8,
    ) -> Result<(), DisplayError> {
        self.emit();
        self.emit();
        Ok(())
    }

    fn start_scroll(&mut self) -> Result<(), DisplayError> {
        self.emit();
        self.state.scrolling = true;
        Ok(())
    }

    fn stop_scroll(&mut self) -> Result<(), DisplayError> {
        self.emit();
        self.state.scrolling = false;
        Ok(())
    }

    fn no_op(&mut self) -> Result<(), DisplayError> {
        self.emit();
        Ok(())
    }

    fn command(&mut self, _opcode: Opcode, _params: &[i32]) -> Result<(), DisplayError> {
        self.emit();
        Ok(())
    }

    fn data(&mut self, _data: &[u8]) -> Result<(), DisplayError> {
        self.stats.data_count += 1;
        Ok(())
    }
}
