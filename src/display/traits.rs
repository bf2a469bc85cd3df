/*
 *  display/traits.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Public contract shared by the hardware controller and its mock
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

use crate::display::command::{CONTRAST_DEFAULT, Opcode, ScrollDirection, ScrollSpeed};
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;

/// Panel state as last commanded by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Panel powered on (DISPLAY_ON) or sleeping
    pub display_on: bool,

    /// Pixel polarity inverted
    pub inverted: bool,

    /// Segment drive current, 0-255
    pub contrast: u8,

    /// Vertical COM shift
    pub offset: u8,

    /// Column order mirrored
    pub h_flipped: bool,

    /// Row scan order mirrored
    pub v_flipped: bool,

    /// A hardware scroll is running
    pub scrolling: bool,
}

impl DisplayState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            display_on: false,
            inverted: false,
            contrast: CONTRAST_DEFAULT,
            offset: 0,
            h_flipped: false,
            v_flipped: false,
            scrolling: false,
        }
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u32 {
        self.height.div_ceil(8)
    }
}

/// Validate panel geometry at construction time
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), DisplayError> {
    if width == 0 || height == 0 {
        return Err(DisplayError::InvalidConfiguration(format!(
            "display dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Operations every SSD1306 display exposes, real or mocked.
///
/// Setters are the only writers of their [`DisplayState`] field: each one
/// updates the field and emits its command together, or does neither when
/// a guard rejects the input. Framebuffer changes only reach the panel
/// through [`display`](DisplayController::display).
pub trait DisplayController: Send {
    /// Last commanded panel state
    fn state(&self) -> &DisplayState;

    fn framebuffer(&self) -> &FrameBuffer;

    fn framebuffer_mut(&mut self) -> &mut FrameBuffer;

    /// Reset and initialise the panel, leaving it on and blank.
    ///
    /// `external_vcc` selects the power scheme: the internal charge pump is
    /// used when false.
    fn startup(&mut self, external_vcc: bool) -> Result<(), DisplayError>;

    /// Blank the panel, power it down and pulse reset
    fn shutdown(&mut self) -> Result<(), DisplayError> {
        self.clear();
        self.display()?;
        self.set_display_on(false)?;
        self.reset()
    }

    /// Pulse the reset line; a no-op when none is wired
    fn reset(&mut self) -> Result<(), DisplayError>;

    /// Zero the framebuffer. Nothing is sent until [`display`](Self::display).
    fn clear(&mut self) {
        self.framebuffer_mut().erase();
    }

    /// Send the whole framebuffer to display RAM.
    ///
    /// Relies on the full-panel address window set by `startup`, with the
    /// RAM pointer back at (0, 0). Use [`redraw`](Self::redraw) after raw
    /// [`data`](Self::data) writes or a failed transfer.
    fn display(&mut self) -> Result<(), DisplayError>;

    /// Re-arm the full-panel column and page window, then send the framebuffer
    fn redraw(&mut self) -> Result<(), DisplayError> {
        let (width, pages) = (self.width() as i32, self.pages() as i32);
        self.command(Opcode::SetColumnAddress, &[0, width - 1])?;
        self.command(Opcode::SetPageAddress, &[0, pages - 1])?;
        self.display()
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Takes effect immediately
    fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError>;

    /// Values outside 0-255 are ignored: no command, no state change
    fn set_contrast(&mut self, contrast: i32) -> Result<(), DisplayError>;

    /// Shift the image vertically by `offset` rows (truncated to a byte)
    fn set_offset(&mut self, offset: i32) -> Result<(), DisplayError>;

    /// Mirror columns. Only takes effect once display RAM is rewritten, so
    /// this redraws the framebuffer after sending the command.
    fn set_h_flipped(&mut self, h_flipped: bool) -> Result<(), DisplayError>;

    /// Mirror rows. Takes effect immediately.
    fn set_v_flipped(&mut self, v_flipped: bool) -> Result<(), DisplayError>;

    /// Configure a horizontal scroll over pages `start..=end`. Does not start it.
    fn scroll_horizontally(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        end: u8,
        speed: ScrollSpeed,
    ) -> Result<(), DisplayError>;

    /// Configure a combined vertical and horizontal scroll. `offset` and
    /// `rows` bound the vertical scroll area, `step` is the vertical shift
    /// per frame. Does not start it.
    #[allow(clippy::too_many_arguments)]
    fn scroll_diagonally(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        end: u8,
        offset: u8,
        rows: u8,
        speed: ScrollSpeed,
        step: u8,
    ) -> Result<(), DisplayError>;

    fn start_scroll(&mut self) -> Result<(), DisplayError>;

    fn stop_scroll(&mut self) -> Result<(), DisplayError>;

    fn no_op(&mut self) -> Result<(), DisplayError>;

    /// Send a raw command; parameters are truncated to a byte each
    fn command(&mut self, opcode: Opcode, params: &[i32]) -> Result<(), DisplayError>;

    /// Send raw display RAM bytes.
    ///
    /// A write shorter than the framebuffer leaves the RAM pointer mid-window,
    /// so the next [`display`](Self::display) lands shifted. Follow raw writes
    /// with [`redraw`](Self::redraw).
    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    fn width(&self) -> u32 {
        self.state().width
    }

    fn height(&self) -> u32 {
        self.state().height
    }

    fn pages(&self) -> u32 {
        self.state().pages()
    }

    fn is_display_on(&self) -> bool {
        self.state().display_on
    }

    fn is_inverted(&self) -> bool {
        self.state().inverted
    }

    fn contrast(&self) -> u8 {
        self.state().contrast
    }

    fn offset(&self) -> u8 {
        self.state().offset
    }

    fn is_h_flipped(&self) -> bool {
        self.state().h_flipped
    }

    fn is_v_flipped(&self) -> bool {
        self.state().v_flipped
    }

    fn is_scrolling(&self) -> bool {
        self.state().scrolling
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        self.framebuffer_mut().set_pixel(x, y, on);
    }

    fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        self.framebuffer().get_pixel(x, y)
    }

    /// Replace the framebuffer with a raw display RAM image
    fn set_buffer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.framebuffer_mut().load(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults() {
        let state = DisplayState::new(128, 64);
        assert_eq!(state.pages(), 8);
        assert_eq!(state.contrast, CONTRAST_DEFAULT);
        assert!(!state.display_on && !state.inverted && !state.scrolling);
        assert!(!state.h_flipped && !state.v_flipped);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(check_dimensions(0, 64).is_err());
        assert!(check_dimensions(128, 0).is_err());
        assert!(check_dimensions(128, 32).is_ok());
    }
}
