/*
 *  display/drivers/ssd1306.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 display controller over any transport
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

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace};

use crate::display::command::{
    CHARGE_PUMP_DISABLE, CHARGE_PUMP_ENABLE, COM_PINS_ALTERNATING, COM_PINS_SEQUENTIAL,
    CommandMessage, DISPLAY_CLOCK_DIV_DEFAULT, DUMMY_BYTE_00, DUMMY_BYTE_FF,
    MEMORY_MODE_HORIZONTAL, Opcode, ScrollDirection, ScrollSpeed, VCOMH_DESELECT_LEVEL_20,
};
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{DisplayController, DisplayState, check_dimensions};
use crate::display::transport::Transport;

/// Reset line timing, in milliseconds
const RESET_SETTLE_MS: u32 = 1;
const RESET_HOLD_MS: u32 = 10;

/// SSD1306 driver.
///
/// Owns the transport, the framebuffer and the last commanded panel state.
/// `D` provides the reset pulse timing.
#[derive(Debug)]
pub struct Ssd1306<T, D> {
    transport: T,
    delay: D,
    state: DisplayState,
    framebuffer: FrameBuffer,
}

impl<T, D> Ssd1306<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Create a driver for a `width` x `height` panel.
    ///
    /// Nothing is sent to the panel until [`startup`](DisplayController::startup).
    pub fn new(transport: T, delay: D, width: u32, height: u32) -> Result<Self, DisplayError> {
        check_dimensions(width, height)?;

        Ok(Self {
            transport,
            delay,
            state: DisplayState::new(width, height),
            framebuffer: FrameBuffer::new(width, height),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport and delay back
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn send(&mut self, opcode: Opcode, params: &[i32]) -> Result<(), DisplayError> {
        let msg = CommandMessage::new(opcode, params)?;
        trace!("{:?} {:02X?}", opcode, msg.params());
        self.transport.write_command(msg.opcode(), msg.params())
    }

    fn scroll_opcode(direction: ScrollDirection, diagonal: bool) -> Opcode {
        match (direction, diagonal) {
            (ScrollDirection::Left, false) => Opcode::LeftHorizontalScroll,
            (ScrollDirection::Right, false) => Opcode::RightHorizontalScroll,
            (ScrollDirection::Left, true) => Opcode::VerticalAndLeftHorizontalScroll,
            (ScrollDirection::Right, true) => Opcode::VerticalAndRightHorizontalScroll,
        }
    }
}

impl<T, D> DisplayController for Ssd1306<T, D>
where
    T: Transport + Send,
    D: DelayNs + Send,
{
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
        let (width, height, pages) = (self.state.width, self.state.height, self.state.pages());
        info!(
            "Starting SSD1306 {}x{} ({} VCC)",
            width,
            height,
            if external_vcc { "external" } else { "internal" }
        );

        self.reset()?;
        self.set_display_on(false)?;
        // RAM writes while a scroll is running corrupt the image
        self.stop_scroll()?;

        self.send(Opcode::SetDisplayClockDiv, &[DISPLAY_CLOCK_DIV_DEFAULT as i32])?;
        self.send(Opcode::SetMultiplexRatio, &[height as i32 - 1])?;
        self.set_offset(0)?;
        self.send(Opcode::SetStartLine, &[])?;
        self.send(
            Opcode::SetChargePump,
            &[(if external_vcc { CHARGE_PUMP_DISABLE } else { CHARGE_PUMP_ENABLE }) as i32],
        )?;
        self.send(Opcode::SetMemoryMode, &[MEMORY_MODE_HORIZONTAL as i32])?;
        // full-panel window so every display() wraps back to (0, 0)
        self.send(Opcode::SetColumnAddress, &[0, width as i32 - 1])?;
        self.send(Opcode::SetPageAddress, &[0, pages as i32 - 1])?;
        // no redraw here: RAM is rewritten once the panel is on
        self.send(Opcode::SetSegmentRemapReverse, &[])?;
        self.state.h_flipped = false;
        self.set_v_flipped(false)?;
        self.send(
            Opcode::SetComPins,
            &[(if height == 64 { COM_PINS_ALTERNATING } else { COM_PINS_SEQUENTIAL }) as i32],
        )?;
        self.set_contrast(if external_vcc { 0x9F } else { 0xCF })?;
        self.send(Opcode::SetPrechargePeriod, &[if external_vcc { 0x22 } else { 0xF1 }])?;
        self.send(Opcode::SetVcomhDeselect, &[VCOMH_DESELECT_LEVEL_20 as i32])?;
        self.send(Opcode::DisplayAllOnResume, &[])?;

        self.set_inverted(false)?;
        self.set_display_on(true)?;
        self.clear();
        self.display()?;

        info!("SSD1306 started");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        info!("Shutting down SSD1306");
        self.clear();
        self.display()?;
        self.set_display_on(false)?;
        self.reset()
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        if !self.transport.has_reset_line() {
            debug!("No reset line, skipping reset pulse");
            return Ok(());
        }

        debug!("Pulsing reset line");
        self.transport.release_reset()?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.transport.assert_reset()?;
        self.delay.delay_ms(RESET_HOLD_MS);
        self.transport.release_reset()
    }

    fn display(&mut self) -> Result<(), DisplayError> {
        trace!("display {} bytes", self.framebuffer.len());
        self.transport.write_data(self.framebuffer.as_bytes())
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.send(if on { Opcode::DisplayOn } else { Opcode::DisplayOff }, &[])?;
        self.state.display_on = on;
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.send(if inverted { Opcode::InvertDisplay } else { Opcode::NormalDisplay }, &[])?;
        self.state.inverted = inverted;
        Ok(())
    }

    fn set_contrast(&mut self, contrast: i32) -> Result<(), DisplayError> {
        if !(0..=255).contains(&contrast) {
            debug!("Ignoring out of range contrast {}", contrast);
            return Ok(());
        }

        self.send(Opcode::SetContrast, &[contrast])?;
        self.state.contrast = contrast as u8;
        Ok(())
    }

    fn set_offset(&mut self, offset: i32) -> Result<(), DisplayError> {
        self.send(Opcode::SetDisplayOffset, &[offset])?;
        self.state.offset = offset as u8;
        Ok(())
    }

    fn set_h_flipped(&mut self, h_flipped: bool) -> Result<(), DisplayError> {
        let op = if h_flipped { Opcode::SetSegmentRemap } else { Opcode::SetSegmentRemapReverse };
        self.send(op, &[])?;
        // the panel has the remap now, even if the redraw below fails
        self.state.h_flipped = h_flipped;

        // column remap only applies to data written after it
        self.display()
    }

    fn set_v_flipped(&mut self, v_flipped: bool) -> Result<(), DisplayError> {
        self.send(if v_flipped { Opcode::SetComScanInc } else { Opcode::SetComScanDec }, &[])?;
        self.state.v_flipped = v_flipped;
        Ok(())
    }

    fn scroll_horizontally(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        end: u8,
        speed: ScrollSpeed,
    ) -> Result<(), DisplayError> {
        self.send(
            Self::scroll_opcode(direction, false),
            &[
                DUMMY_BYTE_00 as i32,
                start as i32,
                speed as i32,
                end as i32,
                DUMMY_BYTE_00 as i32,
                DUMMY_BYTE_FF as i32,
            ],
        )
    }

    fn scroll_diagonally(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        end: u8,
        offset: u8,
        rows: u8,
        speed: ScrollSpeed,
        step: u8,
    ) -> Result<(), DisplayError> {
        self.send(Opcode::SetVerticalScrollArea, &[offset as i32, rows as i32])?;
        self.send(
            Self::scroll_opcode(direction, true),
            &[DUMMY_BYTE_00 as i32, start as i32, speed as i32, end as i32, step as i32],
        )
    }

    fn start_scroll(&mut self) -> Result<(), DisplayError> {
        self.send(Opcode::ActivateScroll, &[])?;
        self.state.scrolling = true;
        Ok(())
    }

    fn stop_scroll(&mut self) -> Result<(), DisplayError> {
        self.send(Opcode::DeactivateScroll, &[])?;
        self.state.scrolling = false;
        Ok(())
    }

    fn no_op(&mut self) -> Result<(), DisplayError> {
        self.send(Opcode::Noop, &[])
    }

    fn command(&mut self, opcode: Opcode, params: &[i32]) -> Result<(), DisplayError> {
        self.send(opcode, params)
    }

    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.transport.write_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Frame {
        Cmd(u8, Vec<u8>),
        Data(Vec<u8>),
        Reset(bool),
    }

    #[derive(Debug, Default)]
    struct Recorder {
        frames: Vec<Frame>,
        reset_line: bool,
    }

    impl Transport for Recorder {
        fn write_command(&mut self, opcode: u8, params: &[u8]) -> Result<(), DisplayError> {
            self.frames.push(Frame::Cmd(opcode, params.to_vec()));
            Ok(())
        }

        fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
            self.frames.push(Frame::Data(data.to_vec()));
            Ok(())
        }

        fn has_reset_line(&self) -> bool {
            self.reset_line
        }

        fn assert_reset(&mut self) -> Result<(), DisplayError> {
            self.frames.push(Frame::Reset(true));
            Ok(())
        }

        fn release_reset(&mut self) -> Result<(), DisplayError> {
            self.frames.push(Frame::Reset(false));
            Ok(())
        }
    }

    fn display(width: u32, height: u32) -> Ssd1306<Recorder, NoopDelay> {
        let recorder = Recorder { reset_line: true, ..Default::default() };
        Ssd1306::new(recorder, NoopDelay::new(), width, height).unwrap()
    }

    fn commands(frames: &[Frame]) -> Vec<(u8, Vec<u8>)> {
        frames
            .iter()
            .filter_map(|f| match f {
                Frame::Cmd(op, p) => Some((*op, p.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_zero_size() {
        assert!(Ssd1306::new(Recorder::default(), NoopDelay::new(), 0, 64).is_err());
    }

    #[test]
    fn test_reset_pulse() {
        let mut d = display(128, 64);
        d.reset().unwrap();
        assert_eq!(
            d.transport().frames,
            vec![Frame::Reset(false), Frame::Reset(true), Frame::Reset(false)]
        );
    }

    #[test]
    fn test_reset_without_line_sends_nothing() {
        let mut d = Ssd1306::new(Recorder::default(), NoopDelay::new(), 128, 64).unwrap();
        d.reset().unwrap();
        d.reset().unwrap();
        assert!(d.transport().frames.is_empty());
    }

    #[test]
    fn test_startup_init_block_internal_vcc() {
        let mut d = display(128, 64);
        d.startup(false).unwrap();

        let cmds = commands(&d.transport().frames);
        assert!(cmds.contains(&(0xA8, vec![63])));
        assert!(cmds.contains(&(0x8D, vec![CHARGE_PUMP_ENABLE])));
        assert!(cmds.contains(&(0xDA, vec![COM_PINS_ALTERNATING])));
        assert!(cmds.contains(&(0x81, vec![0xCF])));
        assert!(cmds.contains(&(0xD9, vec![0xF1])));
        assert!(cmds.contains(&(0x21, vec![0, 127])));
        assert!(cmds.contains(&(0x22, vec![0, 7])));

        assert!(d.is_display_on());
        assert!(!d.is_inverted());
        assert!(!d.is_h_flipped() && !d.is_v_flipped());
        assert!(!d.is_scrolling());
        assert_eq!(d.contrast(), 0xCF);
    }

    #[test]
    fn test_startup_powers_on_before_first_data() {
        let mut d = display(128, 64);
        d.set_pixel(5, 5, true);
        d.startup(false).unwrap();

        let frames = &d.transport().frames;
        let on = frames.iter().position(|f| *f == Frame::Cmd(0xAF, vec![])).unwrap();
        let data: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| matches!(f, Frame::Data(_)))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(data.len(), 1);
        assert!(on < data[0]);
        assert_eq!(frames[data[0]], Frame::Data(vec![0; 1024]));
        assert!(commands(frames).contains(&(0xA1, vec![])));
    }

    #[test]
    fn test_startup_init_block_external_vcc_128x32() {
        let mut d = display(128, 32);
        d.startup(true).unwrap();

        let cmds = commands(&d.transport().frames);
        assert!(cmds.contains(&(0xA8, vec![31])));
        assert!(cmds.contains(&(0x8D, vec![CHARGE_PUMP_DISABLE])));
        assert!(cmds.contains(&(0xDA, vec![COM_PINS_SEQUENTIAL])));
        assert!(cmds.contains(&(0x81, vec![0x9F])));
        assert!(cmds.contains(&(0xD9, vec![0x22])));
        assert!(cmds.contains(&(0x22, vec![0, 3])));
        assert_eq!(d.contrast(), 0x9F);
    }

    #[test]
    fn test_startup_commands_match_arity() {
        let mut d = display(128, 64);
        d.startup(false).unwrap();
        d.scroll_horizontally(ScrollDirection::Right, 0, 7, ScrollSpeed::Frames2).unwrap();
        d.scroll_diagonally(ScrollDirection::Left, 0, 3, 0, 64, ScrollSpeed::Frames5, 1).unwrap();

        for (op, params) in commands(&d.transport().frames) {
            let opcode = Opcode::try_from(op).unwrap();
            assert_eq!(params.len(), opcode.arity(), "{:?}", opcode);
        }
    }

    #[test]
    fn test_h_flip_state_kept_when_redraw_fails() {
        struct FailData(Vec<u8>);
        impl Transport for FailData {
            fn write_command(&mut self, opcode: u8, _: &[u8]) -> Result<(), DisplayError> {
                self.0.push(opcode);
                Ok(())
            }
            fn write_data(&mut self, _: &[u8]) -> Result<(), DisplayError> {
                Err(DisplayError::I2cError("nack".into()))
            }
        }

        let mut d = Ssd1306::new(FailData(Vec::new()), NoopDelay::new(), 128, 64).unwrap();
        assert!(d.set_h_flipped(true).is_err());
        assert!(d.is_h_flipped());
        assert_eq!(d.transport().0, vec![0xA0]);
    }

    #[test]
    fn test_state_unchanged_when_command_fails() {
        struct FailAll;
        impl Transport for FailAll {
            fn write_command(&mut self, _: u8, _: &[u8]) -> Result<(), DisplayError> {
                Err(DisplayError::SpiError("closed".into()))
            }
            fn write_data(&mut self, _: &[u8]) -> Result<(), DisplayError> {
                Err(DisplayError::SpiError("closed".into()))
            }
        }

        let mut d = Ssd1306::new(FailAll, NoopDelay::new(), 128, 64).unwrap();
        assert!(d.set_inverted(true).is_err());
        assert!(d.set_contrast(10).is_err());
        assert!(d.start_scroll().is_err());
        assert!(!d.is_inverted());
        assert_eq!(d.contrast(), 0x7F);
        assert!(!d.is_scrolling());
    }

    #[test]
    fn test_offset_truncated() {
        let mut d = display(128, 64);
        d.set_offset(300).unwrap();
        assert_eq!(d.offset(), 44);
        assert_eq!(d.transport().frames, vec![Frame::Cmd(0xD3, vec![44])]);
    }

    #[test]
    fn test_raw_command_and_data() {
        let mut d = display(128, 64);
        d.command(Opcode::SetStartLine, &[]).unwrap();
        d.data(&[0xAA, 0x55]).unwrap();
        assert_eq!(
            d.transport().frames,
            vec![Frame::Cmd(0x40, vec![]), Frame::Data(vec![0xAA, 0x55])]
        );
    }
}
