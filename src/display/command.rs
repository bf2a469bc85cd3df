/*
 *  display/command.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 command set and frame construction
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

use crate::display::error::DisplayError;

/// Bit of the I2C control byte that selects data (1) or command (0)
pub const DC_BIT: u8 = 6;

/// Filler bytes the scroll setup commands expect around their parameters
pub const DUMMY_BYTE_00: u8 = 0x00;
pub const DUMMY_BYTE_FF: u8 = 0xFF;

/// Largest parameter list a single command frame can carry
pub const MAX_PARAMS: usize = 8;

pub const MEMORY_MODE_HORIZONTAL: u8 = 0x00;
pub const MEMORY_MODE_VERTICAL: u8 = 0x01;
pub const MEMORY_MODE_PAGE: u8 = 0x02;

pub const CHARGE_PUMP_DISABLE: u8 = 0x10;
pub const CHARGE_PUMP_ENABLE: u8 = 0x14;

pub const COM_PINS_SEQUENTIAL: u8 = 0x02;
pub const COM_PINS_ALTERNATING: u8 = 0x12;
pub const COM_PINS_SEQUENTIAL_LR: u8 = 0x22;
pub const COM_PINS_ALTERNATING_LR: u8 = 0x32;

pub const VCOMH_DESELECT_LEVEL_00: u8 = 0x00; // ~0.65 x VCC
pub const VCOMH_DESELECT_LEVEL_20: u8 = 0x20; // ~0.77 x VCC
pub const VCOMH_DESELECT_LEVEL_30: u8 = 0x30; // ~0.83 x VCC

pub const DISPLAY_CLOCK_DIV_DEFAULT: u8 = 0x80;

/// Contrast the controller comes out of reset with
pub const CONTRAST_DEFAULT: u8 = 0x7F;

/// SSD1306 opcodes.
///
/// The discriminant is the byte on the wire. Each opcode takes a fixed
/// number of parameter bytes, see [`Opcode::arity`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    SetMemoryMode = 0x20,
    SetColumnAddress = 0x21,
    SetPageAddress = 0x22,
    RightHorizontalScroll = 0x26,
    LeftHorizontalScroll = 0x27,
    VerticalAndRightHorizontalScroll = 0x29,
    VerticalAndLeftHorizontalScroll = 0x2A,
    DeactivateScroll = 0x2E,
    ActivateScroll = 0x2F,
    SetStartLine = 0x40,
    SetContrast = 0x81,
    SetChargePump = 0x8D,
    SetSegmentRemap = 0xA0,
    SetSegmentRemapReverse = 0xA1,
    SetVerticalScrollArea = 0xA3,
    DisplayAllOnResume = 0xA4,
    DisplayAllOn = 0xA5,
    NormalDisplay = 0xA6,
    InvertDisplay = 0xA7,
    SetMultiplexRatio = 0xA8,
    DisplayOff = 0xAE,
    DisplayOn = 0xAF,
    SetComScanInc = 0xC0,
    SetComScanDec = 0xC8,
    SetDisplayOffset = 0xD3,
    SetDisplayClockDiv = 0xD5,
    SetPrechargePeriod = 0xD9,
    SetComPins = 0xDA,
    SetVcomhDeselect = 0xDB,
    Noop = 0xE3,
}

impl Opcode {
    pub const ALL: [Opcode; 30] = [
        Opcode::SetMemoryMode,
        Opcode::SetColumnAddress,
        Opcode::SetPageAddress,
        Opcode::RightHorizontalScroll,
        Opcode::LeftHorizontalScroll,
        Opcode::VerticalAndRightHorizontalScroll,
        Opcode::VerticalAndLeftHorizontalScroll,
        Opcode::DeactivateScroll,
        Opcode::ActivateScroll,
        Opcode::SetStartLine,
        Opcode::SetContrast,
        Opcode::SetChargePump,
        Opcode::SetSegmentRemap,
        Opcode::SetSegmentRemapReverse,
        Opcode::SetVerticalScrollArea,
        Opcode::DisplayAllOnResume,
        Opcode::DisplayAllOn,
        Opcode::NormalDisplay,
        Opcode::InvertDisplay,
        Opcode::SetMultiplexRatio,
        Opcode::DisplayOff,
        Opcode::DisplayOn,
        Opcode::SetComScanInc,
        Opcode::SetComScanDec,
        Opcode::SetDisplayOffset,
        Opcode::SetDisplayClockDiv,
        Opcode::SetPrechargePeriod,
        Opcode::SetComPins,
        Opcode::SetVcomhDeselect,
        Opcode::Noop,
    ];

    /// The byte sent on the wire
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Number of parameter bytes the controller expects after this opcode
    pub fn arity(self) -> usize {
        match self {
            Opcode::RightHorizontalScroll | Opcode::LeftHorizontalScroll => 6,
            Opcode::VerticalAndRightHorizontalScroll
            | Opcode::VerticalAndLeftHorizontalScroll => 5,
            Opcode::SetColumnAddress
            | Opcode::SetPageAddress
            | Opcode::SetVerticalScrollArea => 2,
            Opcode::SetMemoryMode
            | Opcode::SetContrast
            | Opcode::SetChargePump
            | Opcode::SetMultiplexRatio
            | Opcode::SetDisplayOffset
            | Opcode::SetDisplayClockDiv
            | Opcode::SetPrechargePeriod
            | Opcode::SetComPins
            | Opcode::SetVcomhDeselect => 1,
            _ => 0,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.code() == value)
            .ok_or(value)
    }
}

/// Horizontal direction of a hardware scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Scroll step interval, in frames. The discriminant is the wire encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSpeed {
    Frames5 = 0x00,
    Frames64 = 0x01,
    Frames128 = 0x02,
    Frames256 = 0x03,
    Frames3 = 0x04,
    Frames4 = 0x05,
    Frames25 = 0x06,
    Frames2 = 0x07,
}

impl ScrollSpeed {
    /// Frames between scroll steps
    pub fn frames(self) -> u16 {
        match self {
            ScrollSpeed::Frames2 => 2,
            ScrollSpeed::Frames3 => 3,
            ScrollSpeed::Frames4 => 4,
            ScrollSpeed::Frames5 => 5,
            ScrollSpeed::Frames25 => 25,
            ScrollSpeed::Frames64 => 64,
            ScrollSpeed::Frames128 => 128,
            ScrollSpeed::Frames256 => 256,
        }
    }
}

/// An opcode and its parameter bytes, ready for a transport to frame.
///
/// Parameters are integers truncated to their low byte; values are never
/// range checked here, that is the controller's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    opcode: u8,
    params: ArrayVec<u8, MAX_PARAMS>,
}

impl CommandMessage {
    pub fn new(opcode: impl Into<u8>, params: &[i32]) -> Result<Self, DisplayError> {
        let opcode = opcode.into();
        if params.len() > MAX_PARAMS {
            return Err(DisplayError::TooManyParameters { opcode, count: params.len() });
        }
        Ok(Self {
            opcode,
            params: params.iter().map(|&p| p as u8).collect(),
        })
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn params(&self) -> &[u8] {
        &self.params
    }
}
