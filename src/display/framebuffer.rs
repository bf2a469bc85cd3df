/*
 *  display/framebuffer.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page-organised 1-bit framebuffer matching SSD1306 display RAM
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
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::display::error::DisplayError;

/// Monochrome framebuffer in controller RAM layout.
///
/// Each byte covers a vertical strip of 8 pixels within one page: pixel
/// `(x, y)` lives in byte `x + (y / 8) * width`, bit `y % 8`. The buffer can
/// therefore be streamed to the panel as-is in horizontal addressing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    w: usize,
    h: usize,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![0; w * h.div_ceil(8)], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Number of 8-row pages
    pub fn pages(&self) -> usize { self.h.div_ceil(8) }

    /// Size in bytes of a full transfer
    pub fn len(&self) -> usize { self.buf.len() }

    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Raw display RAM image
    pub fn as_bytes(&self) -> &[u8] { &self.buf }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] { &mut self.buf }

    /// Zero every pixel
    pub fn erase(&mut self) {
        self.buf.fill(0);
    }

    /// Replace the contents with a raw display RAM image of the same size
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        if bytes.len() != self.buf.len() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.buf.len(),
                actual: bytes.len(),
            });
        }
        self.buf.copy_from_slice(bytes);
        Ok(())
    }

    /// Set or clear a pixel; out of bounds writes are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if let Some((i, mask)) = self.locate(x, y) {
            if on {
                self.buf[i] |= mask;
            } else {
                self.buf[i] &= !mask;
            }
        }
    }

    /// Pixel state, `None` when out of bounds
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        self.locate(x, y).map(|(i, mask)| self.buf[i] & mask != 0)
    }

    /// Count of lit pixels
    pub fn count_on(&self) -> usize {
        self.buf.iter().map(|b| b.count_ones() as usize).sum()
    }

    #[inline]
    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        if x < self.w && y < self.h {
            Some((x + (y / 8) * self.w, 1 << (y % 8)))
        } else {
            None
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 {
                self.set_pixel(p.x as usize, p.y as usize, c.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(if color.is_on() { 0xFF } else { 0x00 });

        // rows past the bottom of a partial last page stay dark
        let tail = self.h % 8;
        if color.is_on() && tail != 0 {
            let start = (self.h / 8) * self.w;
            let mask = (1u8 << tail) - 1;
            self.buf[start..].iter_mut().for_each(|b| *b &= mask);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

    #[test]
    fn test_fill_on_partial_page() {
        let mut fb = FrameBuffer::new(8, 12);
        fb.clear(BinaryColor::On).unwrap();

        assert_eq!(fb.count_on(), 8 * 12);
        assert_eq!(fb.get_pixel(7, 11), Some(true));
        assert_eq!(&fb.as_bytes()[8..], &[0x0Fu8; 8]);
    }

    #[test]
    fn test_page_layout() {
        let mut fb = FrameBuffer::new(128, 64);
        assert_eq!(fb.len(), 1024);
        assert_eq!(fb.pages(), 8);

        fb.set_pixel(3, 10, true);
        // page 1, column 3, bit 2
        assert_eq!(fb.as_bytes()[128 + 3], 0b0000_0100);
        assert_eq!(fb.get_pixel(3, 10), Some(true));

        fb.set_pixel(3, 10, false);
        assert_eq!(fb.count_on(), 0);
    }

    #[test]
    fn test_partial_page_rounds_up() {
        let fb = FrameBuffer::new(96, 12);
        assert_eq!(fb.pages(), 2);
        assert_eq!(fb.len(), 192);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = FrameBuffer::new(128, 32);
        fb.set_pixel(128, 0, true);
        fb.set_pixel(0, 32, true);
        assert_eq!(fb.count_on(), 0);
        assert_eq!(fb.get_pixel(200, 5), None);
    }

    #[test]
    fn test_draw_line() {
        let mut fb = FrameBuffer::new(128, 64);
        Line::new(Point::new(0, 0), Point::new(10, 10))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.count_on(), 11);
        assert_eq!(fb.get_pixel(0, 0), Some(true));
        assert_eq!(fb.get_pixel(10, 10), Some(true));
    }

    #[test]
    fn test_draw_clipped_rectangle() {
        let mut fb = FrameBuffer::new(16, 8);
        Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_on(), 16);
    }

    #[test]
    fn test_clear_and_erase() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.count_on(), 64);
        fb.erase();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_size_checked() {
        let mut fb = FrameBuffer::new(128, 64);
        assert_eq!(
            fb.load(&[0xFF; 512]),
            Err(DisplayError::BufferSizeMismatch { expected: 1024, actual: 512 })
        );
        fb.load(&[0xFF; 1024]).unwrap();
        assert_eq!(fb.count_on(), 128 * 64);
    }
}
