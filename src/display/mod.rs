/*
 *  display/mod.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 display subsystem
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

// Core definitions
pub mod command;
pub mod error;
pub mod framebuffer;
pub mod traits;

// Byte transports (I2C, SPI, no-op)
pub mod transport;

// Display drivers
pub mod drivers;

// Config driven construction
pub mod factory;

use std::sync::{Arc, Mutex};

// Re-exports for convenience
pub use command::{CommandMessage, Opcode, ScrollDirection, ScrollSpeed};
pub use error::{DisplayError, DisplayFactoryError};
pub use framebuffer::FrameBuffer;
pub use traits::{DisplayController, DisplayState};
pub use transport::{I2cTransport, NoopTransport, SpiTransport, Transport};
pub use drivers::ssd1306::Ssd1306;
pub use drivers::mock::{MockSsd1306, MockStats};
pub use factory::{BoxedDisplay, DisplayFactory};

/// A display shared between threads; lock it around framebuffer edits and display()
pub type SharedDisplay = Arc<Mutex<BoxedDisplay>>;
