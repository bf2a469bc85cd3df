/*
 *  main.rs
 *
 *  ssd1306-pi - OLED control for single-board computers
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bring a panel up from configuration and show a test pattern
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

use std::{convert::Infallible, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use env_logger::Env;
use log::{info, warn};

use ssd1306_pi::config::{self, BusConfig, Cli};
use ssd1306_pi::display::{
    DisplayController, DisplayFactory, FrameBuffer, ScrollDirection, ScrollSpeed,
};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Border, diagonals, a centred circle and a caption
fn draw_test_pattern(fb: &mut FrameBuffer) -> Result<(), Infallible> {
    let size = fb.size();
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    let right = size.width as i32 - 1;
    let bottom = size.height as i32 - 1;

    Rectangle::new(Point::zero(), size).into_styled(stroke).draw(fb)?;
    Line::new(Point::zero(), Point::new(right, bottom)).into_styled(stroke).draw(fb)?;
    Line::new(Point::new(0, bottom), Point::new(right, 0)).into_styled(stroke).draw(fb)?;

    let diameter = size.height / 2;
    Circle::with_center(Point::new(right / 2, bottom / 2), diameter)
        .into_styled(stroke)
        .draw(fb)?;

    let caption = format!("{}x{}", size.width, size.height);
    Text::with_baseline(
        &caption,
        Point::new(3, 2),
        MonoTextStyle::new(&FONT_6X10, BinaryColor::On),
        Baseline::Top,
    )
    .draw(fb)?;

    Ok(())
}

fn run(cli: &Cli, cfg: &config::Config) -> Result<()> {
    let display_cfg = cfg.display.clone().unwrap_or_else(|| {
        warn!("No display configured, using the mock panel");
        config::DisplayConfig {
            bus: Some(BusConfig::Mock),
            ..Default::default()
        }
    });

    let mut display = DisplayFactory::create_from_config(&display_cfg)
        .context("creating display")?;

    display
        .startup(display_cfg.external_vcc.unwrap_or(false))
        .context("display startup")?;
    DisplayFactory::apply_settings(display.as_mut(), &display_cfg)
        .context("applying display settings")?;

    draw_test_pattern(display.framebuffer_mut())?;
    display.display().context("sending test pattern")?;
    info!("Test pattern on a {}x{} panel", display.width(), display.height());

    if cli.scroll_secs > 0 {
        let last_page = (display.pages() - 1) as u8;
        display.scroll_horizontally(ScrollDirection::Left, 0, last_page, ScrollSpeed::Frames5)?;
        display.start_scroll()?;
        info!("Scrolling for {}s", cli.scroll_secs);
        thread::sleep(Duration::from_secs(cli.scroll_secs));
        display.stop_scroll()?;
        // scrolling corrupts display RAM, rewrite it
        display.redraw()?;
    }

    if cli.hold_secs > 0 {
        thread::sleep(Duration::from_secs(cli.hold_secs));
    }

    display.shutdown().context("display shutdown")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::to_yaml_string(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    run(&cli, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_draws_border_and_diagonals() {
        let mut fb = FrameBuffer::new(128, 32);
        draw_test_pattern(&mut fb).unwrap();

        for (x, y) in [(0, 0), (127, 0), (0, 31), (127, 31), (64, 0)] {
            assert_eq!(fb.get_pixel(x, y), Some(true), "({}, {})", x, y);
        }
        assert!(fb.count_on() > 2 * (128 + 32));
    }
}
