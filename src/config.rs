use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// panel geometry, wiring & power-on settings
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub external_vcc: Option<bool>,
    pub contrast: Option<u8>,       // 0-255
    pub invert: Option<bool>,
    pub h_flip: Option<bool>,
    pub v_flip: Option<bool>,
    pub offset: Option<u8>,
    pub bus: Option<BusConfig>,     // <- i2c, spi or mock wiring
}

impl DisplayConfig {
    pub const DEFAULT_WIDTH: u32 = 128;
    pub const DEFAULT_HEIGHT: u32 = 64;

    pub fn width_or_default(&self) -> u32 {
        self.width.unwrap_or(Self::DEFAULT_WIDTH)
    }

    pub fn height_or_default(&self) -> u32 {
        self.height.unwrap_or(Self::DEFAULT_HEIGHT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C (I2C addresses are 7-bit, stored in u8)
    },
    Spi {
        bus: String,        // e.g. "/dev/spidev0.0"
        speed_hz: Option<u32>,
        gpio_chip: Option<String>, // defaults to /dev/gpiochip0
        dc_pin: u32,        // line offset on the GPIO chip (BCM number on a Pi)
        rst_pin: Option<u32>,
    },
    /// No hardware; state-only mock
    Mock,
}

/// Command line. Display flags are layered over the YAML file.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "ssd1306-pi", about = "SSD1306 OLED test pattern", disable_help_flag = false)]
pub struct Cli {
    /// YAML config file; skips the default search
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub contrast: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub invert: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub external_vcc: Option<bool>,
    /// use the state-only mock instead of a real bus
    #[arg(long, action = ArgAction::SetTrue)]
    pub mock: bool,
    /// run a horizontal hardware scroll for this many seconds
    #[arg(long, default_value_t = 0)]
    pub scroll_secs: u64,
    /// seconds to hold the test pattern before shutting down
    #[arg(long, default_value_t = 5)]
    pub hold_secs: u64,
    /// print the effective configuration as YAML and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Layer configuration: defaults, then YAML, then CLI flags; validate the result.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    let file = match cli.config.as_deref() {
        Some(p) if !p.exists() => {
            return Err(ConfigError::Validation(format!(
                "config file {} does not exist",
                p.display()
            )));
        }
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };

    let mut cfg = Config::default();
    if let Some(path) = file {
        merge(&mut cfg, read_yaml(&path)?);
    }
    apply_cli_overrides(&mut cfg, cli);

    validate(&cfg)?;
    Ok(cfg)
}

/// Parse a YAML document into a config (no validation).
pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(s)?)
}

/// Pretty YAML of an effective config
pub fn to_yaml_string(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// First existing file among the per-user and working-directory candidates
fn find_config_file() -> Option<PathBuf> {
    let user = home_dir()
        .map(|home| {
            vec![
                home.join(".config/ssd1306-pi/config.yaml"),
                home.join(".config/ssd1306-pi.yaml"),
            ]
        })
        .unwrap_or_default();
    let local = ["ssd1306-pi.yaml", "config.yaml"].into_iter().map(PathBuf::from);

    user.into_iter().chain(local).find(|p| p.is_file())
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    from_yaml_str(&s)
}

/// Fields set in `src` win over `dst`
fn merge(dst: &mut Config, src: Config) {
    dst.log_level = src.log_level.or(dst.log_level.take());
    dst.display = match (dst.display.take(), src.display) {
        (Some(mut d), Some(s)) => {
            merge_display(&mut d, s);
            Some(d)
        }
        (d, s) => s.or(d),
    };
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    dst.width = src.width.or(dst.width);
    dst.height = src.height.or(dst.height);
    dst.external_vcc = src.external_vcc.or(dst.external_vcc);
    dst.contrast = src.contrast.or(dst.contrast);
    dst.invert = src.invert.or(dst.invert);
    dst.h_flip = src.h_flip.or(dst.h_flip);
    dst.v_flip = src.v_flip.or(dst.v_flip);
    dst.offset = src.offset.or(dst.offset);
    dst.bus = src.bus.or(dst.bus.take());
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        cfg.log_level = Some(level.clone());
    }

    let touches_display = cli.mock
        || cli.width.is_some()
        || cli.height.is_some()
        || cli.contrast.is_some()
        || cli.invert.is_some()
        || cli.external_vcc.is_some();
    if !touches_display {
        return;
    }

    let overrides = DisplayConfig {
        width: cli.width,
        height: cli.height,
        contrast: cli.contrast,
        invert: cli.invert,
        external_vcc: cli.external_vcc,
        bus: cli.mock.then_some(BusConfig::Mock),
        ..Default::default()
    };
    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    merge_display(display, overrides);
}

/// Panel limits of the SSD1306: 128 segments, 64 COM lines, whole pages.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let Some(display) = cfg.display.as_ref() else {
        return Ok(());
    };

    if let Some(w) = display.width {
        if w == 0 || w > 128 {
            return Err(ConfigError::Validation("display width must be 1..=128".into()));
        }
    }
    if let Some(h) = display.height {
        if !(8..=64).contains(&h) || h % 8 != 0 {
            return Err(ConfigError::Validation(
                "display height must be a multiple of 8 in 8..=64".into(),
            ));
        }
    }
    if let Some(BusConfig::I2c { address, .. }) = display.bus.as_ref() {
        if *address > 0x7F {
            return Err(ConfigError::Validation("I2C address must be 7-bit".into()));
        }
    }
    Ok(())
}
