//! Device and readout configuration.
//!
//! [`DeviceConfig`] is fixed once before cycle mode starts and is shared by
//! the configurator and the cycle reader. [`Settings`] adds the host side
//! wiring used by the bundled binaries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::registers::DEFAULT_ADDRESS;

/// Time between data releases in cycle mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CyclePeriod {
    Period3s,
    Period100s,
    Period300s,
}

impl CyclePeriod {
    /// Value written to the cycle time period register.
    pub fn value(self) -> u8 {
        match self {
            Self::Period3s => 0,
            Self::Period100s => 1,
            Self::Period300s => 2,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Self::Period3s => Duration::from_secs(3),
            Self::Period100s => Duration::from_secs(100),
            Self::Period300s => Duration::from_secs(300),
        }
    }
}

impl FromStr for CyclePeriod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('s') {
            "3" => Ok(Self::Period3s),
            "100" => Ok(Self::Period100s),
            "300" => Ok(Self::Period300s),
            _ => Err(ConfigError::InvalidValue {
                flag: "--period",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CyclePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} s", self.duration().as_secs())
    }
}

/// External particulate sensor attached to the MS430.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParticleSensor {
    Off,
    Ppd42,
    Sds011,
}

impl ParticleSensor {
    /// Value written to the particle sensor select register.
    pub fn value(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Ppd42 => 1,
            Self::Sds011 => 2,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    /// Unit of the reported particle concentration.
    pub fn concentration_unit(self) -> &'static str {
        match self {
            Self::Ppd42 => "ppL",
            Self::Sds011 => "μg/m³",
            Self::Off => "(?)",
        }
    }
}

impl FromStr for ParticleSensor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "ppd42" => Ok(Self::Ppd42),
            "sds011" => Ok(Self::Sds011),
            _ => Err(ConfigError::InvalidValue {
                flag: "--particle",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParticleSensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Ppd42 => "PPD42",
            Self::Sds011 => "SDS011",
        };
        f.write_str(name)
    }
}

/// Configuration written to the device before entering cycle mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub cycle_period: CyclePeriod,
    pub particle_sensor: ParticleSensor,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cycle_period: CyclePeriod::Period300s,
            particle_sensor: ParticleSensor::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One labeled, unit annotated line per value.
    #[default]
    Labeled,
    /// Bare numbers, one line per cycle, for pasting into a spreadsheet.
    Columns,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub temperature_unit: TemperatureUnit,
}

pub const USAGE: &str = "\
Options:
  --period <3|100|300>          cycle period in seconds [default: 300]
  --particle <off|ppd42|sds011> attached particle sensor [default: off]
  --columns                     print bare numeric columns
  --fahrenheit                  print temperature in Fahrenheit
  --address <0x70|0x71>         I2C address of the MS430 [default: 0x71]
  --i2c <path>                  I2C bus device [default: /dev/i2c-1]
  --gpio-chip <path>            GPIO character device [default: /dev/gpiochip0]
  --ready-line <n>              GPIO line wired to READY [default: 17]
  --power-line <n>              GPIO line gating the particle sensor [default: 15]
  --off-cycles <n>              cycles the particle sensor stays off [default: 1]
  -h, --help                    print this help";

/// Host side settings for the bundled binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: DeviceConfig,
    pub output: OutputSettings,
    pub i2c_bus: String,
    pub address: u8,
    pub gpio_chip: String,
    pub ready_line: u32,
    pub power_line: u32,
    pub off_cycles: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            output: OutputSettings::default(),
            i2c_bus: "/dev/i2c-1".to_string(),
            address: DEFAULT_ADDRESS,
            gpio_chip: "/dev/gpiochip0".to_string(),
            ready_line: 17,
            power_line: 15,
            off_cycles: 1,
        }
    }
}

impl Settings {
    /// Parses command line flags, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Settings, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut settings = Settings::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--columns" => settings.output.format = OutputFormat::Columns,
                "--fahrenheit" => settings.output.temperature_unit = TemperatureUnit::Fahrenheit,
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                "--period" => settings.device.cycle_period = value_of("--period", &mut args)?.parse()?,
                "--particle" => {
                    settings.device.particle_sensor = value_of("--particle", &mut args)?.parse()?
                }
                "--address" => settings.address = parse_address(&value_of("--address", &mut args)?)?,
                "--i2c" => settings.i2c_bus = value_of("--i2c", &mut args)?,
                "--gpio-chip" => settings.gpio_chip = value_of("--gpio-chip", &mut args)?,
                "--ready-line" => settings.ready_line = parse_number("--ready-line", &mut args)?,
                "--power-line" => settings.power_line = parse_number("--power-line", &mut args)?,
                "--off-cycles" => settings.off_cycles = parse_number("--off-cycles", &mut args)?,
                _ => return Err(ConfigError::UnknownFlag(flag)),
            }
        }

        Ok(settings)
    }
}

fn value_of(flag: &'static str, args: &mut impl Iterator<Item = String>) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(flag))
}

fn parse_number(flag: &'static str, args: &mut impl Iterator<Item = String>) -> Result<u32, ConfigError> {
    let value = value_of(flag, args)?;
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value })
}

fn parse_address(value: &str) -> Result<u8, ConfigError> {
    let digits = value.trim_start_matches("0x").trim_start_matches("0X");
    match u8::from_str_radix(digits, 16) {
        Ok(address) if address == DEFAULT_ADDRESS || address == crate::registers::ALTERNATE_ADDRESS => {
            Ok(address)
        }
        _ => Err(ConfigError::InvalidValue {
            flag: "--address",
            value: value.to_string(),
        }),
    }
}

/// Invalid or incomplete configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    HelpRequested,
    UnknownFlag(String),
    MissingValue(&'static str),
    InvalidValue { flag: &'static str, value: String },
    /// The particle power cycling demo needs an attached particle sensor and
    /// a cycle period long enough for the sensor to settle.
    UnsupportedToggle(DeviceConfig),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::HelpRequested => f.write_str(USAGE),
            ConfigError::UnknownFlag(flag) => write!(f, "unknown option '{}'", flag),
            ConfigError::MissingValue(flag) => write!(f, "option '{}' requires a value", flag),
            ConfigError::InvalidValue { flag, value } => {
                write!(f, "invalid value '{}' for option '{}'", value, flag)
            }
            ConfigError::UnsupportedToggle(config) => write!(
                f,
                "particle power cycling needs a particle sensor and a 100 s or 300 s period (got {}, {})",
                config.particle_sensor, config.cycle_period
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
