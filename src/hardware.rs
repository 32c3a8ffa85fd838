//! Raspberry Pi / Linux wiring for the bundled binaries.

use std::io::Write;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, Delay, I2cdev};

use crate::config::{ConfigError, Settings, USAGE};
use crate::device::Ms430;
use crate::reader::CycleReader;
use crate::ready::FallingEdge;

pub type LinuxCycleReader = CycleReader<I2cdev, FallingEdge<CdevPin>, Delay>;

/// Logs to stderr, `info` unless overridden with `RUST_LOG`.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{} - {}", record.level(), record.args()))
        .init();
}

/// Parses the process arguments. Prints the usage and returns `None` when
/// help was requested.
pub fn settings_from_args(program: &str) -> Result<Option<Settings>> {
    match Settings::from_args(std::env::args().skip(1)) {
        Ok(settings) => Ok(Some(settings)),
        Err(ConfigError::HelpRequested) => {
            println!("Usage: {} [OPTIONS]\n\n{}", program, USAGE);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn request_line(path: &str, offset: u32, flags: LineRequestFlags, consumer: &str) -> Result<CdevPin> {
    let mut chip = Chip::new(path).with_context(|| format!("could not open GPIO chip {}", path))?;
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(flags, 0, consumer))
        .with_context(|| format!("could not request GPIO line {} on {}", offset, path))?;
    Ok(CdevPin::new(handle)?)
}

/// Opens the I2C bus and the READY line described by `settings`.
pub fn open_reader(settings: &Settings) -> Result<LinuxCycleReader> {
    let i2c = I2cdev::new(&settings.i2c_bus)
        .with_context(|| format!("could not open I2C bus {}", settings.i2c_bus))?;
    let ready = request_line(
        &settings.gpio_chip,
        settings.ready_line,
        LineRequestFlags::INPUT,
        "ms430-ready",
    )?;

    Ok(CycleReader::new(
        Ms430::new(i2c, settings.address),
        FallingEdge::new(ready),
        Delay,
        settings.device,
    ))
}

/// Requests the output line gating the particle sensor supply, initially low.
pub fn open_power_line(settings: &Settings) -> Result<CdevPin> {
    request_line(
        &settings.gpio_chip,
        settings.power_line,
        LineRequestFlags::OUTPUT,
        "ms430-particle-power",
    )
}
