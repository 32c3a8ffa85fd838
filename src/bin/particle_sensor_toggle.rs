//! Powers the particle sensor only for the cycles in which it is read.
//!
//! A GPIO output drives an external transistor that gates the particle sensor
//! supply. The sensor is kept off for `--off-cycles` cycles, switched on for
//! one cycle and read, then switched off again. Sound data are ignored while
//! the sensor fan runs. Use a 100 or 300 second period so the sensor warms up
//! for at least a minute before its data are read.
//!
//! Run with:
//! `cargo run --bin particle-sensor-toggle -- --particle sds011 --columns`

use std::io;

use anyhow::Result;
use ms430::hardware;
use ms430::{ConsoleSink, ToggleReader};

fn main() -> Result<()> {
    hardware::init_logging();

    let Some(settings) = hardware::settings_from_args("particle-sensor-toggle")? else {
        return Ok(());
    };
    ms430::toggle::check_config(&settings.device)?;

    let reader = hardware::open_reader(&settings)?;
    let power = hardware::open_power_line(&settings)?;
    let mut toggle = ToggleReader::new(reader, power, settings.off_cycles)?;

    println!("Entering cycle mode and waiting for data. Press ctrl-c to exit.");
    toggle.start()?;

    let mut sink = ConsoleSink::new(io::stdout().lock(), settings.output);
    match toggle.run(&mut sink)? {}
}
