//! Continually reads and prints all environment data in cycle mode, once per
//! cycle period of 3, 100 or 300 seconds.
//!
//! ```text
//! RPi      <-> MS430
//! 3.3V     <-> VDD
//! GND      <-> GND
//! Pin 3    <-> SDA
//! Pin 5    <-> SCL
//! GPIO 17  <-> READY
//! ```
//!
//! Run with:
//! `cargo run --bin cycle-readout -- --period 3 --particle sds011`

use std::io;

use anyhow::Result;
use ms430::hardware;
use ms430::ConsoleSink;

fn main() -> Result<()> {
    hardware::init_logging();

    let Some(settings) = hardware::settings_from_args("cycle-readout")? else {
        return Ok(());
    };
    let mut reader = hardware::open_reader(&settings)?;

    println!("Entering cycle mode and waiting for data. Press ctrl-c to exit.");
    reader.start()?;

    let mut sink = ConsoleSink::new(io::stdout().lock(), settings.output);
    match reader.run(&mut sink)? {}
}
