//! Driver and cycle mode readout for the Metriful MS430 indoor environment
//! sensor.
//!
//! The MS430 measures air (temperature, pressure, humidity, gas sensor
//! resistance), air quality, light, sound and, with an external PPD42 or
//! SDS011 attached, airborne particles. In cycle mode the device releases a
//! new set of data every 3, 100 or 300 seconds and signals each release with a
//! falling edge on its READY line.
//!
//! The driver is written against the `embedded-hal` 1.0 traits. With the
//! default `linux` feature the crate also ships two Raspberry Pi binaries,
//! `cycle-readout` and `particle-sensor-toggle`.
//!
//! ## Example
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};
//! # let expectations = [
//! #     Transaction::write(0x71, vec![0x07, 2]),
//! #     Transaction::write(0x71, vec![0x89, 0]),
//! #     Transaction::write(0x71, vec![0xE4]),
//! #     Transaction::write_read(0x71, vec![0x10], vec![21, 3, 0x8D, 0x8B, 0x01, 0, 42, 0, 0x10, 0x27, 0, 0]),
//! # ];
//! # let i2c = I2cMock::new(&expectations);
//! use ms430::{CyclePeriod, DeviceConfig, Ms430, ParticleSensor, DEFAULT_ADDRESS};
//!
//! let mut ms430 = Ms430::new(i2c, DEFAULT_ADDRESS);
//! ms430.configure(&DeviceConfig {
//!     cycle_period: CyclePeriod::Period3s,
//!     particle_sensor: ParticleSensor::Sds011,
//! }).unwrap();
//! ms430.enter_cycle_mode().unwrap();
//!
//! // once READY falls
//! let air = ms430.read_air_data().unwrap();
//! println!("{:.1} °C, {} Pa", air.temperature, air.pressure);
//! # ms430.release().done();
//! ```
//!
//! [`CycleReader`] wraps the driver, the READY line and a delay into the
//! wait / read loop, and hands every decoded [`Record`] to a [`RecordSink`].

pub mod config;
mod device;
mod error;
#[cfg(feature = "linux")]
pub mod hardware;
pub mod output;
pub mod reader;
pub mod ready;
pub mod registers;
pub mod toggle;
pub mod types;

pub use config::{
    ConfigError, CyclePeriod, DeviceConfig, OutputFormat, OutputSettings, ParticleSensor, Settings,
    TemperatureUnit,
};
pub use device::Ms430;
pub use error::Error;
pub use output::{ConsoleSink, RecordSink};
pub use reader::CycleReader;
pub use ready::{FallingEdge, ReadySignal};
pub use registers::{ALTERNATE_ADDRESS, DEFAULT_ADDRESS};
pub use toggle::ToggleReader;
pub use types::{AirData, AirQualityData, LightData, ParticleData, Record, SoundData};
