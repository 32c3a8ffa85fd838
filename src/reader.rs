//! Cycle mode readout loop.

use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, error, info};

use crate::config::DeviceConfig;
use crate::device::Ms430;
use crate::error::Error;
use crate::output::RecordSink;
use crate::ready::ReadySignal;
use crate::types::Record;

/// Interval between READY polls while waiting for a data release.
pub const READY_POLL_INTERVAL_MS: u32 = 50;
/// Settling time after the reset command.
pub const RESET_DELAY_MS: u32 = 5;

/// Waits for each data release and reads every configured data block.
pub struct CycleReader<I2C, R, D> {
    pub(crate) device: Ms430<I2C>,
    ready: R,
    delay: D,
    config: DeviceConfig,
}

impl<I2C, R, D, E> CycleReader<I2C, R, D>
where
    I2C: I2c<Error = E>,
    R: ReadySignal,
    D: DelayNs,
{
    pub fn new(device: Ms430<I2C>, ready: R, delay: D, config: DeviceConfig) -> Self {
        CycleReader {
            device,
            ready,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Releases the device, ready signal and delay.
    pub fn release(self) -> (Ms430<I2C>, R, D) {
        (self.device, self.ready, self.delay)
    }

    /// Blocks until READY is asserted, checking the level every poll interval.
    pub fn wait_until_ready(&mut self) -> Result<(), Error<E>> {
        while !self.ready.is_ready().map_err(Error::Gpio)? {
            self.delay.delay_ms(READY_POLL_INTERVAL_MS);
        }
        Ok(())
    }

    /// Resets the device, applies the configuration and enters cycle mode.
    ///
    /// Any failed write is returned before cycle mode is requested.
    pub fn start(&mut self) -> Result<(), Error<E>> {
        self.wait_until_ready()?;
        self.device.reset()?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.wait_until_ready()?;

        self.device.configure(&self.config)?;
        self.device.enter_cycle_mode()?;
        info!(
            "cycle mode started: period {}, particle sensor {}",
            self.config.cycle_period, self.config.particle_sensor
        );
        Ok(())
    }

    /// Waiting state: polls for the falling edge that marks a data release.
    pub fn wait_for_ready(&mut self) -> Result<(), Error<E>> {
        while !self.ready.poll_edge_event().map_err(Error::Gpio)? {
            self.delay.delay_ms(READY_POLL_INTERVAL_MS);
        }
        debug!("data release");
        Ok(())
    }

    /// Reading state: reads, decodes and emits each block in turn, then ends
    /// the cycle. Blocks already emitted stay emitted if a later read fails.
    pub fn read_cycle<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), Error<E>> {
        sink.emit(&Record::Air(self.device.read_air_data()?))?;
        sink.emit(&Record::AirQuality(self.device.read_air_quality_data()?))?;
        sink.emit(&Record::Light(self.device.read_light_data()?))?;
        sink.emit(&Record::Sound(self.device.read_sound_data()?))?;

        let sensor = self.config.particle_sensor;
        if sensor.is_enabled() {
            sink.emit(&Record::Particle(self.device.read_particle_data(sensor)?))?;
        }

        sink.end_cycle()?;
        Ok(())
    }

    /// Alternates between waiting and reading forever.
    ///
    /// A failed block read abandons the rest of the current cycle. The sink
    /// still ends the cycle so the next release starts on a fresh row, and
    /// the loop waits for the next release. GPIO and output errors end the
    /// loop.
    pub fn run<S: RecordSink>(&mut self, sink: &mut S) -> Result<Infallible, Error<E>>
    where
        E: std::fmt::Debug,
    {
        loop {
            self.wait_for_ready()?;
            match self.read_cycle(sink) {
                Ok(()) => {}
                Err(e @ Error::BusRead(_)) => {
                    error!("skipping cycle: {}", e);
                    sink.end_cycle()?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
