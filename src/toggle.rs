//! Particle sensor power cycling.
//!
//! A GPIO output gates the particle sensor supply through an external
//! transistor. The sensor stays off for a number of cycles, is switched on for
//! one cycle and read, then switched off again. Sound data are not read while
//! the sensor fan is running.

use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::i2c::I2c;
use log::{debug, error};

use crate::config::{ConfigError, CyclePeriod, DeviceConfig, ParticleSensor};
use crate::error::Error;
use crate::output::RecordSink;
use crate::reader::CycleReader;
use crate::ready::ReadySignal;
use crate::registers::{PARTICLE_DATA_BYTES, SOUND_DATA_BYTES};
use crate::types::{ParticleData, Record, SoundData};

/// Checks that a configuration can be used for power cycling.
pub fn check_config(config: &DeviceConfig) -> Result<(), ConfigError> {
    if !config.particle_sensor.is_enabled() || config.cycle_period == CyclePeriod::Period3s {
        return Err(ConfigError::UnsupportedToggle(*config));
    }
    Ok(())
}

pub struct ToggleReader<I2C, R, D, P> {
    reader: CycleReader<I2C, R, D>,
    power: P,
    sensor: ParticleSensor,
    off_cycles: u32,
    count: u32,
    sensor_on: bool,
    sound: SoundData,
    particle: ParticleData,
}

impl<I2C, R, D, P, E> ToggleReader<I2C, R, D, P>
where
    I2C: I2c<Error = E>,
    R: ReadySignal,
    D: DelayNs,
    P: OutputPin,
{
    /// Wraps a reader configured for a particle sensor and a 100 s or 300 s
    /// period, so the sensor runs for a full minute before being read.
    pub fn new(reader: CycleReader<I2C, R, D>, power: P, off_cycles: u32) -> Result<Self, ConfigError> {
        let config = *reader.config();
        check_config(&config)?;

        Ok(ToggleReader {
            reader,
            power,
            sensor: config.particle_sensor,
            off_cycles,
            count: 0,
            sensor_on: false,
            sound: SoundData::from_bytes(&[0; SOUND_DATA_BYTES]),
            particle: ParticleData::from_bytes(&[0; PARTICLE_DATA_BYTES], config.particle_sensor),
        })
    }

    pub fn release(self) -> (CycleReader<I2C, R, D>, P) {
        (self.reader, self.power)
    }

    pub fn sensor_on(&self) -> bool {
        self.sensor_on
    }

    fn set_power(&mut self, on: bool) -> Result<(), Error<E>> {
        let result = if on {
            self.power.set_high()
        } else {
            self.power.set_low()
        };
        result.map_err(|e| Error::Gpio(e.kind()))
    }

    /// Switches the sensor supply off and starts the device. Particle
    /// detection is only enabled once the supply is switched on.
    pub fn start(&mut self) -> Result<(), Error<E>> {
        self.set_power(false)?;
        self.reader.start()
    }

    /// Reads one data release. Sound and particle records repeat the latest
    /// values when their block was not read this cycle.
    ///
    /// The power schedule advances even when a read fails, so a failed
    /// particle read does not leave the sensor running.
    pub fn read_cycle<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), Error<E>> {
        let result = self.emit_cycle(sink);
        self.advance()?;
        result
    }

    fn emit_cycle<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), Error<E>> {
        let device = &mut self.reader.device;
        sink.emit(&Record::Air(device.read_air_data()?))?;
        sink.emit(&Record::AirQuality(device.read_air_quality_data()?))?;
        sink.emit(&Record::Light(device.read_light_data()?))?;

        if !self.sensor_on {
            self.sound = device.read_sound_data()?;
        }
        sink.emit(&Record::Sound(self.sound))?;

        if self.sensor_on {
            self.particle = device.read_particle_data(self.sensor)?;
        }
        sink.emit(&Record::Particle(self.particle))?;

        sink.end_cycle()?;
        Ok(())
    }

    fn advance(&mut self) -> Result<(), Error<E>> {
        if self.sensor_on {
            self.reader.device.set_particle_sensor(ParticleSensor::Off)?;
            self.set_power(false)?;
            self.sensor_on = false;
            debug!("particle sensor off");
            return Ok(());
        }

        self.count += 1;
        if self.count >= self.off_cycles {
            self.set_power(true)?;
            self.reader.device.set_particle_sensor(self.sensor)?;
            self.count = 0;
            self.sensor_on = true;
            debug!("particle sensor on");
        }
        Ok(())
    }

    pub fn run<S: RecordSink>(&mut self, sink: &mut S) -> Result<Infallible, Error<E>>
    where
        E: std::fmt::Debug,
    {
        loop {
            self.reader.wait_for_ready()?;
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

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use embedded_hal::digital::ErrorKind as GpioErrorKind;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    use super::*;
    use crate::device::Ms430;
    use crate::reader::tests::{Collect, Scripted, ADDR};

    fn reader(
        i2c: &[Transaction],
        config: DeviceConfig,
    ) -> CycleReader<I2cMock, Scripted, NoopDelay> {
        CycleReader::new(
            Ms430::new(I2cMock::new(i2c), ADDR),
            Scripted(VecDeque::new()),
            NoopDelay::new(),
            config,
        )
    }

    const SDS011_300S: DeviceConfig = DeviceConfig {
        cycle_period: CyclePeriod::Period300s,
        particle_sensor: ParticleSensor::Sds011,
    };

    #[test]
    fn rejects_short_period_or_missing_sensor() {
        for config in [
            DeviceConfig {
                cycle_period: CyclePeriod::Period3s,
                particle_sensor: ParticleSensor::Sds011,
            },
            DeviceConfig {
                cycle_period: CyclePeriod::Period100s,
                particle_sensor: ParticleSensor::Off,
            },
        ] {
            assert_eq!(
                check_config(&config),
                Err(ConfigError::UnsupportedToggle(config))
            );
        }
        assert_eq!(check_config(&SDS011_300S), Ok(()));
    }

    #[test]
    fn alternates_sound_and_particle_reads() {
        let i2c = vec![
            // off: air, air quality, light, sound
            Transaction::write_read(ADDR, vec![0x10], vec![0; 12]),
            Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
            Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
            Transaction::write_read(ADDR, vec![0x13], {
                let mut sound = vec![0; 18];
                sound[0] = 40;
                sound
            }),
            // switch on
            Transaction::write(ADDR, vec![0x07, 2]),
            // on: air, air quality, light, particle
            Transaction::write_read(ADDR, vec![0x10], vec![0; 12]),
            Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
            Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
            Transaction::write_read(ADDR, vec![0x14], vec![5, 0, 0, 0, 0, 1]),
            // switch off
            Transaction::write(ADDR, vec![0x07, 0]),
        ];
        let power = [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ];
        let mut toggle =
            ToggleReader::new(reader(&i2c, SDS011_300S), PinMock::new(&power), 1).unwrap();
        let mut sink = Collect::default();

        toggle.read_cycle(&mut sink).unwrap();
        assert!(toggle.sensor_on());
        toggle.read_cycle(&mut sink).unwrap();
        assert!(!toggle.sensor_on());

        assert_eq!(sink.records.len(), 10);
        assert_eq!(sink.cycles, 2);
        // the first particle record and the second sound record are carried over
        match (sink.records[4], sink.records[8], sink.records[9]) {
            (Record::Particle(first), Record::Sound(sound), Record::Particle(second)) => {
                assert!(!first.valid);
                assert_eq!(sound.spl_dba, 40.0);
                assert!(second.valid);
                assert_eq!(second.duty_cycle, 5.0);
            }
            other => panic!("unexpected records {:?}", other),
        }

        let (reader, mut power) = toggle.release();
        reader.release().0.release().done();
        power.done();
    }

    #[test]
    fn stays_off_for_configured_cycles() {
        let mut i2c = Vec::new();
        for _ in 0..2 {
            i2c.extend([
                Transaction::write_read(ADDR, vec![0x10], vec![0; 12]),
                Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
                Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
                Transaction::write_read(ADDR, vec![0x13], vec![0; 18]),
            ]);
        }
        i2c.push(Transaction::write(ADDR, vec![0x07, 1]));
        let power = [PinTransaction::set(State::High)];
        let config = DeviceConfig {
            cycle_period: CyclePeriod::Period100s,
            particle_sensor: ParticleSensor::Ppd42,
        };
        let mut toggle = ToggleReader::new(reader(&i2c, config), PinMock::new(&power), 2).unwrap();
        let mut sink = Collect::default();

        toggle.read_cycle(&mut sink).unwrap();
        assert!(!toggle.sensor_on());
        toggle.read_cycle(&mut sink).unwrap();
        assert!(toggle.sensor_on());

        let (reader, mut power) = toggle.release();
        reader.release().0.release().done();
        power.done();
    }

    #[test]
    fn failed_particle_read_still_switches_sensor_off() {
        let mut i2c = vec![
            Transaction::write_read(ADDR, vec![0x10], vec![0; 12]),
            Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
            Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
            Transaction::write_read(ADDR, vec![0x13], vec![0; 18]),
            Transaction::write(ADDR, vec![0x07, 2]),
        ];
        i2c.extend([
            Transaction::write_read(ADDR, vec![0x10], vec![0; 12]),
            Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
            Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
            Transaction::write_read(ADDR, vec![0x14], vec![0; 6]).with_error(ErrorKind::Bus),
            Transaction::write(ADDR, vec![0x07, 0]),
        ]);
        let power = [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ];
        let mut toggle =
            ToggleReader::new(reader(&i2c, SDS011_300S), PinMock::new(&power), 1).unwrap();
        let mut sink = Collect::default();

        toggle.read_cycle(&mut sink).unwrap();
        assert!(toggle.sensor_on());
        let result = toggle.read_cycle(&mut sink);

        assert!(matches!(result, Err(Error::BusRead(ErrorKind::Bus))));
        assert!(!toggle.sensor_on());
        assert_eq!(sink.cycles, 1);

        let (reader, mut power) = toggle.release();
        reader.release().0.release().done();
        power.done();
    }

    #[test]
    fn run_closes_failed_cycle() {
        let i2c = [
            Transaction::write_read(ADDR, vec![0x10], vec![0; 12]).with_error(ErrorKind::Other),
            Transaction::write(ADDR, vec![0x07, 2]),
        ];
        let power = [PinTransaction::set(State::High)];
        let reader = CycleReader::new(
            Ms430::new(I2cMock::new(&i2c), ADDR),
            Scripted(VecDeque::from([true])),
            NoopDelay::new(),
            SDS011_300S,
        );
        let mut toggle = ToggleReader::new(reader, PinMock::new(&power), 1).unwrap();
        let mut sink = Collect::default();
        let result = toggle.run(&mut sink);

        assert!(matches!(result, Err(Error::Gpio(GpioErrorKind::Other))));
        assert!(sink.records.is_empty());
        assert_eq!(sink.cycles, 1);
        assert!(toggle.sensor_on());

        let (reader, mut power) = toggle.release();
        reader.release().0.release().done();
        power.done();
    }
}
