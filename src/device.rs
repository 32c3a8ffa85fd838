use embedded_hal::i2c::I2c;
use log::{debug, trace};

use crate::config::{CyclePeriod, DeviceConfig, ParticleSensor};
use crate::error::Error;
use crate::registers::{
    Command, DataBlock, AIR_DATA_BYTES, AIR_QUALITY_DATA_BYTES, CYCLE_TIME_PERIOD_REG,
    LIGHT_DATA_BYTES, PARTICLE_DATA_BYTES, PARTICLE_SENSOR_SELECT_REG, SOUND_DATA_BYTES,
};
use crate::types::{AirData, AirQualityData, LightData, ParticleData, SoundData};

/// MS430 on an I2C bus.
pub struct Ms430<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Ms430<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Ms430 { i2c, address }
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        trace!("write register {:#04x} <- {:#04x}", register, value);
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Error::BusWrite)
    }

    fn write_command(&mut self, command: Command) -> Result<(), Error<E>> {
        trace!("command {:?} ({:#04x})", command, command.as_byte());
        self.i2c
            .write(self.address, &[command.as_byte()])
            .map_err(Error::BusWrite)
    }

    fn read_block<const N: usize>(&mut self, block: DataBlock) -> Result<[u8; N], Error<E>> {
        let (register, len) = block.as_tuple();
        debug_assert_eq!(len, N);

        let mut buffer = [0; N];
        self.i2c
            .write_read(self.address, &[register], &mut buffer)
            .map_err(Error::BusRead)?;
        trace!("read {:?} block {:#04x}: {:02x?}", block, register, buffer);
        Ok(buffer)
    }

    /// Sends the reset command. The device drops back to standby and deasserts
    /// READY until the reset completes.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::Reset)
    }

    /// Selects the attached particle sensor. Does nothing for
    /// [`ParticleSensor::Off`], which is the power-on default.
    pub fn select_particle_sensor(&mut self, sensor: ParticleSensor) -> Result<(), Error<E>> {
        if !sensor.is_enabled() {
            return Ok(());
        }
        self.set_particle_sensor(sensor)
    }

    /// Writes the particle sensor selector unconditionally, which also allows
    /// stopping particle detection by writing [`ParticleSensor::Off`].
    pub fn set_particle_sensor(&mut self, sensor: ParticleSensor) -> Result<(), Error<E>> {
        self.write_register(PARTICLE_SENSOR_SELECT_REG, sensor.value())
    }

    pub fn set_cycle_period(&mut self, period: CyclePeriod) -> Result<(), Error<E>> {
        self.write_register(CYCLE_TIME_PERIOD_REG, period.value())
    }

    /// Starts free-running measurements. The device state change is not
    /// observable here; new data are signalled on the READY line.
    pub fn enter_cycle_mode(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::CycleMode)
    }

    /// Applies the particle sensor selection and the cycle period.
    pub fn configure(&mut self, config: &DeviceConfig) -> Result<(), Error<E>> {
        debug!(
            "configuring particle sensor {} with a {} cycle",
            config.particle_sensor, config.cycle_period
        );
        self.select_particle_sensor(config.particle_sensor)?;
        self.set_cycle_period(config.cycle_period)
    }

    pub fn read_air_data(&mut self) -> Result<AirData, Error<E>> {
        let raw = self.read_block::<AIR_DATA_BYTES>(DataBlock::Air)?;
        Ok(AirData::from_bytes(&raw))
    }

    /// Air quality data are only valid in cycle mode, once the accuracy field
    /// is non-zero.
    pub fn read_air_quality_data(&mut self) -> Result<AirQualityData, Error<E>> {
        let raw = self.read_block::<AIR_QUALITY_DATA_BYTES>(DataBlock::AirQuality)?;
        Ok(AirQualityData::from_bytes(&raw))
    }

    pub fn read_light_data(&mut self) -> Result<LightData, Error<E>> {
        let raw = self.read_block::<LIGHT_DATA_BYTES>(DataBlock::Light)?;
        Ok(LightData::from_bytes(&raw))
    }

    pub fn read_sound_data(&mut self) -> Result<SoundData, Error<E>> {
        let raw = self.read_block::<SOUND_DATA_BYTES>(DataBlock::Sound)?;
        Ok(SoundData::from_bytes(&raw))
    }

    pub fn read_particle_data(&mut self, sensor: ParticleSensor) -> Result<ParticleData, Error<E>> {
        let raw = self.read_block::<PARTICLE_DATA_BYTES>(DataBlock::Particle)?;
        Ok(ParticleData::from_bytes(&raw, sensor))
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    use super::*;
    use crate::registers::DEFAULT_ADDRESS;

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn cycle_period_register_values() {
        for (period, value) in [
            (CyclePeriod::Period3s, 0),
            (CyclePeriod::Period100s, 1),
            (CyclePeriod::Period300s, 2),
        ] {
            let expectations = [Transaction::write(ADDR, vec![0x89, value])];
            let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
            ms430.set_cycle_period(period).unwrap();
            ms430.release().done();
        }
    }

    #[test]
    fn particle_sensor_off_writes_nothing() {
        let mut ms430 = Ms430::new(I2cMock::new(&[]), ADDR);
        ms430.select_particle_sensor(ParticleSensor::Off).unwrap();
        ms430.release().done();
    }

    #[test]
    fn particle_sensor_register_values() {
        for (sensor, value) in [(ParticleSensor::Ppd42, 1), (ParticleSensor::Sds011, 2)] {
            let expectations = [Transaction::write(ADDR, vec![0x07, value])];
            let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
            ms430.select_particle_sensor(sensor).unwrap();
            ms430.release().done();
        }
    }

    #[test]
    fn configure_then_enter_cycle_mode() {
        let expectations = [
            Transaction::write(ADDR, vec![0x07, 2]),
            Transaction::write(ADDR, vec![0x89, 1]),
            Transaction::write(ADDR, vec![0xE4]),
        ];
        let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
        let config = DeviceConfig {
            cycle_period: CyclePeriod::Period100s,
            particle_sensor: ParticleSensor::Sds011,
        };
        ms430.configure(&config).unwrap();
        ms430.enter_cycle_mode().unwrap();
        ms430.release().done();
    }

    #[test]
    fn failed_write_is_bus_write_error() {
        let expectations = [Transaction::write(ADDR, vec![0x89, 0]).with_error(ErrorKind::Other)];
        let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
        let result = ms430.set_cycle_period(CyclePeriod::Period3s);
        assert!(matches!(result, Err(Error::BusWrite(ErrorKind::Other))));
        ms430.release().done();
    }

    #[test]
    fn read_air_block() {
        let expectations = [Transaction::write_read(
            ADDR,
            vec![0x10],
            vec![25, 5, 0x68, 0xD8, 0, 0, 50, 0, 0x10, 0x27, 0, 0],
        )];
        let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
        let air = ms430.read_air_data().unwrap();
        assert_eq!(air.temperature, 25.5);
        assert_eq!(air.pressure, 55_400);
        assert_eq!(air.humidity, 50.0);
        assert_eq!(air.gas_resistance, 10_000);
        ms430.release().done();
    }

    #[test]
    fn block_lengths_match_register_map() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0x11], vec![0; 10]),
            Transaction::write_read(ADDR, vec![0x12], vec![0; 5]),
            Transaction::write_read(ADDR, vec![0x13], vec![0; 18]),
            Transaction::write_read(ADDR, vec![0x14], vec![0; 6]),
        ];
        let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
        assert!(!ms430.read_air_quality_data().unwrap().is_valid());
        assert_eq!(ms430.read_light_data().unwrap().white, 0);
        assert!(!ms430.read_sound_data().unwrap().stable);
        assert!(!ms430.read_particle_data(ParticleSensor::Ppd42).unwrap().valid);
        ms430.release().done();
    }

    #[test]
    fn failed_read_is_bus_read_error() {
        let expectations =
            [Transaction::write_read(ADDR, vec![0x13], vec![0; 18]).with_error(ErrorKind::Other)];
        let mut ms430 = Ms430::new(I2cMock::new(&expectations), ADDR);
        assert!(matches!(ms430.read_sound_data(), Err(Error::BusRead(_))));
        ms430.release().done();
    }
}
