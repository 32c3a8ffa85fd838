//! Text rendering of decoded records.

use std::io::{self, Write};

use crate::config::{OutputFormat, OutputSettings, TemperatureUnit};
use crate::types::{
    AirData, AirQualityData, LightData, ParticleData, Record, SoundData, SOUND_BAND_FREQUENCIES,
};

const SEPARATOR: &str = "-------------------------------------------";

/// Destination for the records of each cycle.
pub trait RecordSink {
    fn emit(&mut self, record: &Record) -> io::Result<()>;

    /// Called once all records of a cycle were emitted.
    fn end_cycle(&mut self) -> io::Result<()>;
}

/// Writes records as text, either labeled with units or as bare columns.
pub struct ConsoleSink<W> {
    out: W,
    settings: OutputSettings,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, settings: OutputSettings) -> Self {
        ConsoleSink { out, settings }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn columns(&self) -> bool {
        self.settings.format == OutputFormat::Columns
    }

    fn write_air(&mut self, data: &AirData) -> io::Result<()> {
        let (temperature, unit) = match self.settings.temperature_unit {
            TemperatureUnit::Celsius => (data.temperature, "°C"),
            TemperatureUnit::Fahrenheit => (data.temperature_fahrenheit(), "°F"),
        };

        if self.columns() {
            return write!(
                self.out,
                "{:.1} {} {:.1} {} ",
                temperature, data.pressure, data.humidity, data.gas_resistance
            );
        }
        writeln!(self.out, "Temperature = {:.1} {}", temperature, unit)?;
        writeln!(self.out, "Pressure = {} Pa", data.pressure)?;
        writeln!(self.out, "Humidity = {:.1} %", data.humidity)?;
        writeln!(self.out, "Gas Sensor Resistance = {} Ω", data.gas_resistance)
    }

    fn write_air_quality(&mut self, data: &AirQualityData) -> io::Result<()> {
        if self.columns() {
            return write!(
                self.out,
                "{:.1} {:.1} {:.2} {} ",
                data.aqi, data.co2e, data.bvoc, data.accuracy
            );
        }

        if data.is_valid() {
            writeln!(self.out, "Air Quality Index = {:.1}", data.aqi)?;
            writeln!(self.out, "Air Quality Summary: {}", data.aqi_description())?;
            writeln!(self.out, "Estimated CO₂ = {:.1} ppm", data.co2e)?;
            writeln!(self.out, "Equivalent Breath VOC = {:.2} ppm", data.bvoc)?;
        } else {
            writeln!(
                self.out,
                "Air Quality Index = {:.1} ({})",
                data.aqi,
                data.accuracy_description()
            )?;
        }
        writeln!(self.out, "Air Quality Accuracy: {}", data.accuracy_description())
    }

    fn write_light(&mut self, data: &LightData) -> io::Result<()> {
        if self.columns() {
            return write!(self.out, "{:.2} {} ", data.illuminance, data.white);
        }
        writeln!(self.out, "Illuminance = {:.2} lux", data.illuminance)?;
        writeln!(self.out, "White Light Level = {}", data.white)
    }

    fn write_sound(&mut self, data: &SoundData) -> io::Result<()> {
        if self.columns() {
            write!(self.out, "{:.1} ", data.spl_dba)?;
            for band in data.spl_bands.iter() {
                write!(self.out, "{:.1} ", band)?;
            }
            return write!(self.out, "{:.2} {} ", data.peak_amplitude, data.stable as u8);
        }

        writeln!(self.out, "A-weighted Sound Pressure Level = {:.1} dBA", data.spl_dba)?;
        for (i, (band, frequency)) in data.spl_bands.iter().zip(SOUND_BAND_FREQUENCIES).enumerate() {
            writeln!(
                self.out,
                "Frequency Band {} ({} Hz) SPL = {:.1} dB",
                i + 1,
                frequency,
                band
            )?;
        }
        writeln!(self.out, "Peak Sound Amplitude = {:.2} mPa", data.peak_amplitude)?;
        let stability = if data.stable { "Stable" } else { "Unstable" };
        writeln!(self.out, "Sound Measurement Stability: {}", stability)
    }

    fn write_particle(&mut self, data: &ParticleData) -> io::Result<()> {
        if self.columns() {
            return write!(
                self.out,
                "{:.2} {:.2} {} ",
                data.duty_cycle, data.concentration, data.valid as u8
            );
        }
        writeln!(self.out, "Particle Duty Cycle = {:.2} %", data.duty_cycle)?;
        writeln!(
            self.out,
            "Particle Concentration = {:.2} {}",
            data.concentration,
            data.concentration_unit()
        )?;
        let valid = if data.valid { "Yes" } else { "No (Initializing)" };
        writeln!(self.out, "Particle data valid: {}", valid)
    }
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn emit(&mut self, record: &Record) -> io::Result<()> {
        match record {
            Record::Air(data) => self.write_air(data),
            Record::AirQuality(data) => self.write_air_quality(data),
            Record::Light(data) => self.write_light(data),
            Record::Sound(data) => self.write_sound(data),
            Record::Particle(data) => self.write_particle(data),
        }
    }

    fn end_cycle(&mut self) -> io::Result<()> {
        if self.columns() {
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", SEPARATOR)?;
        }
        self.out.flush()
    }
}
