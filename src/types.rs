use crate::config::ParticleSensor;
use crate::registers::{
    AIR_DATA_BYTES, AIR_QUALITY_DATA_BYTES, LIGHT_DATA_BYTES, PARTICLE_DATA_BYTES,
    SOUND_DATA_BYTES, SOUND_FREQ_BANDS,
};

/// Center frequencies of the sound bands [Hz].
pub const SOUND_BAND_FREQUENCIES: [u16; SOUND_FREQ_BANDS] = [125, 250, 500, 1000, 2000, 4000];

const TEMPERATURE_SIGN_MASK: u8 = 0x80;
const TEMPERATURE_VALUE_MASK: u8 = 0x7F;

/// Fixed point value made of an integer part and a fraction in tenths.
fn tenths(integer: u32, fraction: u8) -> f32 {
    integer as f32 + fraction as f32 / 10.0
}

/// Fixed point value made of an integer part and a fraction in hundredths.
fn hundredths(integer: u32, fraction: u8) -> f32 {
    integer as f32 + fraction as f32 / 100.0
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Air data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirData {
    /// Temperature [°C] [1 decimal place]
    pub temperature: f32,
    /// Air pressure [Pa]
    pub pressure: u32,
    /// Relative humidity [%RH] [1 decimal place]
    pub humidity: f32,
    /// Gas sensor resistance [Ω]
    pub gas_resistance: u32,
}

impl AirData {
    pub fn from_bytes(raw: &[u8; AIR_DATA_BYTES]) -> Self {
        let magnitude = tenths((raw[0] & TEMPERATURE_VALUE_MASK) as u32, raw[1]);
        let temperature = if raw[0] & TEMPERATURE_SIGN_MASK != 0 {
            -magnitude
        } else {
            magnitude
        };

        Self {
            temperature,
            pressure: le_u32(&raw[2..6]),
            humidity: tenths(raw[6] as u32, raw[7]),
            gas_resistance: le_u32(&raw[8..12]),
        }
    }

    pub fn temperature_fahrenheit(&self) -> f32 {
        self.temperature * 1.8 + 32.0
    }
}

/// Air quality data. Only meaningful once the initial self-calibration has
/// progressed far enough for `accuracy` to become non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityData {
    /// Air quality index [1 decimal place]
    pub aqi: f32,
    /// Estimated CO₂ [ppm] [1 decimal place]
    pub co2e: f32,
    /// Equivalent breath VOC [ppm] [2 decimal places]
    pub bvoc: f32,
    /// Self-calibration state, 0 (not yet valid) to 3 (high accuracy)
    pub accuracy: u8,
}

impl AirQualityData {
    pub fn from_bytes(raw: &[u8; AIR_QUALITY_DATA_BYTES]) -> Self {
        Self {
            aqi: tenths(le_u16(&raw[0..2]) as u32, raw[2]),
            co2e: tenths(le_u16(&raw[3..5]) as u32, raw[5]),
            bvoc: hundredths(le_u16(&raw[6..8]) as u32, raw[8]),
            accuracy: raw[9],
        }
    }

    /// False while the self-calibration is incomplete, whatever the other
    /// fields contain.
    pub fn is_valid(&self) -> bool {
        self.accuracy != 0
    }

    pub fn accuracy_description(&self) -> &'static str {
        match self.accuracy {
            0 => "Not Yet Valid, Self-calibration Incomplete",
            1 => "Low Accuracy, Self-calibration Ongoing",
            2 => "Medium Accuracy, Self-calibration Ongoing",
            3 => "High Accuracy",
            _ => "Unknown",
        }
    }

    pub fn aqi_description(&self) -> &'static str {
        match self.aqi {
            aqi if aqi < 50.0 => "Good",
            aqi if aqi < 100.0 => "Acceptable",
            aqi if aqi < 150.0 => "Substandard",
            aqi if aqi < 200.0 => "Poor",
            aqi if aqi < 300.0 => "Bad",
            _ => "Very Bad",
        }
    }
}

/// Light data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightData {
    /// Illuminance [lux] [2 decimal places]
    pub illuminance: f32,
    /// White light level, arbitrary units
    pub white: u16,
}

impl LightData {
    pub fn from_bytes(raw: &[u8; LIGHT_DATA_BYTES]) -> Self {
        Self {
            illuminance: hundredths(le_u16(&raw[0..2]) as u32, raw[2]),
            white: le_u16(&raw[3..5]),
        }
    }
}

/// Sound data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundData {
    /// A-weighted sound pressure level [dBA] [1 decimal place]
    pub spl_dba: f32,
    /// Sound pressure level per frequency band [dB] [1 decimal place], see
    /// [`SOUND_BAND_FREQUENCIES`]
    pub spl_bands: [f32; SOUND_FREQ_BANDS],
    /// Peak sound amplitude [mPa] [2 decimal places]
    pub peak_amplitude: f32,
    /// Whether the microphone had settled when the data were taken
    pub stable: bool,
}

impl SoundData {
    pub fn from_bytes(raw: &[u8; SOUND_DATA_BYTES]) -> Self {
        let mut spl_bands = [0.0; SOUND_FREQ_BANDS];
        for (i, band) in spl_bands.iter_mut().enumerate() {
            *band = tenths(raw[2 + i] as u32, raw[2 + SOUND_FREQ_BANDS + i]);
        }

        Self {
            spl_dba: tenths(raw[0] as u32, raw[1]),
            spl_bands,
            peak_amplitude: hundredths(le_u16(&raw[14..16]) as u32, raw[16]),
            stable: raw[17] != 0,
        }
    }
}

/// Particle data. Garbage unless a particle sensor is attached, and only
/// valid after the roughly one minute warm-up of the device's filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleData {
    /// Sensor duty cycle [%] [2 decimal places]
    pub duty_cycle: f32,
    /// Particle concentration [2 decimal places], unit depends on `sensor`
    pub concentration: f32,
    /// False while the device is still initializing the particle data
    pub valid: bool,
    /// Sensor the data were configured for
    pub sensor: ParticleSensor,
}

impl ParticleData {
    pub fn from_bytes(raw: &[u8; PARTICLE_DATA_BYTES], sensor: ParticleSensor) -> Self {
        Self {
            duty_cycle: hundredths(raw[0] as u32, raw[1]),
            concentration: hundredths(le_u16(&raw[2..4]) as u32, raw[4]),
            valid: raw[5] != 0,
            sensor,
        }
    }

    pub fn concentration_unit(&self) -> &'static str {
        self.sensor.concentration_unit()
    }
}

/// One decoded data block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record {
    Air(AirData),
    AirQuality(AirQualityData),
    Light(LightData),
    Sound(SoundData),
    Particle(ParticleData),
}
