//! MS430 register map.

/// Default 7-bit I2C address (solder bridge open).
pub const DEFAULT_ADDRESS: u8 = 0x71;
/// 7-bit I2C address with the address solder bridge closed.
pub const ALTERNATE_ADDRESS: u8 = 0x70;

/// Particle sensor selector.
pub const PARTICLE_SENSOR_SELECT_REG: u8 = 0x07;
/// Cycle time period selector.
pub const CYCLE_TIME_PERIOD_REG: u8 = 0x89;

pub const AIR_DATA_BYTES: usize = 12;
pub const AIR_QUALITY_DATA_BYTES: usize = 10;
pub const LIGHT_DATA_BYTES: usize = 5;
pub const SOUND_DATA_BYTES: usize = 18;
pub const PARTICLE_DATA_BYTES: usize = 6;

/// Number of sound frequency bands reported in the sound block.
pub const SOUND_FREQ_BANDS: usize = 6;

/// Single byte commands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resets the device into standby mode.
    Reset,
    /// Starts free-running periodic measurements.
    CycleMode,
}

impl Command {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Reset => 0xE2,
            Self::CycleMode => 0xE4,
        }
    }
}

/// Fixed-length data blocks released once per cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBlock {
    Air,
    AirQuality,
    Light,
    Sound,
    Particle,
}

impl DataBlock {
    /// Returns the start register and the block length in bytes.
    pub fn as_tuple(self) -> (u8, usize) {
        match self {
            Self::Air => (0x10, AIR_DATA_BYTES),
            Self::AirQuality => (0x11, AIR_QUALITY_DATA_BYTES),
            Self::Light => (0x12, LIGHT_DATA_BYTES),
            Self::Sound => (0x13, SOUND_DATA_BYTES),
            Self::Particle => (0x14, PARTICLE_DATA_BYTES),
        }
    }
}
