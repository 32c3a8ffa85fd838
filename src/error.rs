use std::fmt;
use std::io;

use embedded_hal::digital::ErrorKind as GpioErrorKind;

/// MS430 errors, generic over the I2C bus error type.
#[derive(Debug)]
pub enum Error<E> {
    /// Writing a register or command failed (device absent, NACK, bus error)
    BusWrite(E),
    /// Reading a data block failed
    BusRead(E),
    /// The READY line or the particle sensor power line could not be accessed
    Gpio(GpioErrorKind),
    /// The output sink rejected a record
    Output(io::Error),
}

impl<E> From<io::Error> for Error<E> {
    fn from(e: io::Error) -> Self {
        Error::Output(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BusWrite(e) => write!(f, "I2C write to the MS430 failed: {:?}", e),
            Error::BusRead(e) => write!(f, "I2C read from the MS430 failed: {:?}", e),
            Error::Gpio(kind) => write!(f, "GPIO error: {:?}", kind),
            Error::Output(e) => write!(f, "could not write output: {}", e),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Output(e) => Some(e),
            _ => None,
        }
    }
}
