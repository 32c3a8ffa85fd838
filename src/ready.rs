//! READY line handling.
//!
//! The MS430 pulls READY low when it can accept commands and when a new data
//! release is available. In cycle mode the line rises while a measurement is
//! in progress, so a falling edge marks fresh data.

use embedded_hal::digital::{Error as _, ErrorKind, InputPin};
use log::trace;

/// Source of the data ready signal.
pub trait ReadySignal {
    /// Non-blocking check for a falling edge since the previous check.
    fn poll_edge_event(&mut self) -> Result<bool, ErrorKind>;

    /// Current level of the signal, true when READY is asserted.
    fn is_ready(&mut self) -> Result<bool, ErrorKind>;
}

/// Falling edge detector sampling an input pin.
///
/// Edges are detected between successive samples, so the line must stay low
/// for longer than the polling interval. The MS430 holds READY low until the
/// next measurement starts.
pub struct FallingEdge<P> {
    pin: P,
    last_high: Option<bool>,
}

impl<P: InputPin> FallingEdge<P> {
    pub fn new(pin: P) -> Self {
        FallingEdge {
            pin,
            last_high: None,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }

    fn sample(&mut self) -> Result<(bool, bool), ErrorKind> {
        let high = self.pin.is_high().map_err(|e| e.kind())?;
        let falling = self.last_high == Some(true) && !high;
        self.last_high = Some(high);
        Ok((high, falling))
    }
}

impl<P: InputPin> ReadySignal for FallingEdge<P> {
    fn poll_edge_event(&mut self) -> Result<bool, ErrorKind> {
        let (_, falling) = self.sample()?;
        if falling {
            trace!("READY falling edge");
        }
        Ok(falling)
    }

    fn is_ready(&mut self) -> Result<bool, ErrorKind> {
        let (high, _) = self.sample()?;
        Ok(!high)
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};

    use super::*;

    #[test]
    fn reports_only_high_to_low_transitions() {
        let expectations = [
            Transaction::get(State::Low),
            Transaction::get(State::High),
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
        ];
        let mut ready = FallingEdge::new(PinMock::new(&expectations));

        assert!(!ready.poll_edge_event().unwrap());
        assert!(!ready.poll_edge_event().unwrap());
        assert!(!ready.poll_edge_event().unwrap());
        assert!(ready.poll_edge_event().unwrap());
        assert!(!ready.poll_edge_event().unwrap());

        ready.release().done();
    }

    #[test]
    fn first_sample_is_never_an_edge() {
        let expectations = [Transaction::get(State::Low)];
        let mut ready = FallingEdge::new(PinMock::new(&expectations));
        assert!(!ready.poll_edge_event().unwrap());
        ready.release().done();
    }

    #[test]
    fn level_is_active_low() {
        let expectations = [
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::High),
        ];
        let mut ready = FallingEdge::new(PinMock::new(&expectations));

        assert!(!ready.is_ready().unwrap());
        assert!(ready.is_ready().unwrap());
        // a level check also feeds the edge detector
        assert!(!ready.poll_edge_event().unwrap());

        ready.release().done();
    }
}
