//! Reference model of a skid buffer's item flow.
//!
//! Every item accepted from the producer must reach the consumer exactly once and in order, with
//! at most two items inside the buffer at any time.

use arrayvec::ArrayVec;
use skidflow::*;
use thiserror::Error;

use crate::buffer_skid::{TickInput, TickOutput};

/// Items a skid buffer may hold: the output slot and the shadow slot.
pub const MAX_IN_FLIGHT: usize = 2;

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreboardError {
    #[error("cycle {cycle}: more than {MAX_IN_FLIGHT} items in flight")]
    CapacityExceeded { cycle: u64 },

    #[error("cycle {cycle}: delivered {found} with nothing in flight")]
    Spurious { cycle: u64, found: Bits },

    #[error("cycle {cycle}: delivered {found} again")]
    Duplicated { cycle: u64, found: Bits },

    #[error("cycle {cycle}: delivered {found} before {expected}")]
    Lost { cycle: u64, expected: Bits, found: Bits },

    #[error("cycle {cycle}: delivered {found}, expected {expected}")]
    Corrupted { cycle: u64, expected: Bits, found: Bits },

    #[error("cycle {cycle}: invalid output carries {found} in low-power mode")]
    LowPowerLeak { cycle: u64, found: Bits },
}

/// Tracks the items inside a skid buffer from its ports.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    low_power: bool,
    in_flight: ArrayVec<Bits, MAX_IN_FLIGHT>,
    last_delivered: Option<Bits>,
    accepted: u64,
    delivered: u64,
    cycle: u64,
}

impl Scoreboard {
    /// Creates a new scoreboard. With `low_power`, invalid outputs must carry zero.
    pub fn new(low_power: bool) -> Self {
        Self { low_power, in_flight: ArrayVec::new(), last_delivered: None, accepted: 0, delivered: 0, cycle: 0 }
    }

    /// Observes one tick at the buffer's ports.
    ///
    /// Items accepted in a tick are visible to the consumer in the same tick, so acceptance is
    /// recorded before delivery. Reset drops everything in flight.
    pub fn observe(&mut self, input: &TickInput, output: &TickOutput) -> Result<(), ScoreboardError> {
        let cycle = self.cycle;
        self.cycle += 1;

        if input.reset {
            self.in_flight.clear();
            self.last_delivered = None;
            return Ok(());
        }

        if self.low_power && !output.downstream.valid && !output.downstream.inner.is_zero() {
            return Err(ScoreboardError::LowPowerLeak { cycle, found: output.downstream.inner.clone() });
        }

        if input.accepted(output) {
            self.in_flight
                .try_push(input.upstream.inner.clone())
                .map_err(|_| ScoreboardError::CapacityExceeded { cycle })?;
            self.accepted += 1;
        }

        if input.delivered(output) {
            let found = output.downstream.inner.clone();
            let expected =
                some_or!(self.in_flight.pop_at(0), return Err(ScoreboardError::Spurious { cycle, found }));

            if found != expected {
                return Err(if self.in_flight.contains(&found) {
                    ScoreboardError::Lost { cycle, expected, found }
                } else if self.last_delivered.as_ref() == Some(&found) {
                    ScoreboardError::Duplicated { cycle, found }
                } else {
                    ScoreboardError::Corrupted { cycle, expected, found }
                });
            }

            self.last_delivered = Some(found);
            self.delivered += 1;
        }

        Ok(())
    }

    /// Items accepted from the producer but not yet delivered.
    pub fn in_flight(&self) -> &[Bits] { &self.in_flight }

    /// Number of items accepted from the producer.
    pub fn accepted(&self) -> u64 { self.accepted }

    /// Number of items delivered to the consumer.
    pub fn delivered(&self) -> u64 { self.delivered }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valid_ready::*;

    fn word(value: u64) -> Bits { Bits::from_u64(8, value) }

    fn port(
        offer: Option<u64>, upstream_ready: bool, present: Option<u64>, downstream_ready: bool,
    ) -> (TickInput, TickOutput) {
        let valid = |value: Option<u64>| value.map_or_else(|| Valid::invalid(8), |value| Valid::valid(word(value)));
        (
            TickInput::new(valid(offer), Ready::new(downstream_ready)),
            TickOutput { upstream: Ready::new(upstream_ready), downstream: valid(present) },
        )
    }

    #[test]
    fn in_order_flow() {
        let mut scoreboard = Scoreboard::new(true);
        for (input, output) in [
            port(Some(1), true, None, false),
            port(Some(2), true, Some(1), false),
            port(None, false, Some(1), true),
            port(None, true, Some(2), true),
        ] {
            scoreboard.observe(&input, &output).unwrap();
        }
        assert_eq!(scoreboard.accepted(), 2);
        assert_eq!(scoreboard.delivered(), 2);
        assert!(scoreboard.in_flight().is_empty());
    }

    #[test]
    fn pass_through_in_one_tick() {
        let mut scoreboard = Scoreboard::new(false);
        let (input, output) = port(Some(4), true, Some(4), true);
        scoreboard.observe(&input, &output).unwrap();
        assert_eq!(scoreboard.delivered(), 1);
    }

    #[test]
    fn detects_errors() {
        let mut scoreboard = Scoreboard::new(false);
        let (input, output) = port(None, true, Some(3), true);
        assert!(matches!(scoreboard.observe(&input, &output), Err(ScoreboardError::Spurious { .. })));

        let mut scoreboard = Scoreboard::new(false);
        let (input, output) = port(Some(1), true, None, false);
        scoreboard.observe(&input, &output).unwrap();
        let (input, output) = port(Some(2), true, Some(2), true);
        assert!(matches!(scoreboard.observe(&input, &output), Err(ScoreboardError::Lost { .. })));

        let mut scoreboard = Scoreboard::new(false);
        for (input, output) in [port(Some(1), true, Some(1), true), port(Some(2), true, None, false)] {
            scoreboard.observe(&input, &output).unwrap();
        }
        let (input, output) = port(None, false, Some(1), true);
        assert!(matches!(scoreboard.observe(&input, &output), Err(ScoreboardError::Duplicated { .. })));

        let mut scoreboard = Scoreboard::new(false);
        for (input, output) in [port(Some(1), true, None, false), port(Some(2), true, None, false)] {
            scoreboard.observe(&input, &output).unwrap();
        }
        let (input, output) = port(Some(3), true, None, false);
        assert_eq!(scoreboard.observe(&input, &output), Err(ScoreboardError::CapacityExceeded { cycle: 2 }));
    }

    #[test]
    fn detects_low_power_leak() {
        let mut scoreboard = Scoreboard::new(true);
        let input = TickInput::new(Valid::invalid(8), Ready::new(true));
        let output = TickOutput { upstream: Ready::new(true), downstream: Valid::new(false, word(9)) };
        assert!(matches!(scoreboard.observe(&input, &output), Err(ScoreboardError::LowPowerLeak { .. })));

        // The same lines are fine without low-power.
        Scoreboard::new(false).observe(&input, &output).unwrap();
    }

    #[test]
    fn reset_drops_in_flight() {
        let mut scoreboard = Scoreboard::new(false);
        let (input, output) = port(Some(1), true, None, false);
        scoreboard.observe(&input, &output).unwrap();

        scoreboard.observe(&TickInput::reset(8), &output).unwrap();
        assert!(scoreboard.in_flight().is_empty());
    }
}
