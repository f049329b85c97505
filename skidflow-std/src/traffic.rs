//! Seeded producer and consumer for driving a skid buffer.
//!
//! The producer numbers its items from zero and, once it offers an item, keeps offering it until
//! the buffer accepts it.

use skidflow::*;

use crate::buffer_skid::{TickInput, TickOutput};
use crate::valid_ready::*;

/// How the two sides decide what to do each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Pseudo-random intent. Percentages are clamped to 100.
    Random {
        /// xorshift state
        state: u64,

        /// Chance of offering a new item when none is pending
        valid_percent: u8,

        /// Chance of the consumer being ready
        ready_percent: u8,
    },

    /// Fixed intent per tick. Past the end the producer stays idle and the consumer stays ready.
    Scripted {
        /// Whether to offer a new item when none is pending
        valid: Vec<bool>,

        /// Consumer's ready
        ready: Vec<bool>,
    },
}

impl Pattern {
    fn intent(&mut self, tick: usize) -> (bool, bool) {
        match self {
            Self::Random { state, valid_percent, ready_percent } => {
                let valid = xorshift(state) % 100 < u64::from(*valid_percent);
                let ready = xorshift(state) % 100 < u64::from(*ready_percent);
                (valid, ready)
            }
            Self::Scripted { valid, ready } => {
                (valid.get(tick).copied().unwrap_or(false), ready.get(tick).copied().unwrap_or(true))
            }
        }
    }
}

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// Producer and consumer of a skid buffer.
#[derive(Debug, Clone)]
pub struct Traffic {
    width: usize,
    pattern: Pattern,
    tick: usize,
    next_item: u64,
    pending: Option<Bits>,
}

impl Traffic {
    /// Creates a traffic driver following `pattern`.
    pub fn new(width: usize, pattern: Pattern) -> Self { Self { width, pattern, tick: 0, next_item: 0, pending: None } }

    /// Creates a pseudo-random traffic driver. The same seed yields the same traffic.
    pub fn random(width: usize, seed: u64, valid_percent: u8, ready_percent: u8) -> Self {
        // xorshift gets stuck at zero.
        let state = if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed };
        Self::new(width, Pattern::Random { state, valid_percent, ready_percent })
    }

    /// Creates a scripted traffic driver.
    pub fn scripted(width: usize, valid: Vec<bool>, ready: Vec<bool>) -> Self {
        Self::new(width, Pattern::Scripted { valid, ready })
    }

    /// Inputs for the next tick.
    pub fn next_input(&mut self) -> TickInput {
        let (want_valid, ready) = self.pattern.intent(self.tick);
        self.tick += 1;

        if self.pending.is_none() && want_valid {
            self.pending = Some(Bits::from_u64(self.width, self.next_item));
            self.next_item += 1;
        }

        let upstream = match &self.pending {
            Some(item) => Valid::valid(item.clone()),
            None => Valid::invalid(self.width),
        };
        TickInput::new(upstream, Ready::new(ready))
    }

    /// Observes the outcome of a tick. Accepted offers and reset clear the pending item.
    pub fn observe(&mut self, input: &TickInput, output: &TickOutput) {
        if input.reset || input.accepted(output) {
            self.pending = None;
        }
    }

    /// Item being offered, if any.
    pub fn pending(&self) -> Option<&Bits> { self.pending.as_ref() }

    /// Number of items created so far.
    pub fn created(&self) -> u64 { self.next_item }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(upstream_ready: bool) -> TickOutput {
        TickOutput { upstream: Ready::new(upstream_ready), downstream: Valid::invalid(8) }
    }

    #[test]
    fn holds_offer_until_accepted() {
        let mut traffic = Traffic::scripted(8, vec![true, false, false, true], vec![false, true]);

        let input = traffic.next_input();
        assert_eq!(input.upstream, Valid::valid(Bits::from_u64(8, 0)));
        assert!(!input.downstream.ready);
        traffic.observe(&input, &outcome(false));

        // Still pending even though the script has no new offer.
        let input = traffic.next_input();
        assert_eq!(input.upstream, Valid::valid(Bits::from_u64(8, 0)));
        traffic.observe(&input, &outcome(true));

        let input = traffic.next_input();
        assert!(!input.upstream.valid);
        // Past the end of the ready script the consumer is ready.
        assert!(input.downstream.ready);
        traffic.observe(&input, &outcome(true));

        let input = traffic.next_input();
        assert_eq!(input.upstream, Valid::valid(Bits::from_u64(8, 1)));
        assert_eq!(traffic.created(), 2);
    }

    #[test]
    fn random_is_reproducible() {
        let run = |seed| {
            let mut traffic = Traffic::random(8, seed, 50, 50);
            (0..32)
                .map(|i| {
                    let input = traffic.next_input();
                    traffic.observe(&input, &outcome(i % 3 == 0));
                    input
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn random_extremes() {
        let mut traffic = Traffic::random(8, 0, 100, 0);
        for _ in 0..16 {
            let input = traffic.next_input();
            assert!(input.upstream.valid);
            assert!(!input.downstream.ready);
            traffic.observe(&input, &outcome(true));
        }
        assert_eq!(traffic.created(), 16);
    }

    #[test]
    fn reset_withdraws_offer() {
        let mut traffic = Traffic::scripted(8, vec![true], vec![]);
        let input = traffic.next_input();
        assert!(traffic.pending().is_some());

        traffic.observe(&TickInput { reset: true, ..input }, &outcome(false));
        assert!(traffic.pending().is_none());
    }
}
