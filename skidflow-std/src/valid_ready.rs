//! Utilities for valid-ready channels.
//!
//! A transfer happens on a tick where both `valid` and `ready` are asserted.

use skidflow::*;
use thiserror::Error;

/// Valid/ready channel's forward signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valid<V: Signal> {
    /// Inner data
    pub inner: V,

    /// Valid bit
    pub valid: bool,
}

impl<V: Signal> Valid<V> {
    /// Creates a new value.
    pub fn new(valid: bool, inner: V) -> Self { Self { inner, valid } }

    /// Creates a valid value.
    pub fn valid(inner: V) -> Self { Self::new(true, inner) }

    /// Maps the inner value.
    pub fn map_inner<W: Signal>(self, f: impl FnOnce(V) -> W) -> Valid<W> {
        Valid { inner: f(self.inner), valid: self.valid }
    }

    /// Returns `true` if a transfer happens against the given backward signal.
    pub fn transfer(&self, bwd: &Ready) -> bool { self.valid && bwd.ready }
}

impl Valid<Bits> {
    /// Creates an invalid value with all-zero data.
    pub fn invalid(width: usize) -> Self { Self::new(false, Bits::zero(width)) }
}

impl<V: Signal> Signal for Valid<V> {
    fn width(&self) -> usize { self.inner.width() + 1 }

    fn transl(&self) -> Vec<bool> {
        let mut bits = self.inner.transl();
        bits.push(self.valid);
        bits
    }
}

/// Ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new value.
    pub fn new(ready: bool) -> Self { Self { ready } }
}

impl Signal for Ready {
    fn width(&self) -> usize { 1 }

    fn transl(&self) -> Vec<bool> { vec![self.ready] }
}

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("valid withdrawn before transfer at cycle {cycle}")]
    ValidDropped { cycle: u64 },

    #[error("data changed before transfer at cycle {cycle}")]
    DataChanged { cycle: u64 },
}

/// Checks the sender side of a valid-ready channel.
///
/// Once the sender asserts `valid`, it must keep `valid` asserted and the data unchanged until
/// the receiver asserts `ready`. Reset withdraws any pending offer.
#[derive(Debug, Clone)]
pub struct ProtocolChecker<V: Signal> {
    pending: Option<V>,
    cycle: u64,
}

impl<V: Signal> Default for ProtocolChecker<V> {
    fn default() -> Self { Self { pending: None, cycle: 0 } }
}

impl<V: Signal> ProtocolChecker<V> {
    /// Creates a new checker.
    pub fn new() -> Self { Self::default() }

    /// Observes one tick of the channel.
    pub fn observe(&mut self, reset: bool, fwd: &Valid<V>, bwd: &Ready) -> Result<(), ProtocolError> {
        let cycle = self.cycle;
        self.cycle += 1;

        if reset {
            self.pending = None;
            return Ok(());
        }

        if let Some(pending) = self.pending.take() {
            if !fwd.valid {
                return Err(ProtocolError::ValidDropped { cycle });
            }
            if fwd.inner != pending {
                return Err(ProtocolError::DataChanged { cycle });
            }
        }

        if fwd.valid && !bwd.ready {
            self.pending = Some(fwd.inner.clone());
        }

        Ok(())
    }
}
