//! Output stage strategies.

use std::fmt;

use skidflow::*;

use crate::valid_ready::*;

/// Output stage of a skid buffer: presents the current item to the consumer.
///
/// Both strategies see the same inputs and only differ in when the presented value is computed.
pub trait OutputStage: 'static + fmt::Debug + Send {
    /// Registers of the stage.
    type State: Signal + Send;

    /// Whether the output goes through a register.
    const REGISTERED: bool;

    /// Creates the stage.
    fn new(low_power: bool) -> Self;

    /// Initial value of the registers.
    fn init(&self, width: usize) -> Self::State;

    /// Output presented to the consumer in the current tick.
    fn present(&self, reset: bool, i_fwd: &Valid<Bits>, shadow: &Valid<Bits>, state: &Self::State) -> Valid<Bits>;

    /// Next value of the registers.
    fn next(
        &self, reset: bool, i_fwd: &Valid<Bits>, shadow: &Valid<Bits>, o_fwd: &Valid<Bits>, o_bwd: &Ready,
        state: &Self::State,
    ) -> Self::State;

    /// Returns `true` if the registers hold an item.
    fn holds(state: &Self::State) -> bool;
}

/// Item the output slot takes next: the shadowed one first, then fresh upstream data.
///
/// In low-power mode, nothing to forward means zero.
pub(crate) fn forward_data(low_power: bool, i_fwd: &Valid<Bits>, shadow: &Valid<Bits>) -> Bits {
    select! {
        shadow.valid => shadow.inner.clone(),
        !low_power || i_fwd.valid => i_fwd.inner.clone(),
        default => Bits::zero(i_fwd.inner.width()),
    }
}

/// Output held in its own register; back-pressure freezes it.
///
/// Cuts every combinational path between the two sides, at the cost of one tick of latency.
#[derive(Debug, Clone, Copy)]
pub struct Registered {
    low_power: bool,
}

impl OutputStage for Registered {
    type State = Valid<Bits>;

    const REGISTERED: bool = true;

    fn new(low_power: bool) -> Self { Self { low_power } }

    fn init(&self, width: usize) -> Valid<Bits> { Valid::invalid(width) }

    fn present(&self, _: bool, _: &Valid<Bits>, _: &Valid<Bits>, state: &Valid<Bits>) -> Valid<Bits> { state.clone() }

    fn next(
        &self, reset: bool, i_fwd: &Valid<Bits>, shadow: &Valid<Bits>, o_fwd: &Valid<Bits>, o_bwd: &Ready,
        state: &Valid<Bits>,
    ) -> Valid<Bits> {
        let update = !o_fwd.valid || o_bwd.ready;

        let valid = select! {
            reset => false,
            update => i_fwd.valid || shadow.valid,
            default => state.valid,
        };
        let inner = select! {
            self.low_power && reset => Bits::zero(state.inner.width()),
            update => forward_data(self.low_power, i_fwd, shadow),
            default => state.inner.clone(),
        };

        Valid::new(valid, inner)
    }

    fn holds(state: &Valid<Bits>) -> bool { state.valid }
}

/// Output computed from the current inputs and the shadow slot, with no extra delay.
///
/// In low-power mode the data lines also read zero during reset, when `valid` is low.
#[derive(Debug, Clone, Copy)]
pub struct Combinational {
    low_power: bool,
}

impl OutputStage for Combinational {
    type State = ();

    const REGISTERED: bool = false;

    fn new(low_power: bool) -> Self { Self { low_power } }

    fn init(&self, _: usize) {}

    fn present(&self, reset: bool, i_fwd: &Valid<Bits>, shadow: &Valid<Bits>, _: &()) -> Valid<Bits> {
        let valid = !reset && (i_fwd.valid || shadow.valid);
        // Reset also blanks the data lines, so an invalid output is zero in low-power mode.
        let inner = select! {
            self.low_power && reset => Bits::zero(i_fwd.inner.width()),
            default => forward_data(self.low_power, i_fwd, shadow),
        };

        Valid::new(valid, inner)
    }

    fn next(&self, _: bool, _: &Valid<Bits>, _: &Valid<Bits>, _: &Valid<Bits>, _: &Ready, _: &()) {}

    fn holds(_: &()) -> bool { false }
}
