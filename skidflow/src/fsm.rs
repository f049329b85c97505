//! Finite state machine (Mealy machine).

use std::fmt;

use crate::Signal;

/// Finite state machine (Mealy machine) sitting between an ingress and an egress channel.
///
/// The FSM is described by `logic`, which computes (1) the current-tick forward output to the
/// egress, (2) the current-tick backward output to the ingress, and (3) the next-tick state, all
/// from the current state and the current inputs.
pub trait Fsm: fmt::Debug {
    /// Forward signals from the ingress.
    type InFwd: Signal;

    /// Backward signals from the egress.
    type OutBwd: Signal;

    /// Forward signals to the egress.
    type OutFwd: Signal;

    /// Backward signals to the ingress.
    type InBwd: Signal;

    /// Registers.
    type State: Signal;

    /// Initial value of registers in the FSM.
    fn init(&self) -> Self::State;

    /// Combinational logic. Must not depend on anything but its arguments.
    ///
    /// `reset` is synchronous: it is sampled together with the other inputs.
    fn logic(
        &self, reset: bool, i_fwd: &Self::InFwd, o_bwd: &Self::OutBwd, state: &Self::State,
    ) -> (Self::OutFwd, Self::InBwd, Self::State);
}

/// Clocks an [`Fsm`]: owns its registers and advances them once per tick.
#[derive(Debug, Clone)]
pub struct Simulator<F: Fsm> {
    fsm: F,
    state: F::State,
    cycle: u64,
}

impl<F: Fsm> Simulator<F> {
    /// Creates a new simulator with the registers at their initial value.
    pub fn new(fsm: F) -> Self {
        let state = fsm.init();
        Self { fsm, state, cycle: 0 }
    }

    /// Evaluates one tick and commits the next state.
    ///
    /// Returns the outputs visible during the tick, i.e. before the clock edge.
    pub fn tick(&mut self, reset: bool, i_fwd: &F::InFwd, o_bwd: &F::OutBwd) -> (F::OutFwd, F::InBwd) {
        let (o_fwd, i_bwd, state_next) = self.fsm.logic(reset, i_fwd, o_bwd, &self.state);
        self.state = state_next;
        self.cycle += 1;
        (o_fwd, i_bwd)
    }

    /// Current value of the registers.
    pub fn state(&self) -> &F::State { &self.state }

    /// The simulated FSM.
    pub fn fsm(&self) -> &F { &self.fsm }

    /// Number of ticks evaluated so far.
    pub fn cycle(&self) -> u64 { self.cycle }
}
