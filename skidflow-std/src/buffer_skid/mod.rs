//! Skid buffer for valid-ready channels.
//!
//! Absorbs the one item that is already in flight when the consumer stops being ready, so the
//! producer sees back-pressure one tick late without anything being lost. At most two items are
//! held: one in the output slot and one in the shadow slot.

mod controller;
mod output;
mod shadow;
mod virgen;

use std::fmt;

use skidflow::*;
use static_assertions::*;
use thiserror::Error;
use tracing::{debug, trace};

pub use output::{Combinational, OutputStage, Registered};

use crate::valid_ready::*;

/// Data width used by [`SkidConfig::default`].
pub const DEFAULT_WIDTH: usize = 8;

const_assert!(DEFAULT_WIDTH > 0);

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data width must be at least one bit")]
    ZeroWidth,

    #[error("output stage does not match `registered_output = {registered_output}`")]
    StageMismatch { registered_output: bool },
}

/// Skid buffer's configuration. Fixed once the buffer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkidConfig {
    /// Zero the data lines of every invalid slot.
    pub low_power: bool,

    /// Present the output through a register instead of combinationally.
    pub registered_output: bool,

    /// Bit width of an item.
    pub width: usize,
}

impl Default for SkidConfig {
    fn default() -> Self { Self { low_power: false, registered_output: true, width: DEFAULT_WIDTH } }
}

impl SkidConfig {
    /// Sets low-power mode.
    #[must_use]
    pub fn low_power(mut self, low_power: bool) -> Self {
        self.low_power = low_power;
        self
    }

    /// Selects the output stage.
    #[must_use]
    pub fn registered_output(mut self, registered_output: bool) -> Self {
        self.registered_output = registered_output;
        self
    }

    /// Sets the data width.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Checks the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        Ok(())
    }

    /// Builds a skid buffer, choosing the output stage once.
    pub fn build(self) -> Result<Box<dyn SkidPipeline>, ConfigError> {
        let pipeline: Box<dyn SkidPipeline> = if self.registered_output {
            Box::new(Simulator::new(SkidBuffer::<Registered>::new(self)?))
        } else {
            Box::new(Simulator::new(SkidBuffer::<Combinational>::new(self)?))
        };
        Ok(pipeline)
    }
}

/// Inputs of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInput {
    /// Synchronous reset.
    pub reset: bool,

    /// Producer's offer.
    pub upstream: Valid<Bits>,

    /// Consumer's ready.
    pub downstream: Ready,
}

impl TickInput {
    /// Creates a tick with reset deasserted.
    pub fn new(upstream: Valid<Bits>, downstream: Ready) -> Self { Self { reset: false, upstream, downstream } }

    /// Creates a reset tick with both sides idle.
    pub fn reset(width: usize) -> Self {
        Self { reset: true, upstream: Valid::invalid(width), downstream: Ready::new(false) }
    }

    /// Returns `true` if an item moves from the producer into the buffer.
    pub fn accepted(&self, output: &TickOutput) -> bool { !self.reset && self.upstream.transfer(&output.upstream) }

    /// Returns `true` if an item moves from the buffer to the consumer.
    pub fn delivered(&self, output: &TickOutput) -> bool { !self.reset && output.downstream.transfer(&self.downstream) }
}

/// Outputs of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutput {
    /// Ready towards the producer.
    pub upstream: Ready,

    /// Item presented to the consumer.
    pub downstream: Valid<Bits>,
}

/// Skid buffer's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State<S: Signal> {
    /// Shadow slot. Its valid bit is the handshake controller's occupied flag.
    pub shadow: Valid<Bits>,

    /// Output stage registers.
    pub output: S,
}

impl<S: Signal> Signal for State<S> {
    fn width(&self) -> usize { self.shadow.width() + self.output.width() }

    fn transl(&self) -> Vec<bool> { self.shadow.transl().into_iter().chain(self.output.transl()).collect() }
}

/// Skid buffer with output stage `O`.
#[derive(Debug, Clone)]
pub struct SkidBuffer<O: OutputStage> {
    config: SkidConfig,
    output: O,
}

impl<O: OutputStage> SkidBuffer<O> {
    /// Creates a skid buffer. `config.registered_output` must agree with `O`.
    pub fn new(config: SkidConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.registered_output != O::REGISTERED {
            return Err(ConfigError::StageMismatch { registered_output: config.registered_output });
        }

        debug!(?config, "creating skid buffer");
        Ok(Self { config, output: O::new(config.low_power) })
    }

    /// Configuration.
    pub fn config(&self) -> &SkidConfig { &self.config }
}

impl<O: OutputStage> Fsm for SkidBuffer<O> {
    type InBwd = Ready;
    type InFwd = Valid<Bits>;
    type OutBwd = Ready;
    type OutFwd = Valid<Bits>;
    type State = State<O::State>;

    fn init(&self) -> Self::State {
        State { shadow: Valid::invalid(self.config.width), output: self.output.init(self.config.width) }
    }

    fn logic(
        &self, reset: bool, i_fwd: &Valid<Bits>, o_bwd: &Ready, state: &Self::State,
    ) -> (Valid<Bits>, Ready, Self::State) {
        let skid = &state.shadow;

        // Current-tick outputs.
        let i_bwd = controller::accept(skid);
        let o_fwd = self.output.present(reset, i_fwd, skid, &state.output);

        // Next-tick state.
        let capture = controller::capture(i_fwd, &i_bwd, &o_fwd, o_bwd);
        let shadow_next = Valid::new(
            controller::next_occupied(reset, capture, o_bwd, skid.valid),
            shadow::next_data(self.config.low_power, reset, capture, i_fwd, &o_fwd, o_bwd, &skid.inner),
        );
        let output_next = self.output.next(reset, i_fwd, skid, &o_fwd, o_bwd, &state.output);

        (o_fwd, i_bwd, State { shadow: shadow_next, output: output_next })
    }
}

/// A running skid buffer, with the output stage fixed at construction.
pub trait SkidPipeline: fmt::Debug + Send {
    /// Configuration.
    fn config(&self) -> &SkidConfig;

    /// Evaluates one tick and advances the registers.
    fn step(&mut self, input: &TickInput) -> TickOutput;

    /// Shadow slot.
    fn shadow(&self) -> &Valid<Bits>;

    /// Number of items held, in the output register and the shadow slot.
    fn occupancy(&self) -> usize;

    /// Number of ticks evaluated so far.
    fn cycle(&self) -> u64;
}

impl<O: OutputStage> SkidPipeline for Simulator<SkidBuffer<O>> {
    fn config(&self) -> &SkidConfig { self.fsm().config() }

    fn step(&mut self, input: &TickInput) -> TickOutput {
        let width = self.config().width;
        debug_assert_eq!(input.upstream.inner.width(), width, "upstream data width mismatch");
        let upstream = input.upstream.clone().map_inner(|data| data.resize(width));

        let cycle = self.cycle();
        let was_occupied = self.state().shadow.valid;
        let (downstream, upstream_ready) = self.tick(input.reset, &upstream, &input.downstream);
        let occupied = self.state().shadow.valid;

        if input.reset {
            trace!(cycle = cycle, "reset");
        } else if !was_occupied && occupied {
            trace!(cycle = cycle, data = %self.state().shadow.inner, "shadow capture");
        } else if was_occupied && !occupied {
            trace!(cycle = cycle, "shadow drain");
        }

        TickOutput { upstream: upstream_ready, downstream }
    }

    fn shadow(&self) -> &Valid<Bits> { &self.state().shadow }

    fn occupancy(&self) -> usize {
        let state = self.state();
        usize::from(state.shadow.valid) + usize::from(O::holds(&state.output))
    }

    fn cycle(&self) -> u64 { Simulator::cycle(self) }
}

assert_impl_all!(Box<dyn SkidPipeline>: Send, fmt::Debug);
assert_impl_all!(Simulator<SkidBuffer<Registered>>: SkidPipeline, Clone);
assert_impl_all!(Simulator<SkidBuffer<Combinational>>: SkidPipeline, Clone);
