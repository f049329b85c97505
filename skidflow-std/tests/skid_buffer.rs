use proptest::prelude::*;
use skidflow::{Bits, Signal};
use skidflow_std::*;

/// Buffer under test with its driver and checkers.
struct Harness {
    buffer: Box<dyn SkidPipeline>,
    traffic: Traffic,
    scoreboard: Scoreboard,
    upstream: ProtocolChecker<Bits>,
    downstream: ProtocolChecker<Bits>,
    delivered: Vec<Bits>,
}

impl Harness {
    fn new(config: SkidConfig, valid: Vec<bool>, ready: Vec<bool>) -> Self {
        Self {
            buffer: config.build().unwrap(),
            traffic: Traffic::scripted(config.width, valid, ready),
            scoreboard: Scoreboard::new(config.low_power),
            upstream: ProtocolChecker::new(),
            downstream: ProtocolChecker::new(),
            delivered: Vec::new(),
        }
    }

    fn step(&mut self, reset: bool) -> Result<TickOutput, TestCaseError> {
        let input = TickInput { reset, ..self.traffic.next_input() };
        let output = self.buffer.step(&input);

        self.upstream
            .observe(reset, &input.upstream, &output.upstream)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        self.downstream
            .observe(reset, &output.downstream, &input.downstream)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        self.scoreboard.observe(&input, &output).map_err(|e| TestCaseError::fail(e.to_string()))?;
        self.traffic.observe(&input, &output);

        if input.delivered(&output) {
            self.delivered.push(output.downstream.inner.clone());
        }
        Ok(output)
    }
}

fn configs() -> impl Strategy<Value = SkidConfig> {
    (any::<bool>(), any::<bool>(), 1usize..=12).prop_map(|(low_power, registered_output, width)| {
        SkidConfig::default().low_power(low_power).registered_output(registered_output).width(width)
    })
}

fn traces(reset_chance: f64) -> impl Strategy<Value = Vec<(bool, bool, bool)>> {
    prop::collection::vec((prop::bool::weighted(reset_chance), any::<bool>(), any::<bool>()), 1..200)
}

fn split(ticks: &[(bool, bool, bool)]) -> (Vec<bool>, Vec<bool>, Vec<bool>) {
    let resets = ticks.iter().map(|t| t.0).collect();
    let valid = ticks.iter().map(|t| t.1).collect();
    let ready = ticks.iter().map(|t| t.2).collect();
    (resets, valid, ready)
}

proptest! {
    #[test]
    fn every_item_delivered_once_in_order(config in configs(), ticks in traces(0.03)) {
        let (resets, valid, ready) = split(&ticks);
        let mut harness = Harness::new(config, valid, ready);
        let mut shadow_held = false;

        for reset in resets {
            let output = harness.step(reset)?;
            // The shadow slot only fills behind a valid output slot.
            if !reset && shadow_held {
                prop_assert!(output.downstream.valid);
            }
            shadow_held = harness.buffer.shadow().valid;

            prop_assert!(harness.buffer.occupancy() <= 2);
            prop_assert_eq!(harness.buffer.occupancy(), harness.scoreboard.in_flight().len());
            if reset {
                prop_assert_eq!(harness.buffer.occupancy(), 0);
            }
        }
    }

    #[test]
    fn low_power_keeps_empty_slots_zero(registered_output in any::<bool>(), ticks in traces(0.05)) {
        let config = SkidConfig::default().low_power(true).registered_output(registered_output);
        let (resets, valid, ready) = split(&ticks);
        let mut harness = Harness::new(config, valid, ready);

        for reset in resets {
            let output = harness.step(reset)?;
            if !output.downstream.valid {
                prop_assert!(output.downstream.inner.is_zero());
            }
            let shadow = harness.buffer.shadow();
            if !shadow.valid {
                prop_assert!(shadow.inner.is_zero());
            }
        }
    }

    #[test]
    fn ready_consumer_never_stalls_producer(
        config in configs(),
        valid in prop::collection::vec(any::<bool>(), 1..100),
    ) {
        let len = valid.len();
        let mut harness = Harness::new(config, valid, vec![true; len]);

        for _ in 0..len {
            let output = harness.step(false)?;
            prop_assert!(output.upstream.ready);
            prop_assert!(!harness.buffer.shadow().valid);
        }
    }

    #[test]
    fn both_stages_deliver_the_source_sequence(
        low_power in any::<bool>(),
        width in 1usize..=12,
        ticks in traces(0.0),
    ) {
        let (_, valid, ready) = split(&ticks);

        for registered_output in [false, true] {
            let config = SkidConfig::default().low_power(low_power).registered_output(registered_output).width(width);
            let mut harness = Harness::new(config, valid.clone(), ready.clone());

            // Drain: the script runs out, after which the consumer is always ready.
            for _ in 0..ticks.len() + 3 {
                harness.step(false)?;
            }

            let created = harness.traffic.created();
            prop_assert!(harness.traffic.pending().is_none());
            prop_assert_eq!(harness.scoreboard.delivered(), created);
            let source = (0..created).map(|i| Bits::from_u64(width, i)).collect::<Vec<_>>();
            prop_assert_eq!(&harness.delivered, &source);
        }
    }
}

#[test]
fn random_traffic_on_every_configuration() {
    for (low_power, registered_output) in [(false, false), (false, true), (true, false), (true, true)] {
        let config = SkidConfig::default().low_power(low_power).registered_output(registered_output);
        let mut buffer = config.build().unwrap();
        let mut traffic = Traffic::random(config.width, 42, 70, 40);
        let mut scoreboard = Scoreboard::new(low_power);

        for _ in 0..1000 {
            let input = traffic.next_input();
            let output = buffer.step(&input);
            scoreboard.observe(&input, &output).unwrap();
            traffic.observe(&input, &output);
        }

        assert!(scoreboard.delivered() > 0);
        assert_eq!(buffer.cycle(), 1000);
        assert_eq!(scoreboard.accepted() - scoreboard.delivered(), scoreboard.in_flight().len() as u64);
    }
}

#[test]
fn registered_output_adds_one_tick_of_latency() {
    let offer = |value| TickInput::new(Valid::valid(Bits::from_u64(8, value)), Ready::new(true));

    let mut combinational = SkidConfig::default().registered_output(false).build().unwrap();
    let mut registered = SkidConfig::default().build().unwrap();

    let out = combinational.step(&offer(5));
    assert_eq!(out.downstream, Valid::valid(Bits::from_u64(8, 5)));

    let out = registered.step(&offer(5));
    assert!(!out.downstream.valid);
    let out = registered.step(&TickInput::new(Valid::invalid(8), Ready::new(true)));
    assert_eq!(out.downstream, Valid::valid(Bits::from_u64(8, 5)));
}

#[test]
fn reset_during_stall_discards_both_items() {
    let mut harness = Harness::new(SkidConfig::default(), vec![true; 4], vec![false, false, false, true]);

    harness.step(false).unwrap();
    harness.step(false).unwrap();
    assert_eq!(harness.buffer.occupancy(), 2);

    harness.step(true).unwrap();
    assert_eq!(harness.buffer.occupancy(), 0);
    assert!(harness.scoreboard.in_flight().is_empty());

    // The producer offers a fresh item, which goes through.
    let output = harness.step(false).unwrap();
    assert!(output.upstream.ready);
    assert_eq!(harness.scoreboard.accepted(), 3);
}

#[test]
fn shadow_fills_only_behind_valid_output() {
    for registered_output in [false, true] {
        let config = SkidConfig::default().registered_output(registered_output);
        let mut harness = Harness::new(config, vec![true; 6], vec![false, false, false, false, true, true]);

        let (mut shadow_held, mut filled) = (false, false);
        for _ in 0..6 {
            let output = harness.step(false).unwrap();
            assert!(!shadow_held || output.downstream.valid);
            shadow_held = harness.buffer.shadow().valid;
            filled |= shadow_held;
        }
        assert!(filled);
    }
}
