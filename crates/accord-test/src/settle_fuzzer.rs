//! Settlement fuzzer - randomized operation sequences with invariant checks
//!
//! Drives a population of settlements through seeded random interleavings
//! of resolution attempts, continuation attachment, and queue drains, then
//! checks the lifecycle invariants:
//! - at most one state transition per settlement
//! - the settled outcome never changes once set
//! - a continuation fires at most once, only on the matching side
//! - after a full drain, no continuation on a settled settlement is left
//!   unfired

use std::cell::Cell;
use std::rc::Rc;

use accord_core::{Dispatch, SettleState};
use accord_dispatch::DispatchQueue;
use accord_settle::{Resolver, Settlement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of settlements in the population
    pub settlement_count: usize,
    /// Number of operations to generate
    pub op_count: usize,
    /// Probability that a resolution attempt rejects (0.0 - 1.0)
    pub reject_prob: f64,
    /// Probability that a resolution defers its notification
    pub defer_prob: f64,
    /// Probability that an operation attaches a continuation
    pub attach_prob: f64,
    /// Probability that an operation drains the queue
    pub drain_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            settlement_count: 8,
            op_count: 1000,
            reject_prob: 0.3,
            defer_prob: 0.5,
            attach_prob: 0.4,
            drain_prob: 0.1,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            settlement_count: 4,
            op_count: 100,
            ..FuzzerConfig::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            settlement_count: 16,
            op_count: 10000,
            ..FuzzerConfig::default()
        }
    }

    /// Adversarial scenario: mostly redundant resolutions and late attaches
    pub fn adversarial() -> Self {
        FuzzerConfig {
            settlement_count: 32,
            op_count: 5000,
            reject_prob: 0.5,
            defer_prob: 0.7,
            attach_prob: 0.6,
            drain_prob: 0.05,
            seed: 42,
        }
    }
}

/// Fuzz run report
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FuzzReport {
    pub resolutions_attempted: u64,
    pub redundant_resolutions: u64,
    pub continuations_attached: u64,
    pub continuations_fired: u64,
    pub drains: u64,
    pub violations: Vec<String>,
}

impl FuzzReport {
    /// True when no invariant was violated
    pub fn ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Counters probing one attached continuation pair
struct AttachProbe {
    fulfill_fired: Rc<Cell<u32>>,
    reject_fired: Rc<Cell<u32>>,
}

struct Tracked {
    settlement: Settlement<u64>,
    resolver: Resolver<u64>,
    last_state: SettleState,
    snapshot: Option<(Option<u64>, Option<String>)>,
    probes: Vec<AttachProbe>,
}

/// Randomized driver for settlement populations
pub struct SettleFuzzer {
    config: FuzzerConfig,
}

impl SettleFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        SettleFuzzer { config }
    }

    /// Run the configured operation sequence and report invariant checks
    pub fn run(&self) -> FuzzReport {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let queue = DispatchQueue::new();
        let mut report = FuzzReport::default();

        let mut population: Vec<Tracked> = (0..cfg.settlement_count.max(1))
            .map(|_| {
                let (settlement, resolver) = Settlement::pending(&queue);
                Tracked {
                    settlement,
                    resolver,
                    last_state: SettleState::Pending,
                    snapshot: None,
                    probes: Vec::new(),
                }
            })
            .collect();

        for _ in 0..cfg.op_count {
            let index = rng.gen_range(0..population.len());

            if rng.gen_bool(cfg.drain_prob) {
                queue.run_until_idle();
                report.drains += 1;
            } else if rng.gen_bool(cfg.attach_prob) {
                Self::attach_probe(&mut population[index], &mut report);
            } else {
                Self::attempt_resolution(&mut population[index], &mut rng, cfg, &mut report);
            }

            Self::check_tracked(&mut population[index], &mut report);
        }

        // final drain flushes every deferred notification before the audit
        queue.run_until_idle();
        for tracked in &mut population {
            Self::check_tracked(tracked, &mut report);
            Self::check_probes(tracked, &mut report);
        }
        report
    }

    fn attach_probe(tracked: &mut Tracked, report: &mut FuzzReport) {
        let fulfill_fired = Rc::new(Cell::new(0u32));
        let reject_fired = Rc::new(Cell::new(0u32));

        let on_fulfill = fulfill_fired.clone();
        let on_reject = reject_fired.clone();
        tracked.settlement.done(
            Some(Box::new(move |_| on_fulfill.set(on_fulfill.get() + 1))),
            Some(Box::new(move |_| on_reject.set(on_reject.get() + 1))),
        );

        tracked.probes.push(AttachProbe {
            fulfill_fired,
            reject_fired,
        });
        report.continuations_attached += 1;
    }

    fn attempt_resolution(
        tracked: &mut Tracked,
        rng: &mut StdRng,
        cfg: &FuzzerConfig,
        report: &mut FuzzReport,
    ) {
        let mode = if rng.gen_bool(cfg.defer_prob) {
            Dispatch::Deferred
        } else {
            Dispatch::Immediate
        };

        if tracked.resolver.is_resolved() {
            report.redundant_resolutions += 1;
        }
        if rng.gen_bool(cfg.reject_prob) {
            let fault = format!("fault-{}", rng.gen_range(0..1000u32));
            tracked.resolver.reject(fault, mode);
        } else {
            tracked.resolver.fulfill(rng.gen_range(0..1000u64), mode);
        }
        report.resolutions_attempted += 1;
    }

    fn check_tracked(tracked: &mut Tracked, report: &mut FuzzReport) {
        let state = tracked.settlement.state();
        if !(tracked.last_state == state || tracked.last_state.can_transition_to(state)) {
            report
                .violations
                .push(format!("illegal transition {} -> {}", tracked.last_state, state));
        }
        tracked.last_state = state;

        if state.is_terminal() {
            let observed = (
                tracked.settlement.value(),
                tracked.settlement.reason().map(|r| r.description()),
            );
            match &tracked.snapshot {
                None => tracked.snapshot = Some(observed),
                Some(snapshot) => {
                    if snapshot != &observed {
                        report.violations.push("settled outcome changed".to_owned());
                    }
                }
            }
        }
    }

    fn check_probes(tracked: &Tracked, report: &mut FuzzReport) {
        let state = tracked.settlement.state();
        for probe in &tracked.probes {
            let fulfilled = probe.fulfill_fired.get();
            let rejected = probe.reject_fired.get();
            report.continuations_fired += u64::from(fulfilled + rejected);

            if fulfilled + rejected > 1 {
                report
                    .violations
                    .push("continuation fired more than once".to_owned());
            }
            match state {
                SettleState::Pending => {
                    if fulfilled + rejected != 0 {
                        report
                            .violations
                            .push("continuation fired on a pending settlement".to_owned());
                    }
                }
                SettleState::Fulfilled => {
                    if rejected != 0 {
                        report
                            .violations
                            .push("rejection continuation fired on a fulfillment".to_owned());
                    }
                    if fulfilled != 1 {
                        report
                            .violations
                            .push("fulfillment continuation unfired after drain".to_owned());
                    }
                }
                SettleState::Rejected => {
                    if fulfilled != 0 {
                        report
                            .violations
                            .push("fulfillment continuation fired on a rejection".to_owned());
                    }
                    if rejected != 1 {
                        report
                            .violations
                            .push("rejection continuation unfired after drain".to_owned());
                    }
                }
            }
        }
    }
}
