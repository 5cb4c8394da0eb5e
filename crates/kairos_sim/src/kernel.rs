//! The event-driven simulation kernel.
//!
//! A [`Kernel`] owns the runtime state of one elaborated design and
//! advances it step by step. Each [`Kernel::step`] is one clock tick and
//! runs in two phases:
//!
//! 1. **Delta settling.** Queued stimulus and due clock toggles are
//!    applied, then combinational processes re-run until no net changes.
//!    Every settling round evaluates its batch against the same committed
//!    state and commits all resulting writes at once, so the outcome does
//!    not depend on evaluation order within a round.
//! 2. **Edge update.** Clocked processes whose clock net crossed the
//!    watched edge during this step evaluate exactly once against the
//!    settled state, and their writes commit as one batch. The changes
//!    become visible to combinational logic at the start of the next step,
//!    which is what makes back-to-back registers shift rather than race.
//!
//! Any runtime fault (conflicting drivers, no fixed point, a branch on
//! `X`) moves the kernel to [`KernelState::Faulted`], a terminal state in
//! which [`Kernel::step`] keeps returning [`SimError::Faulted`]. State
//! remains readable for post-mortem inspection.

use std::collections::{BTreeSet, HashMap};
use std::mem;

use kairos_common::{Digest, DigestWriter, Logic, Value};
use kairos_netlist::{Arena, Edge, ElaboratedDesign, FlatTrigger, NetId, PortDirection, TopPort};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::eval::{run_process, EvalContext, EvalError, StagedWrite};
use crate::state::NetState;
use crate::time::SimTime;
use crate::trace::{fold_change, Trace, TraceEvent};

/// Tunable kernel limits and switches.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Delta rounds allowed per step before the kernel declares
    /// non-convergence.
    pub max_deltas: u32,
    /// Evaluate each settling batch on the rayon thread pool. The batch
    /// commit makes this observationally identical to serial evaluation.
    pub parallel: bool,
    /// Record every committed change in the in-memory trace. The run
    /// digest is maintained either way.
    pub record_trace: bool,
}

impl Default for SimConfig {
    fn default() -> SimConfig {
        SimConfig {
            max_deltas: 1000,
            parallel: false,
            record_trace: true,
        }
    }
}

/// Where the kernel is in its lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum KernelState {
    /// Between steps; stimulus may be queued and state inspected.
    Idle,
    /// Inside a step, running combinational logic to a fixed point.
    DeltaSettling,
    /// Inside a step, applying clocked process updates.
    EdgeUpdating,
    /// A fault occurred; the kernel no longer steps.
    Faulted,
}

/// A free-running clock attached to a top-level input.
#[derive(Clone, Debug)]
struct ClockLine {
    net: NetId,
    half_period: u64,
    next_toggle: u64,
}

/// The simulation engine for one elaborated design.
pub struct Kernel {
    elab: ElaboratedDesign,
    states: Arena<NetId, NetState>,
    config: SimConfig,
    state: KernelState,
    /// Completed steps; also the tick of the next step.
    now: u64,
    clocks: Vec<ClockLine>,
    /// Stimulus queued for the next step, in call order.
    pending_inputs: Vec<(NetId, Value)>,
    /// Nets changed by the previous step's edge phase. They seed the next
    /// step's combinational activation.
    carry_over: Vec<NetId>,
    fault: Option<SimError>,
    trace: Trace,
    digest: DigestWriter,
    started: bool,
    total_deltas: u64,
}

impl Kernel {
    /// Creates a kernel over `elab` with default configuration. Every net
    /// starts at its declared initial value, or all-`X` without one.
    pub fn new(elab: ElaboratedDesign) -> Kernel {
        Kernel::with_config(elab, SimConfig::default())
    }

    /// Creates a kernel with an explicit configuration.
    pub fn with_config(elab: ElaboratedDesign, config: SimConfig) -> Kernel {
        let mut states = Arena::new();
        for net in elab.nets.values() {
            states.alloc(NetState::initial(net));
        }
        Kernel {
            elab,
            states,
            config,
            state: KernelState::Idle,
            now: 0,
            clocks: Vec::new(),
            pending_inputs: Vec::new(),
            carry_over: Vec::new(),
            fault: None,
            trace: Trace::new(),
            digest: DigestWriter::new(),
            started: false,
            total_deltas: 0,
        }
    }

    /// Queues `value` to be driven onto the top-level input `port` at the
    /// start of the next step. Later calls for the same port within one
    /// step win.
    pub fn set_input(&mut self, port: &str, value: Value) -> Result<(), SimError> {
        let port = self.input_port(port)?;
        if value.width() != port.ty.width {
            return Err(SimError::StimulusWidth {
                port: port.name.clone(),
                expected: port.ty.width,
                found: value.width(),
            });
        }
        let net = port.net;
        self.pending_inputs.push((net, value));
        Ok(())
    }

    /// Attaches a free-running clock to the 1-bit top-level input `port`.
    ///
    /// The net is driven to 0 at the start of the next step and inverted
    /// every `half_period` steps after that, so the first rising edge
    /// lands `half_period` steps in.
    pub fn add_clock(&mut self, port: &str, half_period: u64) -> Result<(), SimError> {
        if half_period == 0 {
            return Err(SimError::ClockPeriod {
                port: port.to_string(),
            });
        }
        let port = self.input_port(port)?;
        if port.ty.width != 1 {
            return Err(SimError::StimulusWidth {
                port: port.name.clone(),
                expected: port.ty.width,
                found: 1,
            });
        }
        let net = port.net;
        self.pending_inputs.push((net, Value::zeros(1)));
        self.clocks.push(ClockLine {
            net,
            half_period,
            next_toggle: self.now + half_period,
        });
        Ok(())
    }

    /// Advances the simulation by one tick: applies queued stimulus and
    /// due clock toggles, settles combinational logic, then runs triggered
    /// clocked processes.
    ///
    /// On a runtime fault the kernel records it, enters
    /// [`KernelState::Faulted`] and returns the error; the same error
    /// class would be reported by any evaluation order.
    pub fn step(&mut self) -> Result<(), SimError> {
        if self.state == KernelState::Faulted {
            return Err(SimError::Faulted);
        }
        self.state = KernelState::DeltaSettling;

        // Edge detection for this step compares against the values the
        // step started from.
        for (_, state) in self.states.iter_mut() {
            state.previous = state.value.clone();
        }

        let mut seeds = mem::take(&mut self.pending_inputs);
        for clock in &mut self.clocks {
            if self.now >= clock.next_toggle {
                let level = self.states.get(clock.net).value.get(0);
                let flipped = if level == Logic::One { 0 } else { 1 };
                seeds.push((clock.net, Value::from_u64(flipped, 1)));
                clock.next_toggle += clock.half_period;
            }
        }

        let mut active: BTreeSet<usize> = BTreeSet::new();
        if !self.started {
            // Power-on: every combinational process settles once from the
            // initial values, whether or not an input moved.
            self.started = true;
            for (idx, process) in self.elab.processes.iter().enumerate() {
                if matches!(process.trigger, FlatTrigger::Comb { .. }) {
                    active.insert(idx);
                }
            }
        }

        // Last round's changed nets, reported on non-convergence.
        let mut still_changing: Vec<NetId> = Vec::new();
        let seed_time = SimTime {
            tick: self.now,
            delta: 0,
        };
        let mut dirty = mem::take(&mut self.carry_over);
        for (net, value) in seeds {
            let value = self.coerced(net, value);
            if self.states.get(net).value == value {
                continue;
            }
            self.record_change(seed_time, net, &value);
            self.states.get_mut(net).value = value;
            dirty.push(net);
            still_changing.push(net);
        }
        for net in dirty {
            if let Some(watchers) = self.elab.sensitivity.get(&net) {
                active.extend(watchers.iter().copied());
            }
        }

        let mut delta: u32 = 0;
        while !active.is_empty() {
            if delta >= self.config.max_deltas {
                let mut signals: Vec<String> = still_changing
                    .iter()
                    .map(|net| self.elab.nets.get(*net).name.clone())
                    .collect();
                signals.sort();
                signals.dedup();
                let err = SimError::NonConvergence {
                    signals,
                    time: SimTime {
                        tick: self.now,
                        delta,
                    },
                    limit: self.config.max_deltas,
                };
                return self.fail(err);
            }

            let observed = SimTime {
                tick: self.now,
                delta,
            };
            let batch: Vec<usize> = mem::take(&mut active).into_iter().collect();
            let results = evaluate_batch(&self.elab, &self.states, &batch, self.config.parallel);
            let updates =
                match merge_writes(&self.elab, &self.states, &batch, results, observed) {
                    Ok(updates) => updates,
                    Err(err) => return self.fail(err),
                };

            delta += 1;
            self.total_deltas += 1;
            let commit = SimTime {
                tick: self.now,
                delta,
            };
            still_changing.clear();
            for (net, value) in updates {
                if self.states.get(net).value == value {
                    continue;
                }
                self.record_change(commit, net, &value);
                self.states.get_mut(net).value = value;
                still_changing.push(net);
                if let Some(watchers) = self.elab.sensitivity.get(&net) {
                    active.extend(watchers.iter().copied());
                }
            }
        }

        self.state = KernelState::EdgeUpdating;
        let mut triggered: Vec<usize> = Vec::new();
        for (idx, process) in self.elab.processes.iter().enumerate() {
            if let FlatTrigger::Clocked { clock, edge } = &process.trigger {
                let line = self.states.get(*clock);
                if edge_fired(&line.previous, &line.value, *edge) {
                    triggered.push(idx);
                }
            }
        }
        if !triggered.is_empty() {
            let time = SimTime {
                tick: self.now,
                delta,
            };
            let results =
                evaluate_batch(&self.elab, &self.states, &triggered, self.config.parallel);
            let updates = match merge_writes(&self.elab, &self.states, &triggered, results, time)
            {
                Ok(updates) => updates,
                Err(err) => return self.fail(err),
            };
            for (net, value) in updates {
                if self.states.get(net).value == value {
                    continue;
                }
                self.record_change(time, net, &value);
                self.states.get_mut(net).value = value;
                self.carry_over.push(net);
            }
        }

        self.state = KernelState::Idle;
        self.now += 1;
        Ok(())
    }

    /// Runs [`Kernel::step`] `steps` times, stopping at the first fault.
    pub fn run_for(&mut self, steps: u64) -> Result<(), SimError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Reads the committed value of the top-level output `port`.
    pub fn read_output(&self, port: &str) -> Result<Value, SimError> {
        let found = self
            .elab
            .port_named(port)
            .ok_or_else(|| SimError::UnknownPort {
                port: port.to_string(),
            })?;
        if found.direction != PortDirection::Output {
            return Err(SimError::NotAnOutput {
                port: port.to_string(),
            });
        }
        Ok(self.states.get(found.net).value.clone())
    }

    /// Reads any net by its hierarchical name, e.g. `"u0.state"`.
    pub fn probe(&self, name: &str) -> Result<Value, SimError> {
        let net = self
            .elab
            .net_named(name)
            .ok_or_else(|| SimError::UnknownNet {
                name: name.to_string(),
            })?;
        Ok(self.states.get(net).value.clone())
    }

    /// The lifecycle state, [`KernelState::Idle`] between healthy steps.
    pub fn state(&self) -> KernelState {
        self.state
    }

    /// The fault that stopped the kernel, if one occurred.
    pub fn fault(&self) -> Option<&SimError> {
        self.fault.as_ref()
    }

    /// Completed steps, which is also the tick the next step will carry.
    pub fn time(&self) -> u64 {
        self.now
    }

    /// Delta rounds evaluated so far, across all steps.
    pub fn total_deltas(&self) -> u64 {
        self.total_deltas
    }

    /// The recorded change trace.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Fingerprint of every change committed so far. Two runs of the same
    /// design under the same stimulus produce the same digest, whatever
    /// the evaluation order or thread count.
    pub fn digest(&self) -> Digest {
        self.digest.finish()
    }

    /// The elaborated design this kernel executes.
    pub fn design(&self) -> &ElaboratedDesign {
        &self.elab
    }

    fn input_port(&self, port: &str) -> Result<&TopPort, SimError> {
        let found = self
            .elab
            .port_named(port)
            .ok_or_else(|| SimError::UnknownPort {
                port: port.to_string(),
            })?;
        if found.direction != PortDirection::Input {
            return Err(SimError::NotAnInput {
                port: port.to_string(),
            });
        }
        Ok(found)
    }

    /// Retags `value` with the signedness of `net`. Width is already
    /// checked wherever values enter the kernel.
    fn coerced(&self, net: NetId, value: Value) -> Value {
        if self.elab.nets.get(net).ty.signed {
            value.as_signed()
        } else {
            value.as_unsigned()
        }
    }

    fn record_change(&mut self, time: SimTime, net: NetId, value: &Value) {
        fold_change(&mut self.digest, time, net, value);
        if self.config.record_trace {
            self.trace.push(TraceEvent {
                time,
                net,
                value: value.clone(),
            });
        }
    }

    fn fail(&mut self, err: SimError) -> Result<(), SimError> {
        self.fault = Some(err.clone());
        self.state = KernelState::Faulted;
        Err(err)
    }
}

fn edge_fired(previous: &Value, current: &Value, edge: Edge) -> bool {
    match edge {
        // Out of reset a clock net often goes X to 1; that counts.
        Edge::Rising => current.get(0) == Logic::One && previous.get(0) != Logic::One,
        Edge::Falling => current.get(0) == Logic::Zero && previous.get(0) != Logic::Zero,
    }
}

/// Evaluates one batch of processes against the committed state. Results
/// come back in batch order regardless of the evaluation strategy.
fn evaluate_batch(
    elab: &ElaboratedDesign,
    states: &Arena<NetId, NetState>,
    batch: &[usize],
    parallel: bool,
) -> Vec<Result<Vec<StagedWrite>, EvalError>> {
    let run = |idx: &usize| {
        let process = &elab.processes[*idx];
        let ctx = EvalContext {
            states,
            map: &process.map,
        };
        let mut out = Vec::new();
        run_process(&ctx, &process.body, &mut out).map(|()| out)
    };
    if parallel {
        batch.par_iter().map(run).collect()
    } else {
        batch.iter().map(run).collect()
    }
}

/// Merges one batch's staged writes into per-net update values.
///
/// Two different processes claiming the same bit of the same net is a
/// [`SimError::DriverConflict`]; one process writing a bit twice keeps its
/// later write, matching the sequential reading of a process body. Updates
/// come back sorted by net so commit order is deterministic.
fn merge_writes(
    elab: &ElaboratedDesign,
    states: &Arena<NetId, NetState>,
    batch: &[usize],
    results: Vec<Result<Vec<StagedWrite>, EvalError>>,
    time: SimTime,
) -> Result<Vec<(NetId, Value)>, SimError> {
    let mut staged: HashMap<NetId, Value> = HashMap::new();
    let mut claims: HashMap<NetId, Vec<Option<usize>>> = HashMap::new();
    for (slot, result) in results.into_iter().enumerate() {
        let owner = batch[slot];
        let writes = match result {
            Ok(writes) => writes,
            Err(EvalError::UnknownBranch) => {
                return Err(SimError::UndefinedControlFlow {
                    process: elab.processes[owner].name.clone(),
                    time,
                });
            }
            Err(EvalError::Width(source)) => return Err(SimError::Width(source)),
        };
        for write in writes {
            let width = elab.nets.get(write.net).ty.width;
            let bits = claims
                .entry(write.net)
                .or_insert_with(|| vec![None; width as usize]);
            for bit in write.low..write.low + write.value.width() {
                match bits[bit as usize] {
                    Some(other) if other != owner => {
                        return Err(SimError::DriverConflict {
                            signal: elab.nets.get(write.net).name.clone(),
                            processes: vec![
                                elab.processes[other].name.clone(),
                                elab.processes[owner].name.clone(),
                            ],
                            time,
                        });
                    }
                    _ => bits[bit as usize] = Some(owner),
                }
            }
            let current = staged
                .entry(write.net)
                .or_insert_with(|| states.get(write.net).value.clone());
            if write.low == 0 && write.value.width() == width {
                *current = write.value;
            } else {
                current.splice(write.low, &write.value);
            }
        }
    }
    // Committed values carry the net's declared signedness, not whatever
    // tag the driving expression happened to produce; signed comparison
    // and arithmetic shift downstream read the stored tag.
    let mut updates: Vec<(NetId, Value)> = staged
        .into_iter()
        .map(|(net, value)| {
            let value = if elab.nets.get(net).ty.signed {
                value.as_signed()
            } else {
                value.as_unsigned()
            };
            (net, value)
        })
        .collect();
    updates.sort_by_key(|(net, _)| net.as_raw());
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairos_netlist::{elaborate, Expr, NetlistBuilder, SignalTy, Statement};

    fn elaborated(build: impl FnOnce(&mut NetlistBuilder)) -> ElaboratedDesign {
        let mut b = NetlistBuilder::new();
        build(&mut b);
        let (design, interner) = b.finish();
        elaborate(&design, &interner).unwrap()
    }

    fn kernel_for(build: impl FnOnce(&mut NetlistBuilder)) -> Kernel {
        Kernel::new(elaborated(build))
    }

    fn counter_design() -> ElaboratedDesign {
        elaborated(|b| {
            let mut m = b.module("counter");
            let clk = m.input("clk", SignalTy::bit());
            let rst = m.input("rst", SignalTy::bit());
            let count = m.output("count", SignalTy::bits(8));
            m.clocked(
                "advance",
                clk,
                Edge::Rising,
                vec![Statement::if_else(
                    Expr::read(rst),
                    vec![Statement::assign(count, Expr::lit(Value::zeros(8)))],
                    vec![Statement::assign(
                        count,
                        Expr::add(Expr::read(count), Expr::lit(Value::from_u64(1, 8))),
                    )],
                )],
            );
            let top = m.id();
            b.set_top(top);
        })
    }

    fn counter_kernel() -> Kernel {
        Kernel::new(counter_design())
    }

    #[test]
    fn counter_counts_rising_edges() {
        let mut k = counter_kernel();
        k.add_clock("clk", 1).unwrap();
        k.set_input("rst", Value::from_u64(1, 1)).unwrap();
        // Tick 0 drives clk to 0; the first rising edge is at tick 1.
        k.step().unwrap();
        assert!(k.read_output("count").unwrap().is_all_x());
        k.step().unwrap();
        assert_eq!(k.read_output("count").unwrap().to_u64(), Some(0));
        k.set_input("rst", Value::zeros(1)).unwrap();
        k.run_for(2).unwrap();
        assert_eq!(k.read_output("count").unwrap().to_u64(), Some(1));
        k.run_for(4).unwrap();
        assert_eq!(k.read_output("count").unwrap().to_u64(), Some(3));
        assert_eq!(k.time(), 8);
        assert_eq!(k.state(), KernelState::Idle);
    }

    #[test]
    fn combinational_logic_follows_inputs() {
        let mut k = kernel_for(|b| {
            let mut m = b.module("inverter");
            let a = m.input("a", SignalTy::bit());
            let y = m.output("y", SignalTy::bit());
            m.comb(
                "invert",
                vec![a],
                vec![Statement::assign(y, Expr::not(Expr::read(a)))],
            );
            let top = m.id();
            b.set_top(top);
        });
        // Unstimulated, the first step settles from all-X.
        k.step().unwrap();
        assert_eq!(k.read_output("y").unwrap().get(0), Logic::X);
        k.set_input("a", Value::zeros(1)).unwrap();
        k.step().unwrap();
        assert_eq!(k.read_output("y").unwrap().to_u64(), Some(1));
        assert_eq!(k.probe("a").unwrap().to_u64(), Some(0));
        k.set_input("a", Value::from_u64(1, 1)).unwrap();
        k.step().unwrap();
        assert_eq!(k.read_output("y").unwrap().to_u64(), Some(0));
    }

    #[test]
    fn conflicting_drivers_fault_the_kernel() {
        let mut k = kernel_for(|b| {
            let mut m = b.module("contested");
            let a = m.input("a", SignalTy::bit());
            let y = m.output("y", SignalTy::bit());
            m.comb(
                "drive_low",
                vec![a],
                vec![Statement::assign(y, Expr::lit(Value::zeros(1)))],
            );
            m.comb(
                "drive_high",
                vec![a],
                vec![Statement::assign(y, Expr::lit(Value::from_u64(1, 1)))],
            );
            let top = m.id();
            b.set_top(top);
        });
        let err = k.step().unwrap_err();
        match &err {
            SimError::DriverConflict {
                signal, processes, ..
            } => {
                assert_eq!(signal, "y");
                assert_eq!(processes, &["drive_low".to_string(), "drive_high".to_string()]);
            }
            other => panic!("expected a driver conflict, got {other}"),
        }
        assert_eq!(k.state(), KernelState::Faulted);
        assert_eq!(k.fault(), Some(&err));
        assert_eq!(k.step(), Err(SimError::Faulted));
    }

    #[test]
    fn oscillating_logic_exhausts_the_delta_budget() {
        let ring = elaborated(|b| {
            let mut m = b.module("ring");
            let osc = m
                .signal_init("osc", SignalTy::bit(), Value::zeros(1))
                .unwrap();
            m.comb(
                "invert_self",
                vec![osc],
                vec![Statement::assign(osc, Expr::not(Expr::read(osc)))],
            );
            let top = m.id();
            b.set_top(top);
        });
        let config = SimConfig {
            max_deltas: 8,
            ..SimConfig::default()
        };
        let mut k = Kernel::with_config(ring, config);
        match k.step().unwrap_err() {
            SimError::NonConvergence {
                signals,
                time,
                limit,
            } => {
                assert_eq!(signals, vec!["osc".to_string()]);
                assert_eq!(time, SimTime { tick: 0, delta: 8 });
                assert_eq!(limit, 8);
            }
            other => panic!("expected non-convergence, got {other}"),
        }
        assert_eq!(k.state(), KernelState::Faulted);
    }

    #[test]
    fn branching_on_x_is_a_fault() {
        let mut k = kernel_for(|b| {
            let mut m = b.module("gate");
            let sel = m.input("sel", SignalTy::bit());
            let y = m.output("y", SignalTy::bit());
            m.comb(
                "choose",
                vec![sel],
                vec![Statement::if_else(
                    Expr::read(sel),
                    vec![Statement::assign(y, Expr::lit(Value::from_u64(1, 1)))],
                    vec![Statement::assign(y, Expr::lit(Value::zeros(1)))],
                )],
            );
            let top = m.id();
            b.set_top(top);
        });
        // `sel` powers on as X and the first step evaluates the process.
        match k.step().unwrap_err() {
            SimError::UndefinedControlFlow { process, time } => {
                assert_eq!(process, "choose");
                assert_eq!(time, SimTime { tick: 0, delta: 0 });
            }
            other => panic!("expected undefined control flow, got {other}"),
        }
    }

    #[test]
    fn stimulus_interface_rejects_misuse() {
        let mut k = counter_kernel();
        assert_eq!(
            k.set_input("missing", Value::zeros(1)),
            Err(SimError::UnknownPort {
                port: "missing".to_string()
            })
        );
        assert_eq!(
            k.set_input("count", Value::zeros(8)),
            Err(SimError::NotAnInput {
                port: "count".to_string()
            })
        );
        assert_eq!(
            k.set_input("rst", Value::zeros(4)),
            Err(SimError::StimulusWidth {
                port: "rst".to_string(),
                expected: 1,
                found: 4
            })
        );
        assert_eq!(
            k.read_output("rst"),
            Err(SimError::NotAnOutput {
                port: "rst".to_string()
            })
        );
        assert_eq!(
            k.add_clock("clk", 0),
            Err(SimError::ClockPeriod {
                port: "clk".to_string()
            })
        );
        assert_eq!(
            k.probe("nowhere"),
            Err(SimError::UnknownNet {
                name: "nowhere".to_string()
            })
        );
    }

    #[test]
    fn config_fields_default_individually() {
        let config: SimConfig = serde_json::from_str(r#"{"max_deltas": 32}"#).unwrap();
        assert_eq!(config.max_deltas, 32);
        assert!(!config.parallel);
        assert!(config.record_trace);
    }

    #[test]
    fn later_stimulus_for_a_port_wins() {
        let mut k = kernel_for(|b| {
            let mut m = b.module("wire");
            let a = m.input("a", SignalTy::bits(4));
            let y = m.output("y", SignalTy::bits(4));
            m.comb("copy", vec![a], vec![Statement::assign(y, Expr::read(a))]);
            let top = m.id();
            b.set_top(top);
        });
        k.set_input("a", Value::from_u64(3, 4)).unwrap();
        k.set_input("a", Value::from_u64(9, 4)).unwrap();
        k.step().unwrap();
        assert_eq!(k.read_output("y").unwrap().to_u64(), Some(9));
    }

    #[test]
    fn edge_updates_become_visible_next_step() {
        // Two back-to-back registers on one clock shift, not race: the
        // second register samples the first's pre-edge value.
        let mut k = kernel_for(|b| {
            let mut m = b.module("shift2");
            let clk = m.input("clk", SignalTy::bit());
            let din = m.input("din", SignalTy::bit());
            let q0 = m.signal("q0", SignalTy::bit());
            let q1 = m.output("q1", SignalTy::bit());
            m.clocked(
                "stage0",
                clk,
                Edge::Rising,
                vec![Statement::assign(q0, Expr::read(din))],
            );
            m.clocked(
                "stage1",
                clk,
                Edge::Rising,
                vec![Statement::assign(q1, Expr::read(q0))],
            );
            let top = m.id();
            b.set_top(top);
        });
        k.add_clock("clk", 1).unwrap();
        k.set_input("din", Value::from_u64(1, 1)).unwrap();
        k.step().unwrap(); // clk 0
        k.step().unwrap(); // first rising edge: q0 <= 1, q1 <= old q0 (X)
        assert_eq!(k.probe("q0").unwrap().to_u64(), Some(1));
        assert_eq!(k.read_output("q1").unwrap().get(0), Logic::X);
        k.run_for(2).unwrap(); // second rising edge
        assert_eq!(k.read_output("q1").unwrap().to_u64(), Some(1));
    }

    #[test]
    fn trace_and_digest_record_committed_changes() {
        let mut k = counter_kernel();
        k.add_clock("clk", 1).unwrap();
        k.set_input("rst", Value::from_u64(1, 1)).unwrap();
        k.run_for(2).unwrap();
        assert!(!k.trace().is_empty());
        assert_eq!(k.digest(), k.trace().digest());

        // Same design, same stimulus, trace recording off: the digest
        // still matches.
        let mut quiet = Kernel::with_config(
            counter_design(),
            SimConfig {
                record_trace: false,
                ..SimConfig::default()
            },
        );
        quiet.add_clock("clk", 1).unwrap();
        quiet.set_input("rst", Value::from_u64(1, 1)).unwrap();
        quiet.run_for(2).unwrap();
        assert!(quiet.trace().is_empty());
        assert_eq!(quiet.digest(), k.digest());
    }
}
