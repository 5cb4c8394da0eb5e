//! Event-driven simulation kernel for Kairos designs.
//!
//! This crate executes the elaborated form produced by `kairos_netlist`
//! with 3-state logic, delta-cycle combinational settling, and a separate
//! edge-update phase for clocked processes. Runtime faults (conflicting
//! drivers, non-convergent logic, branches on unknown values) stop the
//! kernel in a terminal faulted state that stays inspectable.
//!
//! # Architecture
//!
//! The kernel holds one mutable value per net and advances in steps. A
//! step applies queued stimulus and due clock toggles, re-runs activated
//! combinational processes in batches until the design reaches a fixed
//! point, then evaluates every clocked process whose edge fired exactly
//! once against the settled state. Each batch commits simultaneously, so
//! results are independent of the order (or thread) a batch is evaluated
//! in, and every committed change folds into a digest that fingerprints
//! the run.
//!
//! # Usage
//!
//! ```ignore
//! use kairos_sim::{Kernel, SimConfig};
//!
//! let mut kernel = Kernel::new(elaborated);
//! kernel.add_clock("clk", 1)?;
//! kernel.set_input("rst", Value::from_u64(1, 1))?;
//! kernel.run_for(10)?;
//! println!("count = {}", kernel.read_output("count")?);
//! ```
//!
//! # Modules
//!
//! - `error` — Runtime fault and stimulus-misuse types
//! - `time` — Tick and delta-cycle timestamps
//! - `trace` — Committed-change recording and run digests
//! - `kernel` — The stepping engine itself

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod time;
pub mod trace;

mod eval;
mod state;

pub use error::SimError;
pub use kernel::{Kernel, KernelState, SimConfig};
pub use time::SimTime;
pub use trace::{Trace, TraceEvent};
