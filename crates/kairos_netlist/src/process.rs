//! Processes: the executable parts of a module.

use kairos_common::Ident;
use serde::{Deserialize, Serialize};

use crate::ids::{ProcessId, SignalId};
use crate::stmt::Statement;

/// A clock transition a process can trigger on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Edge {
    /// A transition to 1 from 0 or `X`.
    Rising,
    /// A transition to 0 from 1 or `X`.
    Falling,
}

/// When a process runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Runs whenever any signal in its sensitivity set changes, and once at
    /// the start of the first step to establish initial outputs.
    ///
    /// The sensitivity set must cover every signal the body can read;
    /// elaboration rejects processes that read outside it.
    Combinational {
        /// Signals whose changes re-trigger this process.
        sensitivity: Vec<SignalId>,
    },
    /// Runs once per matching clock edge, after combinational activity has
    /// settled. Reads observe pre-edge values; writes land after the edge.
    Clocked {
        /// 1-bit clock signal.
        clock: SignalId,
        /// Which transition triggers execution.
        edge: Edge,
    },
}

/// A named block of statements with a trigger condition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Process {
    /// Id within the defining module.
    pub id: ProcessId,
    /// Name used in diagnostics and error reports.
    pub name: Ident,
    /// Trigger condition.
    pub kind: ProcessKind,
    /// Statements executed on each trigger.
    pub body: Vec<Statement>,
}

impl Process {
    /// Every signal the body can read, in syntactic order, duplicates kept.
    pub fn reads(&self) -> Vec<SignalId> {
        let mut out = Vec::new();
        for stmt in &self.body {
            stmt.collect_reads(&mut out);
        }
        out
    }

    /// Every signal the body can write, in syntactic order, duplicates kept.
    pub fn writes(&self) -> Vec<SignalId> {
        let mut out = Vec::new();
        for stmt in &self.body {
            stmt.collect_writes(&mut out);
        }
        out
    }
}
