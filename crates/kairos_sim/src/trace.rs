//! In-memory change trace and run fingerprinting.
//!
//! Every committed value change can be recorded as a [`TraceEvent`]. The
//! trace doubles as the determinism witness: folding each event into a
//! digest gives a single value that two runs can be compared by, and the
//! kernel maintains that digest even when event recording is switched off.

use kairos_common::{Digest, DigestWriter, Value};
use kairos_netlist::NetId;
use serde::{Deserialize, Serialize};

use crate::time::SimTime;

/// One committed change: a net took a new value at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// When the change was committed.
    pub time: SimTime,
    /// The net that changed.
    pub net: NetId,
    /// The value it changed to.
    pub value: Value,
}

/// Folds one change into a digest. The kernel and [`Trace::digest`] use
/// the same folding so their digests agree event for event.
pub(crate) fn fold_change(w: &mut DigestWriter, time: SimTime, net: NetId, value: &Value) {
    w.write_u64(time.tick);
    w.write_u32(time.delta);
    w.write_u32(net.as_raw());
    w.write(&[value.is_signed() as u8]);
    w.write(value.to_string().as_bytes());
}

/// An ordered record of committed changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new() -> Trace {
        Trace { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// All recorded events in commit order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Recorded events touching one net, in commit order.
    pub fn events_for(&self, net: NetId) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.net == net)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Digest of the recorded events.
    pub fn digest(&self) -> Digest {
        let mut w = DigestWriter::new();
        for event in &self.events {
            fold_change(&mut w, event.time, event.net, &event.value);
        }
        w.finish()
    }
}
