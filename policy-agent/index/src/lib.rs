//! Enforcement state index
//!
//! Tracks, for each policy, the filtering programs that currently enforce it on this node. The
//! index is split into two halves that share the same tables:
//!
//! - A [`Writer`] is held by the datapath. Handles are registered as a side effect of attaching
//!   probes to a workload.
//! - A [`Reader`] is held by the reconciler, which consults it to decide whether a program's
//!   allow-list can be updated.
//!
//! ```text
//! [ datapath ] -> [ Writer ] -> { ingress, egress } <- [ Reader ] <- [ reconciler ]
//! ```
//!
//! Both halves are cheaply cloneable and may be used concurrently from any number of tasks
//! without external locking. Every operation acts on a single key while holding the lock of
//! that direction's table, so reads and writes are atomic per key. Entries are never removed.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use ahash::AHashMap as HashMap;
use network_policy_agent_core::{Direction, PolicyId, ProgramHandle};
use parking_lot::RwLock;
use std::sync::Arc;


/// Registers program handles. Held by the datapath.
#[derive(Clone, Debug)]
pub struct Writer(Arc<Tables>);

/// Looks up program handles. Held by the reconciler.
#[derive(Clone, Debug)]
pub struct Reader(Arc<Tables>);

#[derive(Debug, Default)]
struct Tables {
    ingress: RwLock<ByPolicy>,
    egress: RwLock<ByPolicy>,
}

type ByPolicy = HashMap<PolicyId, ProgramHandle>;

/// Creates an empty index, returning both of its halves.
pub fn pair() -> (Writer, Reader) {
    let tables = Arc::new(Tables::default());
    let w = Writer(tables.clone());
    let r = Reader(tables);
    (w, r)
}

// === impl Tables ===

impl Tables {
    #[inline]
    fn get(&self, direction: Direction) -> &RwLock<ByPolicy> {
        match direction {
            Direction::Ingress => &self.ingress,
            Direction::Egress => &self.egress,
        }
    }
}

// === impl Writer ===

impl Writer {
    /// Records the program enforcing `policy` in the given direction, returning the handle it
    /// replaced, if any.
    pub fn insert(
        &self,
        direction: Direction,
        policy: PolicyId,
        program: ProgramHandle,
    ) -> Option<ProgramHandle> {
        let prior = self.0.get(direction).write().insert(policy, program);
        tracing::trace!(%direction, %program, ?prior, "Registered program");
        prior
    }
}

// === impl Reader ===

impl Reader {
    #[inline]
    pub fn get(&self, direction: Direction, policy: &PolicyId) -> Option<ProgramHandle> {
        self.0.get(direction).read().get(policy).copied()
    }
}
