use crate::PolicyId;
use anyhow::Result;
use std::fmt;

/// Models the node's packet-filtering datapath.
///
/// Implementations own the lifecycle of filtering programs. When a program is created for a
/// policy, the implementation registers its handle with the program index so that subsequent
/// reconciliations can push allow-lists into it.
#[async_trait::async_trait]
pub trait EnforcePolicy {
    /// Ensures the workload's ingress and/or egress probes are attached for the given policy.
    ///
    /// Must be idempotent: attaching an already-attached workload/policy pair neither duplicates
    /// programs nor fails.
    async fn attach_probes(
        &self,
        workload: &Workload,
        policy: &PolicyId,
        ingress: bool,
        egress: bool,
    ) -> Result<()>;

    /// Converges the program's allow-list to exactly `cidrs`. An empty list allows nothing.
    async fn update_table(&self, program: ProgramHandle, cidrs: &[String]) -> Result<()>;
}

/// The direction of traffic a program filters.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Ingress,
    Egress,
}

/// An opaque reference to a live filtering program.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ProgramHandle(u32);

/// A pod that probes are attached to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Workload {
    pub namespace: String,
    pub name: String,
}

// === impl Direction ===

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => "ingress".fmt(f),
            Self::Egress => "egress".fmt(f),
        }
    }
}

// === impl ProgramHandle ===

impl ProgramHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prog-{}", self.0)
    }
}

// === impl Workload ===

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
