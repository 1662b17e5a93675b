use crate::{
    core::{Direction, EnforcePolicy, PolicyId, ProgramHandle, Workload},
    index::Writer,
};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use anyhow::{bail, Result};
use parking_lot::Mutex;
use tracing::{debug, info};

/// A datapath that keeps filtering state in process memory.
///
/// Programs and their allow-lists are tracked as a kernel datapath would track them, but nothing
/// is installed on the host. Each policy is enforced by at most one program per direction,
/// shared by all of the policy's workloads on this node.
#[derive(Debug)]
pub struct InMemoryDatapath {
    programs: Writer,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    by_policy: HashMap<(PolicyId, Direction), ProgramHandle>,
    by_program: HashMap<ProgramHandle, Program>,
}

#[derive(Debug, Default)]
struct Program {
    workloads: HashSet<Workload>,
    table: Vec<String>,
}

// === impl InMemoryDatapath ===

impl InMemoryDatapath {
    pub fn new(programs: Writer) -> Self {
        Self {
            programs,
            state: Mutex::new(State::default()),
        }
    }
}

#[async_trait::async_trait]
impl EnforcePolicy for InMemoryDatapath {
    async fn attach_probes(
        &self,
        workload: &Workload,
        policy: &PolicyId,
        ingress: bool,
        egress: bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        for (direction, active) in [(Direction::Ingress, ingress), (Direction::Egress, egress)] {
            if !active {
                continue;
            }

            let State {
                next_id,
                by_policy,
                by_program,
            } = &mut *state;
            let program = *by_policy
                .entry((policy.clone(), direction))
                .or_insert_with(|| {
                    let program = ProgramHandle::new(*next_id);
                    *next_id += 1;
                    info!(%policy, %direction, %program, "Loaded program");
                    self.programs.insert(direction, policy.clone(), program);
                    program
                });

            let attached = by_program
                .entry(program)
                .or_default()
                .workloads
                .insert(workload.clone());
            if attached {
                info!(%workload, %policy, %direction, %program, "Attached probe");
            } else {
                debug!(%workload, %direction, %program, "Probe already attached");
            }
        }

        Ok(())
    }

    async fn update_table(&self, program: ProgramHandle, cidrs: &[String]) -> Result<()> {
        let mut state = self.state.lock();
        let Some(Program { table, .. }) = state.by_program.get_mut(&program) else {
            bail!("unknown program {program}");
        };

        if table.as_slice() == cidrs {
            debug!(%program, "Table unchanged");
            return Ok(());
        }

        info!(%program, ?cidrs, "Updated table");
        *table = cidrs.to_vec();
        Ok(())
    }
}
