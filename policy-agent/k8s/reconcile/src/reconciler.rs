use crate::{pods, Cidrs, PolicyStore};
use network_policy_agent_core::{Direction, EnforcePolicy, PolicyId, ResourceId, Workload};
use network_policy_agent_index::Reader;
use network_policy_agent_k8s_api::ResourceExt;
use tracing::{debug, info, instrument, warn};

/// Applies `PolicyEndpoint` resources to the workloads scheduled on this node.
///
/// A reconciler holds no per-policy state of its own: the datapath's programs are discovered
/// through the shared program index. It may therefore be invoked concurrently for different
/// policies, though callers must not run two reconciliations of the same policy at once.
pub struct Reconciler<S, E> {
    store: S,
    datapath: E,
    programs: Reader,

    /// The address of this node. Pods whose host IP matches are considered local.
    node_ip: String,
}

/// Describes the work performed by a single reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of local pods the policy applies to.
    pub pods: usize,
    pub attach_failures: usize,
    pub updates: usize,
    pub update_failures: usize,
}

/// Indicates that a reconciliation could not read cluster state and should be retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch PolicyEndpoint {0}")]
    Fetch(ResourceId, #[source] anyhow::Error),

    #[error("failed to list pods in namespace {0}")]
    ListPods(String, #[source] anyhow::Error),
}

// === impl Reconciler ===

impl<S, E> Reconciler<S, E>
where
    S: PolicyStore + Send + Sync,
    E: EnforcePolicy + Send + Sync,
{
    pub fn new(store: S, datapath: E, programs: Reader, node_ip: impl Into<String>) -> Self {
        Self {
            store,
            datapath,
            programs,
            node_ip: node_ip.into(),
        }
    }

    #[instrument(skip_all, fields(namespace = %id.namespace, name = %id.name))]
    pub async fn reconcile(&self, id: &ResourceId) -> Result<Summary, Error> {
        info!("Reconciling PolicyEndpoint");

        let policy = match self.store.get_policy_endpoint(id).await {
            Ok(Some(policy)) => policy,
            Ok(None) => {
                // TODO(deletion): detach programs once deleted policies are tracked.
                debug!("PolicyEndpoint not found");
                return Ok(Summary::default());
            }
            Err(error) => return Err(Error::Fetch(id.clone(), error)),
        };

        let cidrs = Cidrs::extract(&policy.spec);
        let ingress = cidrs.is_active(Direction::Ingress);
        let egress = cidrs.is_active(Direction::Egress);
        debug!(?cidrs.ingress, ?cidrs.egress, "Extracted CIDRs");

        let local = pods::select_local(&self.store, &id.namespace, &self.node_ip)
            .await
            .map_err(|error| Error::ListPods(id.namespace.clone(), error))?;
        info!(node_ip = %self.node_ip, pods = local.len(), "Selected local pods");

        let mut summary = Summary {
            pods: local.len(),
            ..Summary::default()
        };
        for pod in local {
            let workload = Workload {
                namespace: pod.namespace().unwrap_or_else(|| id.namespace.clone()),
                name: pod.name_any(),
            };
            self.enforce(&workload, id, &cidrs, ingress, egress, &mut summary)
                .await;
        }

        info!(
            pods = summary.pods,
            updates = summary.updates,
            attach_failures = summary.attach_failures,
            update_failures = summary.update_failures,
            "Reconciled PolicyEndpoint"
        );
        Ok(summary)
    }

    /// Attaches probes to a single workload and refreshes the policy's programs.
    ///
    /// Failures are recorded in `summary` rather than returned.
    async fn enforce(
        &self,
        workload: &Workload,
        id: &ResourceId,
        cidrs: &Cidrs,
        ingress: bool,
        egress: bool,
        summary: &mut Summary,
    ) {
        let policy = PolicyId::from(id);

        match self
            .datapath
            .attach_probes(workload, &policy, ingress, egress)
            .await
        {
            Ok(()) => debug!(%workload, ingress, egress, "Attached probes"),
            Err(error) => {
                warn!(%workload, %error, "Failed to attach probes");
                summary.attach_failures += 1;
            }
        }

        for direction in [Direction::Ingress, Direction::Egress] {
            // Programs are registered by the datapath once attachment completes; until then there
            // is nothing to update and a later reconciliation picks it up.
            let Some(program) = self.programs.get(direction, &policy) else {
                debug!(%workload, %direction, "No program registered");
                continue;
            };

            let ranges = cidrs.get(direction);
            match self.datapath.update_table(program, ranges).await {
                Ok(()) => {
                    debug!(%workload, %direction, %program, cidrs = ranges.len(), "Updated table");
                    summary.updates += 1;
                }
                Err(error) => {
                    warn!(%workload, %direction, %program, %error, "Failed to update table");
                    summary.update_failures += 1;
                }
            }
        }
    }
}

