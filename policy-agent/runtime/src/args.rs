use crate::{
    core::{EnforcePolicy, ResourceId},
    datapath::InMemoryDatapath,
    index,
    k8s::{self, Client, Resource, ResourceExt},
    node,
    reconcile::{self, KubeStore, PolicyStore, Reconciler},
};
use anyhow::{bail, Result};
use clap::Parser;
use futures::prelude::*;
use kube::runtime::{
    controller::{Action, Controller},
    watcher,
};
use prometheus_client::registry::Registry;
use std::{sync::Arc, time::Duration};
use tokio::sync::oneshot;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "network-policy-agent",
    about = "Enforces PolicyEndpoint resources on the local node"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "network_policy_agent=info,warn",
        env = "NETWORK_POLICY_AGENT_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The IP address of this node.
    ///
    /// When unset, the address is read from the Node resource named by `--node-name`.
    #[clap(long, env = "NODE_IP")]
    node_ip: Option<String>,

    /// The name of this node's Node resource.
    #[clap(long, env = "NODE_NAME")]
    node_name: Option<String>,

    /// Seconds to wait before retrying a reconciliation that failed to read cluster state.
    #[clap(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    requeue_after_secs: u64,

    /// Seconds between reconciliations of an unchanged PolicyEndpoint.
    ///
    /// Pods scheduled onto this node after a policy was last reconciled are picked up on the
    /// next resync.
    #[clap(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    resync_secs: u64,
}

/// Shared with each reconciliation by the controller.
struct Context<S, E> {
    reconciler: Reconciler<S, E>,
    requeue_after: Duration,
    resync: Duration,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            node_ip,
            node_name,
            requeue_after_secs,
            resync_secs,
        } = self;

        let mut prom = <Registry>::default();
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // The node's address is resolved once; pods are matched against it for the lifetime of
        // the process.
        let node_ip = node::local_address(&runtime.client(), node_ip, node_name.as_deref()).await;

        // The datapath registers programs through the writer half of the index, and the
        // reconciler reads them back to push allow-list updates.
        let (programs_tx, programs_rx) = index::pair();
        let reconciler = Reconciler::new(
            KubeStore::new(runtime.client()),
            InMemoryDatapath::new(programs_tx),
            programs_rx,
            node_ip,
        );
        let ctx = Arc::new(Context {
            reconciler,
            requeue_after: Duration::from_secs(requeue_after_secs),
            resync: Duration::from_secs(resync_secs),
        });

        if api_resource_exists::<k8s::PolicyEndpoint>(&runtime.client()).await {
            let api = k8s::Api::<k8s::PolicyEndpoint>::all(runtime.client());
            let drain = runtime.shutdown_handle();
            let (close_tx, close_rx) = oneshot::channel::<()>();
            let controller = policy_endpoints(api, ctx, close_rx.map(|_| ()));

            // Stop accepting new work on shutdown, but let in-flight reconciliations finish.
            tokio::spawn(
                async move {
                    tokio::pin!(controller);
                    tokio::select! {
                        () = &mut controller => {}
                        handle = drain.signaled() => {
                            let _ = close_tx.send(());
                            handle.release_after(controller).await;
                        }
                    }
                }
                .instrument(info_span!("policyendpoints")),
            );
        } else {
            warn!(
                "policyendpoints.policy.k8s.aws.nodeagent resource kind not found, skipping watches"
            );
        }

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

/// Drives reconciliation of all `PolicyEndpoint` resources until `shutdown` completes.
///
/// The controller serializes reconciliations of each resource while reconciling distinct
/// resources concurrently.
fn policy_endpoints(
    api: k8s::Api<k8s::PolicyEndpoint>,
    ctx: Arc<Context<KubeStore, InMemoryDatapath>>,
    shutdown: impl Future<Output = ()> + Send + Sync + 'static,
) -> impl Future<Output = ()> + Send {
    info!("Watching PolicyEndpoints");
    Controller::new(api, watcher::Config::default())
        .graceful_shutdown_on(shutdown)
        .run(reconcile_policy_endpoint, requeue, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(namespace = ?obj.namespace, name = %obj.name, "Reconciled"),
                Err(error) => warn!(%error, "Reconciliation failed"),
            }
        })
}

/// Successful reconciliations are repeated after the resync interval so that pods which become
/// local later are enforced without a change to the policy.
async fn reconcile_policy_endpoint<S, E>(
    pe: Arc<k8s::PolicyEndpoint>,
    ctx: Arc<Context<S, E>>,
) -> Result<Action, reconcile::Error>
where
    S: PolicyStore + Send + Sync,
    E: EnforcePolicy + Send + Sync,
{
    let id = ResourceId::new(pe.namespace().unwrap_or_default(), pe.name_any());
    ctx.reconciler.reconcile(&id).await?;
    Ok(Action::requeue(ctx.resync))
}

/// Every failed reconciliation is retried after the same fixed delay.
fn requeue<S, E>(
    _: Arc<k8s::PolicyEndpoint>,
    error: &reconcile::Error,
    ctx: Arc<Context<S, E>>,
) -> Action {
    warn!(%error, "Reconcile error, requeueing");
    Action::requeue(ctx.requeue_after)
}

async fn api_resource_exists<T>(client: &Client) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    client
        .list_api_group_resources(&T::api_version(&dt))
        .await
        .ok()
        .iter()
        .flat_map(|r| r.resources.iter())
        .any(|r| r.kind == T::kind(&dt))
}
