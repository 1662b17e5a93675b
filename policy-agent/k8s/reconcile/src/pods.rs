//! Selects the pods in a namespace that run on this node.

use crate::PolicyStore;
use anyhow::Result;
use network_policy_agent_k8s_api::Pod;

/// Lists the pods in `namespace` and keeps those whose host IP is `node_ip`.
///
/// Pods that have not been scheduled yet have no host IP and are never selected. An empty
/// `node_ip` selects nothing.
pub async fn select_local<S>(store: &S, namespace: &str, node_ip: &str) -> Result<Vec<Pod>>
where
    S: PolicyStore + Sync + ?Sized,
{
    let pods = store.list_pods(namespace).await?;
    tracing::debug!(pods = pods.len(), "Listed pods");
    Ok(pods.into_iter().filter(|pod| is_local(pod, node_ip)).collect())
}

pub fn is_local(pod: &Pod, node_ip: &str) -> bool {
    if node_ip.is_empty() {
        return false;
    }

    pod.status
        .as_ref()
        .and_then(|status| status.host_ip.as_deref())
        == Some(node_ip)
}
