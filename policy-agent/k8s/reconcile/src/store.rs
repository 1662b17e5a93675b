use anyhow::Result;
use network_policy_agent_core::ResourceId;
use network_policy_agent_k8s_api::{self as k8s, PolicyEndpoint, Pod};

/// Reads the cluster resources a reconciliation depends on.
#[async_trait::async_trait]
pub trait PolicyStore {
    /// Fetches a `PolicyEndpoint`, returning `None` if it does not exist.
    async fn get_policy_endpoint(&self, id: &ResourceId) -> Result<Option<PolicyEndpoint>>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>>;
}

/// Reads resources from the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: k8s::Client,
}

// === impl KubeStore ===

impl KubeStore {
    pub fn new(client: k8s::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PolicyStore for KubeStore {
    async fn get_policy_endpoint(&self, id: &ResourceId) -> Result<Option<PolicyEndpoint>> {
        let api = k8s::Api::<PolicyEndpoint>::namespaced(self.client.clone(), &id.namespace);
        let pe = api.get_opt(&id.name).await?;
        Ok(pe)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        let api = k8s::Api::<Pod>::namespaced(self.client.clone(), namespace);
        let pods = api.list(&k8s::ListParams::default()).await?;
        Ok(pods.items)
    }
}
