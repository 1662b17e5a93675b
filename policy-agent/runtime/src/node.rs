//! Node address discovery

use crate::k8s::{self, Client};
use tracing::{info, warn};

/// Resolves the address pods on this node report as their host IP.
///
/// An explicitly configured address takes precedence. Otherwise the node's `InternalIP` is read
/// from its `Node` resource. If neither is available, an empty address is returned, which
/// matches no pods.
pub(crate) async fn local_address(
    client: &Client,
    node_ip: Option<String>,
    node_name: Option<&str>,
) -> String {
    if let Some(ip) = node_ip {
        info!(node_ip = %ip, "Using configured node address");
        return ip;
    }

    let Some(name) = node_name else {
        warn!("Neither a node address nor a node name is configured; no pods will be selected");
        return String::new();
    };

    let api = k8s::Api::<k8s::Node>::all(client.clone());
    match api.get(name).await {
        Ok(node) => match internal_ip(&node) {
            Some(ip) => {
                info!(node = %name, node_ip = %ip, "Discovered node address");
                ip
            }
            None => {
                warn!(node = %name, "Node has no InternalIP address; no pods will be selected");
                String::new()
            }
        },
        Err(error) => {
            warn!(node = %name, %error, "Failed to fetch Node; no pods will be selected");
            String::new()
        }
    }
}

fn internal_ip(node: &k8s::Node) -> Option<String> {
    node.status
        .as_ref()?
        .addresses
        .as_ref()?
        .iter()
        .find(|addr| addr.type_ == "InternalIP")
        .map(|addr| addr.address.clone())
}
