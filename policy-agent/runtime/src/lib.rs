pub use network_policy_agent_core as core;
pub use network_policy_agent_index as index;
pub use network_policy_agent_k8s_api as k8s;
pub use network_policy_agent_k8s_reconcile as reconcile;

mod args;
mod datapath;
mod node;

pub use self::{args::Args, datapath::InMemoryDatapath};
