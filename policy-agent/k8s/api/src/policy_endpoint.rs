use crate::LabelSelector;

/// Describes the address ranges a set of workloads may exchange traffic with.
///
/// `PolicyEndpoint` resources are published by the control plane; the node agent only reads
/// them.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    kube::CustomResource,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
)]
#[kube(
    group = "policy.k8s.aws.nodeagent",
    version = "v1alpha1",
    kind = "PolicyEndpoint",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEndpointSpec {
    /// Selects the pods this policy applies to.
    ///
    /// Not yet honored: the policy currently applies to every pod in its namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_selector: Option<LabelSelector>,

    #[serde(default)]
    pub ingress: Vec<IngressRule>,

    #[serde(default)]
    pub egress: Vec<EgressRule>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct IngressRule {
    /// Sources permitted to reach the selected workloads.
    #[serde(default)]
    pub from: Vec<EndpointInfo>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct EgressRule {
    /// Destinations the selected workloads may reach.
    #[serde(default)]
    pub to: Vec<EndpointInfo>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct EndpointInfo {
    /// An address range in CIDR notation.
    ///
    /// Kept as an opaque string; the datapath rejects ranges it cannot program.
    pub cidr: String,
}
