#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod policy_endpoint;

pub use self::policy_endpoint::{
    EgressRule, EndpointInfo, IngressRule, PolicyEndpoint, PolicyEndpointSpec,
};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{Node, NodeAddress, NodeStatus, Pod, PodStatus},
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Resource, ResourceExt},
    Client, Error,
};
