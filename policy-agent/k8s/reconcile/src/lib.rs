//! Reconciles `PolicyEndpoint` resources into node-local enforcement state.
//!
//! Each reconciliation handles a single policy:
//!
//! 1. The `PolicyEndpoint` is fetched. A policy that no longer exists requires no work.
//! 2. Its ingress and egress address ranges are flattened into [`Cidrs`].
//! 3. The pods in the policy's namespace that are scheduled on this node are selected.
//! 4. Each selected pod has probes attached and, where the datapath already runs a program for
//!    the policy, that program's allow-list is replaced with the policy's ranges.
//!
//! Per-pod failures are logged and tolerated so that one unhealthy workload never blocks the
//! others; the next change signal retries them. Only failures to read cluster state are
//! returned to the caller, which is expected to requeue the policy.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cidrs;
pub mod pods;
mod reconciler;
mod store;


pub use self::{
    cidrs::Cidrs,
    reconciler::{Error, Reconciler, Summary},
    store::{KubeStore, PolicyStore},
};
