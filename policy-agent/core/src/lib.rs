#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod enforce;
mod id;

pub use self::{
    enforce::{Direction, EnforcePolicy, ProgramHandle, Workload},
    id::{PolicyId, ResourceId},
};
