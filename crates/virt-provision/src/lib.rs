//! Provision a single KVM virtual machine with `virt-install`.
//!
//! The pipeline is strictly sequential:
//! - [`cli`] / [`resolve`] gather raw parameters from flags or prompts
//! - [`spec`] validates and defaults them into a [`spec::VmSpec`]
//! - [`provision`] prepares the host ([`prerequisites`], [`packages`])
//! - [`synth`] renders the `virt-install` command, [`exec`] runs it

pub mod cli;
pub mod error;
pub mod exec;
pub mod log;
pub mod packages;
pub mod paths;
pub mod prerequisites;
pub mod prompt;
pub mod provision;
pub mod resolve;
pub mod spec;
pub mod synth;
