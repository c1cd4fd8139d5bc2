//! Host preparation and VM creation.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ProvisionError, ProvisionResult};
use crate::exec::{self, CommandLine, RunMode};
use crate::packages;
use crate::paths::{CPUINFO, ImagePaths};
use crate::prerequisites;
use crate::spec::VmSpec;
use crate::synth;

/// Host locations the provisioner inspects. Overridable for tests.
pub struct HostConfig {
    /// Filesystem root used to find distribution marker files.
    pub root: PathBuf,
    pub cpuinfo: PathBuf,
    pub images: ImagePaths,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            cpuinfo: PathBuf::from(CPUINFO),
            images: ImagePaths::default(),
        }
    }
}

pub struct Provisioner {
    host: HostConfig,
    mode: RunMode,
}

impl Provisioner {
    pub fn new(host: HostConfig, mode: RunMode) -> Self {
        Self { host, mode }
    }

    pub fn images(&self) -> &ImagePaths {
        &self.host.images
    }

    /// Check root, CPU virtualization, and host OS, then install the toolstack.
    ///
    /// In dry-run, failed checks are logged as warnings and nothing is installed.
    pub async fn prepare_host(&self) -> ProvisionResult<()> {
        self.advisory(prerequisites::check_root())?;
        self.advisory(prerequisites::check_virtualization(&self.host.cpuinfo))?;
        match self.advisory(prerequisites::detect_host_os(&self.host.root))? {
            Some(os) => packages::ensure_toolstack(os, self.mode).await,
            None => {
                warn!("DRY RUN: host OS unknown, skipping toolstack installation");
                Ok(())
            }
        }
    }

    /// Synthesize and run `virt-install` for `spec`. Returns the command used.
    pub async fn create(&self, spec: &VmSpec) -> ProvisionResult<CommandLine> {
        warn_if_domain_exists(&spec.name).await;
        ensure_images_dir(self.host.images.images_dir(), self.mode)?;

        let cmd = synth::virt_install(spec);
        info!("creating VM '{}'", spec.name);
        exec::run(&cmd, self.mode).await?;

        if self.mode.is_dry_run() {
            info!("DRY RUN: VM '{}' was not created", spec.name);
        } else {
            info!("VM '{}' created", spec.name);
            for mgmt in synth::management_commands(&spec.name) {
                info!("  {mgmt}");
            }
        }
        Ok(cmd)
    }

    fn advisory<T>(&self, result: ProvisionResult<T>) -> ProvisionResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.mode.is_dry_run() => {
                warn!("DRY RUN: ignoring failed check: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Names are unique per host by convention only; `virt-install` has the final say.
async fn warn_if_domain_exists(name: &str) {
    let dominfo = CommandLine::new("virsh").args(["dominfo", name]);
    if exec::probe(&dominfo).await.is_ok() {
        warn!("a domain named '{name}' already exists; virt-install will likely refuse");
    }
}

fn ensure_images_dir(dir: &Path, mode: RunMode) -> ProvisionResult<()> {
    if dir.is_dir() || mode.is_dry_run() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(ProvisionError::Io)?;
    info!("created {}", dir.display());
    Ok(())
}
