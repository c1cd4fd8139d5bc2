use std::path::Path;

use tracing::{info, warn};

use crate::error::{ProvisionError, ProvisionResult};
use crate::packages::HostOs;
use crate::paths::{KVM_DEVICE, markers};

/// Fail unless running with effective uid 0.
pub fn check_root() -> ProvisionResult<()> {
    if nix::unistd::geteuid().is_root() {
        info!("[OK] running as root");
        Ok(())
    } else {
        Err(ProvisionError::NotRoot)
    }
}

/// Look for the Intel VT-x (`vmx`) or AMD-V (`svm`) CPU flag.
pub fn check_virtualization(cpuinfo: &Path) -> ProvisionResult<()> {
    let content = std::fs::read_to_string(cpuinfo)?;
    if !has_virtualization_flag(&content) {
        return Err(ProvisionError::MissingVirtualizationSupport(
            cpuinfo.to_path_buf(),
        ));
    }
    info!("[OK] CPU supports hardware virtualization");

    // The kvm module may only load once the toolstack is installed.
    if !Path::new(KVM_DEVICE).exists() {
        warn!("{KVM_DEVICE} not found; is the kvm module loaded?");
    }
    Ok(())
}

fn has_virtualization_flag(cpuinfo: &str) -> bool {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("flags"))
        .filter_map(|line| line.split_once(':'))
        .any(|(_, flags)| flags.split_whitespace().any(|f| f == "vmx" || f == "svm"))
}

/// Pick the package manager family from distribution marker files under `root`.
pub fn detect_host_os(root: &Path) -> ProvisionResult<HostOs> {
    let os = if root.join(markers::DEBIAN).exists() {
        HostOs::Debian
    } else if root.join(markers::REDHAT).exists() {
        HostOs::RedHat
    } else {
        return Err(ProvisionError::UnsupportedHostOS);
    };
    info!("[OK] host OS family: {os}");
    Ok(os)
}
