//! Virtualization toolstack installation per distribution family.

use std::fmt;

use tracing::info;

use crate::error::ProvisionResult;
use crate::exec::{self, CommandLine, RunMode};

/// Binaries that must be on `PATH` for provisioning to work.
const TOOLSTACK_BINARIES: [&str; 2] = ["virt-install", "virsh"];

const LIBVIRT_SERVICE: &str = "libvirtd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// apt-based (Debian, Ubuntu).
    Debian,
    /// yum-based (RHEL, CentOS, Rocky, Fedora).
    RedHat,
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => f.write_str("debian"),
            Self::RedHat => f.write_str("redhat"),
        }
    }
}

impl HostOs {
    pub fn packages(self) -> &'static [&'static str] {
        match self {
            Self::Debian => &[
                "qemu-kvm",
                "libvirt-daemon-system",
                "libvirt-clients",
                "bridge-utils",
                "virtinst",
            ],
            Self::RedHat => &[
                "qemu-kvm",
                "libvirt",
                "libvirt-client",
                "bridge-utils",
                "virt-install",
            ],
        }
    }

    /// Package manager commands, in order.
    pub fn install_commands(self) -> Vec<CommandLine> {
        match self {
            Self::Debian => vec![
                CommandLine::new("apt-get").arg("update"),
                CommandLine::new("apt-get")
                    .args(["install", "-y"])
                    .args(self.packages().iter().copied()),
            ],
            Self::RedHat => vec![
                CommandLine::new("yum")
                    .args(["install", "-y"])
                    .args(self.packages().iter().copied()),
            ],
        }
    }
}

/// `systemctl enable --now libvirtd`
pub fn enable_libvirtd() -> CommandLine {
    CommandLine::new("systemctl").args(["enable", "--now", LIBVIRT_SERVICE])
}

/// Names of toolstack binaries missing from `PATH`.
pub fn missing_binaries() -> Vec<&'static str> {
    TOOLSTACK_BINARIES
        .iter()
        .filter(|bin| which::which(bin).is_err())
        .copied()
        .collect()
}

/// Install the toolstack if any binary is missing, then make sure libvirtd runs.
pub async fn ensure_toolstack(os: HostOs, mode: RunMode) -> ProvisionResult<()> {
    let missing = missing_binaries();
    if missing.is_empty() {
        info!("[OK] virtualization toolstack already installed");
    } else {
        info!(
            "installing virtualization packages (missing: {})",
            missing.join(", ")
        );
        for cmd in os.install_commands() {
            exec::run(&cmd, mode).await?;
        }
        if !mode.is_dry_run() {
            info!("[OK] virtualization packages installed");
        }
    }

    let is_active = CommandLine::new("systemctl").args(["is-active", LIBVIRT_SERVICE]);
    if matches!(exec::probe(&is_active).await.as_deref(), Ok("active")) {
        info!("[OK] {LIBVIRT_SERVICE} is running");
        return Ok(());
    }
    exec::run(&enable_libvirtd(), mode).await?;
    if !mode.is_dry_run() {
        info!("[OK] {LIBVIRT_SERVICE} enabled and started");
    }
    Ok(())
}
