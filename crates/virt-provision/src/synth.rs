//! Renders a [`VmSpec`] into a `virt-install` invocation.
//!
//! Flag order is fixed: name, ram, vcpus, disk, os variant, install source,
//! network, then the console flags. Log transcripts and tests rely on it.

use crate::exec::CommandLine;
use crate::spec::{InstallSource, Network, VmSpec};

pub const VIRT_INSTALL: &str = "virt-install";

/// Always appended; not operator-configurable.
const CONSOLE_FLAGS: [&str; 5] = [
    "--graphics",
    "none",
    "--console",
    "pty,target_type=serial",
    "--noautoconsole",
];

pub fn virt_install(spec: &VmSpec) -> CommandLine {
    let mut cmd = CommandLine::new(VIRT_INSTALL)
        .args(["--name", spec.name.as_str()])
        .args(["--ram".to_string(), spec.ram_mb.to_string()])
        .args(["--vcpus".to_string(), spec.vcpus.to_string()])
        .args([
            "--disk".to_string(),
            format!("path={},size={}", spec.disk_path.display(), spec.disk_gb),
        ]);

    if let Some(os) = &spec.os_variant {
        cmd = cmd.args(["--os-variant", os.as_str()]);
    }

    cmd = match &spec.install_source {
        Some(InstallSource::Iso(path)) => {
            cmd.args(["--cdrom".to_string(), path.display().to_string()])
        }
        Some(InstallSource::Url(url)) => cmd.args(["--location", url.as_str()]),
        None => cmd,
    };

    cmd.args(["--network".to_string(), network_clause(&spec.network)])
        .args(CONSOLE_FLAGS)
}

/// `virsh` commands for managing the new domain, shown after creation.
pub fn management_commands(name: &str) -> [CommandLine; 4] {
    ["start", "console", "shutdown", "destroy"]
        .map(|action| CommandLine::new("virsh").args([action, name]))
}

fn network_clause(network: &Network) -> String {
    match network {
        Network::Nat => "network=default".to_string(),
        Network::Bridge(iface) => format!("bridge={iface}"),
    }
}
