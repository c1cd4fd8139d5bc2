//! Interactive parameter gathering.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{ProvisionError, ProvisionResult};
use crate::prompt::Prompter;
use crate::spec::{
    DEFAULT_DISK_GB, DEFAULT_RAM_MB, DEFAULT_VCPUS, InstallSource, Network, RawParams,
};

const SOURCE_CHOICES: [&str; 2] = ["ISO file", "Network install (URL)"];
const NETWORK_CHOICES: [&str; 2] = ["NAT (default network)", "Bridge"];

/// Ask the operator for every parameter in a fixed sequence.
///
/// Values in `seed` (from flags) are offered as defaults. The install source
/// and network are forced choices. A chosen ISO must exist on disk.
pub fn interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    seed: RawParams,
) -> ProvisionResult<RawParams> {
    let name = non_empty(prompter.input("VM name", seed.name.as_deref())?);
    debug!(name = ?name, "prompted name");

    let ram_mb = prompter.number("RAM in MB", seed.ram_mb.unwrap_or(DEFAULT_RAM_MB))?;
    let vcpus = prompter.number("Number of vCPUs", seed.vcpus.unwrap_or(DEFAULT_VCPUS))?;
    let disk_gb = prompter.number("Disk size in GB", seed.disk_gb.unwrap_or(DEFAULT_DISK_GB))?;
    debug!(ram_mb, vcpus, disk_gb, "prompted sizing");

    let os_variant = non_empty(prompter.input(
        "OS variant (e.g. ubuntu22.04, debian12, rhel9.0)",
        seed.os_variant.as_deref(),
    )?);
    debug!(os_variant = ?os_variant, "prompted os variant");

    let install_source = match prompter.select("Installation source:", &SOURCE_CHOICES)? {
        0 => {
            let default = match &seed.install_source {
                Some(InstallSource::Iso(path)) => Some(path.display().to_string()),
                _ => None,
            };
            let path = PathBuf::from(prompter.input("Path to ISO file", default.as_deref())?);
            if !path.is_file() {
                return Err(ProvisionError::SourceFileNotFound(path));
            }
            Some(InstallSource::Iso(path))
        }
        _ => {
            let default = match &seed.install_source {
                Some(InstallSource::Url(url)) => Some(url.as_str()),
                _ => None,
            };
            non_empty(prompter.input("Installation URL", default)?).map(InstallSource::Url)
        }
    };
    debug!(install_source = ?install_source, "prompted install source");

    let network = match prompter.select("Network type:", &NETWORK_CHOICES)? {
        0 => Network::Nat,
        _ => {
            let default = match &seed.network {
                Some(Network::Bridge(iface)) => Some(iface.as_str()),
                _ => None,
            };
            match non_empty(prompter.input("Bridge interface name", default)?) {
                Some(iface) => Network::Bridge(iface),
                None => {
                    warn!("no bridge interface given; using NAT");
                    Network::Nat
                }
            }
        }
    };
    debug!(network = %network, "prompted network");

    Ok(RawParams {
        name,
        ram_mb: Some(ram_mb),
        vcpus: Some(vcpus),
        disk_gb: Some(disk_gb),
        os_variant,
        install_source,
        network: Some(network),
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
