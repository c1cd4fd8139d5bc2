//! VM parameter model: raw operator input and the validated [`VmSpec`].

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{ProvisionError, ProvisionResult};
use crate::paths::ImagePaths;

pub const DEFAULT_RAM_MB: u32 = 2048;
pub const DEFAULT_VCPUS: u32 = 2;
pub const DEFAULT_DISK_GB: u32 = 20;

/// Where the guest OS installer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Boot from a local ISO image (`--cdrom`).
    Iso(PathBuf),
    /// Install from a network tree (`--location`).
    Url(String),
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso(path) => write!(f, "iso {}", path.display()),
            Self::Url(url) => write!(f, "url {url}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Network {
    /// libvirt's `default` NAT network.
    #[default]
    Nat,
    /// Attach to a host bridge interface.
    Bridge(String),
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nat => f.write_str("nat"),
            Self::Bridge(iface) => write!(f, "bridge {iface}"),
        }
    }
}

/// Possibly incomplete parameters as gathered from flags or prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub name: Option<String>,
    pub ram_mb: Option<u32>,
    pub vcpus: Option<u32>,
    pub disk_gb: Option<u32>,
    pub os_variant: Option<String>,
    pub install_source: Option<InstallSource>,
    pub network: Option<Network>,
}

/// Validated provisioning parameters for exactly one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub name: String,
    pub ram_mb: u32,
    pub vcpus: u32,
    pub disk_gb: u32,
    pub os_variant: Option<String>,
    pub install_source: Option<InstallSource>,
    pub network: Network,
    pub disk_path: PathBuf,
}

impl RawParams {
    /// Validate and default into a [`VmSpec`].
    ///
    /// `name` is the only required field and must be usable as a file name.
    /// `os_variant` and `install_source` are passed through unset;
    /// `virt-install` reports them if it needs them.
    pub fn resolve(self, paths: &ImagePaths) -> ProvisionResult<VmSpec> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(ProvisionError::MissingRequiredField("name"))?;
        // The disk image must land inside the images directory.
        if name.contains(['/', '\0']) || name == "." || name == ".." {
            return Err(ProvisionError::InvalidName(name));
        }

        let spec = VmSpec {
            disk_path: paths.disk(&name),
            name,
            ram_mb: self.ram_mb.unwrap_or(DEFAULT_RAM_MB),
            vcpus: self.vcpus.unwrap_or(DEFAULT_VCPUS),
            disk_gb: self.disk_gb.unwrap_or(DEFAULT_DISK_GB),
            os_variant: self.os_variant.filter(|os| !os.trim().is_empty()),
            install_source: self.install_source,
            network: self.network.unwrap_or_default(),
        };

        debug!(name = %spec.name, "resolved name");
        debug!(
            ram_mb = spec.ram_mb,
            vcpus = spec.vcpus,
            disk_gb = spec.disk_gb,
            "resolved sizing"
        );
        debug!(disk_path = %spec.disk_path.display(), "resolved disk path");
        debug!(network = %spec.network, "resolved network");
        match &spec.os_variant {
            Some(os) => debug!(os_variant = %os, "resolved os variant"),
            None => warn!("no OS variant given; leaving detection to virt-install"),
        }
        match &spec.install_source {
            Some(source) => debug!(install_source = %source, "resolved install source"),
            None => warn!("no install source given (--iso or --url); virt-install may reject it"),
        }

        Ok(spec)
    }
}

impl VmSpec {
    /// Lower back into raw params. Resolving the result yields `self` again.
    pub fn to_raw(&self) -> RawParams {
        RawParams {
            name: Some(self.name.clone()),
            ram_mb: Some(self.ram_mb),
            vcpus: Some(self.vcpus),
            disk_gb: Some(self.disk_gb),
            os_variant: self.os_variant.clone(),
            install_source: self.install_source.clone(),
            network: Some(self.network.clone()),
        }
    }
}
