use std::path::{Path, PathBuf};

/// libvirt's default storage pool directory.
pub const IMAGES_DIR: &str = "/var/lib/libvirt/images";

/// Default transcript location (overridable with `--log-file`).
pub const DEFAULT_LOG_FILE: &str = "/var/log/virt-provision.log";

pub const LOG_FILE_ENV: &str = "VIRT_PROVISION_LOG";

pub const CPUINFO: &str = "/proc/cpuinfo";

pub const KVM_DEVICE: &str = "/dev/kvm";

/// Transcript path when the command line could not be parsed.
pub fn log_file_from_env() -> PathBuf {
    std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Distribution marker files, relative to the filesystem root.
pub mod markers {
    pub const DEBIAN: &str = "etc/debian_version";
    pub const REDHAT: &str = "etc/redhat-release";
}

/// Host storage paths derived from the images directory.
pub struct ImagePaths {
    images_dir: PathBuf,
}

impl Default for ImagePaths {
    fn default() -> Self {
        Self::new(PathBuf::from(IMAGES_DIR))
    }
}

impl ImagePaths {
    pub fn new(images_dir: PathBuf) -> Self {
        Self { images_dir }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Disk image for a VM: `<images_dir>/<name>.qcow2`.
    ///
    /// `name` must already be validated as a single file name; an absolute
    /// name would replace the images directory in the join.
    pub fn disk(&self, name: &str) -> PathBuf {
        self.images_dir.join(format!("{name}.qcow2"))
    }
}
