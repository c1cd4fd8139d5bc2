use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::error::ProvisionError;
use crate::paths::{DEFAULT_LOG_FILE, LOG_FILE_ENV};
use crate::spec::{InstallSource, Network, RawParams};

/// Provision a KVM virtual machine with virt-install.
///
/// Without --auto or --dry-run, missing parameters are asked for interactively.
#[derive(Debug, Parser)]
#[command(name = "virt-provision", version, args_override_self = true)]
pub struct Cli {
    /// Name of the virtual machine (required)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// RAM in MB [default: 2048]
    #[arg(short, long, value_name = "RAM", value_parser = clap::value_parser!(u32).range(1..))]
    pub ram: Option<u32>,

    /// Number of virtual CPUs [default: 2]
    #[arg(short, long, value_name = "CPUS", value_parser = clap::value_parser!(u32).range(1..))]
    pub cpus: Option<u32>,

    /// Disk size in GB [default: 20]
    #[arg(short, long, value_name = "DISK", value_parser = clap::value_parser!(u32).range(1..))]
    pub disk: Option<u32>,

    /// OS variant (see `virt-install --osinfo list`)
    #[arg(short, long, value_name = "OS_TYPE")]
    pub os: Option<String>,

    /// Install from an ISO image (the later of --iso/--url wins)
    #[arg(short, long, value_name = "ISO_PATH", overrides_with = "url")]
    pub iso: Option<PathBuf>,

    /// Install from a network location (the later of --iso/--url wins)
    #[arg(short, long, value_name = "URL", overrides_with = "iso")]
    pub url: Option<String>,

    /// Attach to this host bridge instead of the default NAT network
    #[arg(short, long, value_name = "BRIDGE")]
    pub bridge: Option<String>,

    /// Skip interactive prompts
    #[arg(short, long)]
    pub auto: bool,

    /// Log the virt-install command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Transcript log file
    #[arg(long, value_name = "PATH", env = LOG_FILE_ENV, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

/// Outcome of parsing the command line.
#[derive(Debug)]
pub enum Parsed {
    Run(Box<Cli>),
    /// `--help` or `--version`; print the text and exit 0.
    Info(String),
    Invalid(ProvisionError),
}

pub fn parse_from<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Parsed::Run(Box::new(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Parsed::Info(e.to_string())
        }
        Err(e) => {
            let rendered = e.to_string();
            let summary = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            Parsed::Invalid(ProvisionError::UnknownFlag(summary))
        }
    }
}

/// Full usage text, reprinted after input errors.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

impl Cli {
    /// Prompts are used only when neither `--auto` nor `--dry-run` is set.
    pub fn is_interactive(&self) -> bool {
        !self.auto && !self.dry_run
    }

    pub fn raw_params(&self) -> RawParams {
        // --iso and --url override each other, so at most one is set here.
        let install_source = match (&self.iso, &self.url) {
            (Some(iso), _) => Some(InstallSource::Iso(iso.clone())),
            (None, Some(url)) => Some(InstallSource::Url(url.clone())),
            (None, None) => None,
        };
        RawParams {
            name: self.name.clone(),
            ram_mb: self.ram,
            vcpus: self.cpus,
            disk_gb: self.disk,
            os_variant: self.os.clone(),
            install_source,
            network: self.bridge.clone().map(Network::Bridge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let argv = std::iter::once("virt-provision").chain(args.iter().copied());
        match parse_from(argv) {
            Parsed::Run(cli) => *cli,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    fn invalid(args: &[&str]) -> ProvisionError {
        let argv = std::iter::once("virt-provision").chain(args.iter().copied());
        match parse_from(argv) {
            Parsed::Invalid(e) => e,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn long_flags() {
        let c = cli(&[
            "--name", "testvm", "--ram", "4096", "--cpus", "4", "--disk", "40", "--os",
            "ubuntu20.04", "--bridge", "br0", "--auto",
        ]);
        let raw = c.raw_params();
        assert_eq!(raw.name.as_deref(), Some("testvm"));
        assert_eq!(raw.ram_mb, Some(4096));
        assert_eq!(raw.vcpus, Some(4));
        assert_eq!(raw.disk_gb, Some(40));
        assert_eq!(raw.os_variant.as_deref(), Some("ubuntu20.04"));
        assert_eq!(raw.network, Some(Network::Bridge("br0".into())));
        assert!(c.auto);
        assert!(!c.dry_run);
        assert!(!c.is_interactive());
    }

    #[test]
    fn short_flags() {
        let c = cli(&[
            "-n", "vm", "-r", "1024", "-c", "1", "-d", "10", "-o", "debian12", "-i", "/a.iso",
            "-b", "br1", "-a",
        ]);
        let raw = c.raw_params();
        assert_eq!(raw.name.as_deref(), Some("vm"));
        assert_eq!(raw.ram_mb, Some(1024));
        assert_eq!(raw.vcpus, Some(1));
        assert_eq!(raw.disk_gb, Some(10));
        assert_eq!(raw.install_source, Some(InstallSource::Iso("/a.iso".into())));
        assert_eq!(raw.network, Some(Network::Bridge("br1".into())));
        assert!(c.auto);
    }

    #[test]
    fn later_install_source_wins() {
        let c = cli(&["-n", "x", "--iso", "/a.iso", "--url", "http://mirror/os"]);
        assert_eq!(
            c.raw_params().install_source,
            Some(InstallSource::Url("http://mirror/os".into()))
        );

        let c = cli(&["-n", "x", "--url", "http://mirror/os", "--iso", "/a.iso"]);
        assert_eq!(
            c.raw_params().install_source,
            Some(InstallSource::Iso("/a.iso".into()))
        );

        let c = cli(&["-n", "x", "-i", "/a.iso", "-u", "http://m/", "-i", "/b.iso"]);
        assert_eq!(
            c.raw_params().install_source,
            Some(InstallSource::Iso("/b.iso".into()))
        );
    }

    #[test]
    fn repeated_flag_keeps_last_value() {
        let c = cli(&["--name", "first", "--name", "second"]);
        assert_eq!(c.name.as_deref(), Some("second"));
    }

    #[test]
    fn no_bridge_means_no_network_override() {
        assert_eq!(cli(&["-n", "x"]).raw_params().network, None);
    }

    #[test]
    fn interactive_only_without_auto_or_dry_run() {
        assert!(cli(&[]).is_interactive());
        assert!(!cli(&["--dry-run"]).is_interactive());
        assert!(!cli(&["--auto"]).is_interactive());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = invalid(&["--name", "x", "--frobnicate"]);
        assert!(matches!(err, ProvisionError::UnknownFlag(_)));
        assert!(err.to_string().contains("--frobnicate"), "got: {err}");
        assert!(err.is_input_error());
    }

    #[test]
    fn missing_value_is_rejected() {
        assert!(matches!(invalid(&["--name"]), ProvisionError::UnknownFlag(_)));
    }

    #[test]
    fn non_numeric_ram_is_rejected() {
        assert!(matches!(
            invalid(&["--name", "x", "--ram", "lots"]),
            ProvisionError::UnknownFlag(_)
        ));
        assert!(matches!(
            invalid(&["--name", "x", "--cpus", "0"]),
            ProvisionError::UnknownFlag(_)
        ));
    }

    #[test]
    fn help_and_version_are_info() {
        for flag in ["-h", "--help", "--version"] {
            let argv = ["virt-provision", flag];
            assert!(matches!(parse_from(argv), Parsed::Info(_)), "{flag}");
        }
    }

    #[test]
    fn usage_lists_flags() {
        let text = usage();
        for flag in [
            "--name", "--ram", "--cpus", "--disk", "--os", "--iso", "--url", "--bridge", "--auto",
            "--dry-run",
        ] {
            assert!(text.contains(flag), "usage missing {flag}");
        }
    }

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
