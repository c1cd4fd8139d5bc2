use std::process::ExitCode;

use tracing::{error, info};
use virt_provision::cli::{self, Cli, Parsed};
use virt_provision::error::{ProvisionError, ProvisionResult};
use virt_provision::exec::RunMode;
use virt_provision::prompt::Prompter;
use virt_provision::provision::{HostConfig, Provisioner};
use virt_provision::{log, paths, resolve};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match cli::parse_from(std::env::args_os()) {
        Parsed::Run(cli) => cli,
        Parsed::Info(text) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Parsed::Invalid(e) => {
            log::init(&paths::log_file_from_env());
            return fail(&e);
        }
    };

    log::init(&cli.log_file);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

async fn run(cli: &Cli) -> ProvisionResult<()> {
    let mode = RunMode::from_dry_run(cli.dry_run);
    let provisioner = Provisioner::new(HostConfig::default(), mode);
    info!(
        "virt-provision {} starting{}",
        env!("CARGO_PKG_VERSION"),
        if mode.is_dry_run() { " (dry run)" } else { "" }
    );

    // Interactive runs check the host before asking questions; automated runs
    // reject bad input before touching the host.
    let spec = if cli.is_interactive() {
        provisioner.prepare_host().await?;
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
        resolve::interactive(&mut prompter, cli.raw_params())?.resolve(provisioner.images())?
    } else {
        let spec = cli.raw_params().resolve(provisioner.images())?;
        provisioner.prepare_host().await?;
        spec
    };

    provisioner.create(&spec).await?;
    info!("done");
    Ok(())
}

fn fail(e: &ProvisionError) -> ExitCode {
    error!("{e}");
    if e.is_input_error() {
        eprintln!("\n{}", cli::usage());
    }
    ExitCode::FAILURE
}
