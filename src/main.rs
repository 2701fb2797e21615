use std::{
    env,
    io::{self, IsTerminal},
    process::ExitCode,
    time::Instant,
};

use bulk_pull::{
    opts::{Color, Opts},
    tasks::RunStatus,
};
use color_eyre::eyre::Result;
use tracing::{error, info, trace};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let now = Instant::now();
    color_eyre::install()?;
    let opts = bulk_pull::opts::parse();
    init_logging(&opts);
    trace!("Starting bulk-pull.");
    trace!("Current env: {:?}", env::vars().collect::<Vec<_>>());

    let status = bulk_pull::run(&opts)?;

    trace!("Finished bulk-pull.");
    match status {
        RunStatus::Passed => {
            info!("bulk-pull ran successfully in {:?}", now.elapsed());
            Ok(ExitCode::SUCCESS)
        }
        RunStatus::Failed => {
            error!("bulk-pull finished with failures in {:?}", now.elapsed());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Log to stderr, so stdout only carries `list` and `completions` output. `RUST_LOG` directives
/// are added on top of `--log-level`.
fn init_logging(opts: &Opts) {
    let ansi = match opts.color {
        Color::Auto => io::stderr().is_terminal(),
        Color::Always => true,
        Color::Never => false,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(opts.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}
