//! gitctx - main entry point

use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use gitctx::{initialize, run_context_command, Cli, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting gitctx v{}", env!("CARGO_PKG_VERSION"));
    debug!("CLI args: {:?}", cli.command);

    let result = Settings::from_home().and_then(|settings| {
        debug!("Using state directory {}", settings.state_dir.display());
        initialize(&settings)?;
        run_context_command(&settings, &cli.command)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
