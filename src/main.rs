mod sync;

use crate::sync::cli::Cli;
use crate::sync::client::run;
use crate::sync::error::SyncError;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_sync_client(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            let code = e.downcast_ref::<SyncError>().map_or(1, SyncError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// 日志输出到 stderr，RUST_LOG 优先
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_sync_client(cli: Cli) -> Result<(), anyhow::Error> {
    let root = std::env::current_dir()?;
    run(cli, &root)
}
