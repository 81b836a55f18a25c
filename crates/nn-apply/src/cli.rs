use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use nn_apply_api::Client;
use nn_apply_runtime::Dispatcher;

use crate::config::AppConfig;
use crate::{host, logging, print_err, print_info, print_warn};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Read events from this file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Print the configuration resolved from the environment and exit.
    #[arg(long)]
    pub dry_run_config: bool,
}

pub fn cli_main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init();

    let time_begin = std::time::Instant::now();
    match handle_args(args) {
        Ok(()) => {
            log::debug!("Exiting after {:.1}s", time_begin.elapsed().as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_err!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_args(args: CliArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to read configuration")?;
    if args.dry_run_config {
        println!("{config}");
        return Ok(());
    }
    run(args, config)
}

fn run(args: CliArgs, config: AppConfig) -> anyhow::Result<()> {
    let mut client = Client::new(&config.server_address, &config.credentials)
        .context("Failed to create platform client")?;
    if let Some(timeout) = config.request_timeout {
        client = client.with_request_timeout(timeout);
    }

    let mut dispatcher = Dispatcher::start(client, config.session)
        .with_context(|| format!("Failed to load project {}", config.session.project_id))?;
    print_info!(
        "Project '{}' loaded with {} images",
        dispatcher.session().project().name,
        dispatcher.session().project_images().len()
    );

    let summary = match args.events {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open events file {}", path.display()))?;
            host::run(&mut dispatcher, BufReader::new(file))?
        }
        None => host::run(&mut dispatcher, io::stdin().lock())?,
    };

    if summary.failed > 0 || summary.skipped > 0 {
        print_warn!(
            "{} events handled, {} failed, {} skipped",
            summary.handled,
            summary.failed,
            summary.skipped
        );
    } else {
        print_info!("{} events handled", summary.handled);
    }
    Ok(())
}
