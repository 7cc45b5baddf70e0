use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, error, info};

use crate::cli::Cli;
use crate::error::PipelineError;
use crate::optimizer::{Optimizer, ProcessOptimizer};

mod cli;
mod common;
mod error;
mod optimizer;
mod pipeline;
mod render;
mod report;
mod topology;

fn run(cli: &Cli) -> Result<(), PipelineError> {
    let config = cli.to_config()?;

    let process = ProcessOptimizer::new(&config.optimizer);
    let optimizer: Option<&dyn Optimizer> = if cli.skip_optimizer { None } else { Some(&process) };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = pipeline::run(&config, optimizer, &mut out)?;

    info!(
        "Done: {} routers, {} clients, {} links, giant component {}",
        summary.routers, summary.clients, summary.links, summary.derived.sgc
    );
    if summary.discrepancies > 0 {
        info!("{} reported metric(s) disagree with the placement, see warnings above", summary.discrepancies);
    }
    Ok(())
}

fn main() {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter(Some("wmn_viz"), LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            if !log::log_enabled!(log::Level::Error) {
                eprintln!("{}", e);
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}
