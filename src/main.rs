mod cli;
mod color;
mod config;
mod data;
mod error;
mod plots;
mod report;
mod tables;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    log::debug!("Report configuration: {config:?}");

    let summary = report::run(&config)?;
    log::info!(
        "Result evaluation done. Saved all plots and tables under {}",
        config.output_dir.display()
    );
    if summary.argo_skipped {
        log::info!("ArgoUML figures were skipped");
    }
    Ok(())
}
