mod cli;
mod config;
mod error;
mod layout;
mod model;
mod pipeline;
mod render;
mod report;
mod stats;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let config = args.run_config();

    let mut failed = 0usize;
    for subject in &args.subjects {
        info!(subject, "processing");
        if let Err(err) = pipeline::process_subject(subject, &config) {
            error!(subject, error = %err, "subject failed; continuing with the rest");
            failed += 1;
        }
    }
    if failed > 0 {
        error!(failed, total = args.subjects.len(), "run finished with failures");
        std::process::exit(1);
    }
}
