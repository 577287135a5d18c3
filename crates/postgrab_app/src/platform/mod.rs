mod cli;
pub mod logging;
mod progress;
mod settings;
mod sources;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use postgrab_engine::{Engine, EngineConfig};

use cli::{Cli, Source};
use progress::LogSink;

pub fn run_app() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = settings::load(cli.config.as_deref())?;
    let config = settings.apply(EngineConfig::default_with_output(cli.output.clone()));

    // Validate link sources before any network traffic.
    let source = cli.source();
    let links = match &source {
        Source::Listing(_) => Vec::new(),
        Source::Post(link) => sources::single_link(link)?,
        Source::File(path) => sources::links_from_file(path)?,
        Source::Clipboard => sources::links_from_clipboard()?,
    };

    let runtime = tokio::runtime::Runtime::new().context("cannot start the async runtime")?;
    let engine = Engine::new(config);
    let sink = LogSink;

    let report = runtime.block_on(async {
        match &source {
            Source::Listing(request) => {
                engine_info!(
                    "Downloading r/{} ({}, {}), limit {}",
                    request.source,
                    request.category.as_str(),
                    request.range.as_str(),
                    request.limit
                );
                engine.download_listing(request, &sink).await
            }
            _ => {
                engine_info!("Downloading {} linked posts", links.len());
                engine.download_links(&links, &sink).await
            }
        }
    });

    engine_info!("Finished! {}", report);
    println!("Finished! {}", report);
    Ok(())
}
