use clap::Parser;
use eeat_page::{Analyzer, EeatReport};
use serde::Serialize;
use std::process::ExitCode;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let analyzer = match Analyzer::new(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            ::log::error!("Failed to start analyzer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start_time = std::time::Instant::now();
    let result = run(&analyzer, args.command).await;
    ::log::info!(
        "Finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(analyzer: &Analyzer, command: Command) -> eeat_page::Result<()> {
    match command {
        Command::Analyze { url, cached } => {
            ::log::info!("Analyzing {}", url);
            print_json(&analyzer.analyze(&url, cached).await?)
        }
        Command::Batch { urls } => {
            let reports = analyzer.analyze_many(&urls).await;
            ::log::info!("{} of {} pages ranked", reports.len(), urls.len());
            print_json(&reports)
        }
        Command::Crawl { url } => print_json(&analyzer.crawl(&url).await?),
        Command::Search { keyword, limit } => print_json(&analyzer.search(&keyword, limit).await?),
        Command::Suggest { report } => {
            let report: EeatReport = serde_json::from_str(&std::fs::read_to_string(report)?)?;
            print_json(&analyzer.suggest(&report).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> eeat_page::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
