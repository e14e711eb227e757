//! Cinelens CLI - search the local title dataset and print cached AI analyses.
//!
//! Mirrors the lookup page: `--query` alone lists matching titles, `--query`
//! with `--tconst` prints the analysis fragment for that title.

use anyhow::{Context, Result};
use cinelens_core::{LookupRequest, LookupResponse, MovieService, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "cinelens")]
#[command(about = "Look up titles in a local IMDb dataset and analyze them with Gemini")]
struct Args {
    /// Free-text title query
    #[arg(short, long, default_value = "")]
    query: String,

    /// Title identifier to analyze (requires --query)
    #[arg(short, long)]
    tconst: Option<String>,

    /// Maximum number of search results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Directory containing title.basics.tsv and title.ratings.tsv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for cached analyses
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Generation model identifier
    #[arg(long)]
    model: Option<String>,

    /// Print the whole response as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
        return;
    }

    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn resolve_config(args: &Args) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::from_env().context("Invalid environment configuration")?;

    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(limit) = args.limit {
        config = config.with_search_limit(limit);
    }
    Ok(config)
}

fn print_response(response: &LookupResponse) {
    if let Some(analysis) = &response.analysis {
        println!("{}", analysis);
        return;
    }

    for result in &response.results {
        println!(
            "{}\t{} ({})",
            result.tconst,
            result.title,
            result.year.as_deref().unwrap_or("N/A")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let args = Args::parse();
    init_logging(args.debug);
    debug!(".env loaded: {}", dotenv_loaded);

    let config = resolve_config(&args)?;
    info!("Data directory: {}", config.data_dir.display());
    debug!("Configuration: {:?}", config);

    let service = MovieService::from_config(&config).context("Failed to initialize service")?;

    let request = LookupRequest::new(args.query.clone(), args.tconst.clone());
    if request.query.is_empty() {
        info!("No query given, nothing to do");
    }

    let response = service.handle(&request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}
