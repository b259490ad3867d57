use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use worldgraph::config::StoreConfig;
use worldgraph::loader::neo4j::Neo4jStore;
use worldgraph::{pipeline, source};

/// WorldGraph - load World Bank open data into a Neo4j property graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of raw JSON files (one file = one record batch)
    #[arg(long, default_value = "output")]
    input_dir: PathBuf,

    /// Directory for derived CSV files (created if absent)
    #[arg(long, default_value = "csv_output")]
    csv_dir: PathBuf,

    /// Fetch fresh JSON from the World Bank APIs before converting
    #[arg(long)]
    fetch: bool,

    /// Convert only: skip the graph load stage
    #[arg(long)]
    skip_load: bool,

    /// Connect to the graph store, run a smoke query, and exit
    #[arg(long)]
    check_connection: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to INFO level; override with the RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    println!("\nWorldGraph v{}\n", env!("CARGO_PKG_VERSION"));

    if cli.check_connection {
        return check_connection().await;
    }

    if cli.fetch {
        let sources = source::default_sources();
        match source::fetch_all(&sources, &cli.input_dir).await {
            Ok(written) => println!("Fetched: {}", written.join(", ")),
            Err(e) => {
                eprintln!("Fetch failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let converted = match pipeline::convert_directory(&cli.input_dir, &cli.csv_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Conversion failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Converted {} file(s) to {}", converted.len(), cli.csv_dir.display());

    if cli.skip_load {
        return ExitCode::SUCCESS;
    }

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let store = match Neo4jStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to connect to graph store: {e}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::load_converted(&store, &converted).await {
        Ok(reports) => {
            let loaded: usize = reports.iter().map(|r| r.rows_loaded).sum();
            let skipped: usize = reports.iter().map(|r| r.rows_skipped).sum();
            println!("Data loading completed: {loaded} rows loaded, {skipped} skipped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Load failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn check_connection() -> ExitCode {
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Connecting to: {}", config.uri);
    match Neo4jStore::connect(&config).await {
        Ok(_) => {
            println!("Successfully connected");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Connection failed: {e}");
            ExitCode::FAILURE
        }
    }
}
