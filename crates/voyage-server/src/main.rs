//! Voyage Server CLI
//!
//! Starts the HTTP dialogue service.

use std::env;
use std::process;
use std::sync::Arc;
use tracing::warn;
use voyage_server::{build_service, config::ServiceConfig, init_tracing, start_server, ServerError};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ServerError> {
    init_tracing();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServiceConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        warn!("No config file specified, using defaults");
        ServiceConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;

    // Blocking HTTP clients are built before the runtime starts
    let service = Arc::new(build_service(&config)?);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ServerError::Setup(format!("Failed to start runtime: {}", e)))?;
    runtime.block_on(start_server(&config, service))
}

fn print_help() {
    println!("Voyage Server - conversational travel planner");
    println!();
    println!("USAGE:");
    println!("    voyage-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    MISTRAL_API_KEY      LLM API key");
    println!("    MISTRAL_API_URL      LLM chat completions endpoint");
    println!("    MISTRAL_MODEL_NAME   LLM model");
    println!("    YANDEX_API_KEY       Transit API key");
    println!("    RUST_LOG             Log filter (default: info)");
    println!();
}
