//! Voyage CLI - chat with the travel assistant from the terminal.

use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use voyage_cli::repl;
use voyage_cli::{Cli, Command, Config, Formatter};
use voyage_domain::SessionId;
use voyage_server::build_service;
use voyage_server::service::Conversation;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> voyage_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr and stay quiet unless RUST_LOG asks for more
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = Config::load(cli.config.as_deref().map(Path::new))?;
    config.service = config.service.with_env_overrides();
    config
        .service
        .validate()
        .map_err(|e| voyage_cli::CliError::Config(e.to_string()))?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None | Some(Command::Chat) => {
            let service = build_service(&config.service)?;
            repl::run_repl(&service, &formatter, config.settings.history_size)?;
        }
        Some(Command::Ask(args)) => {
            let service = build_service(&config.service)?;
            let reply = service.handle_message(SessionId::new(), &args.text.join(" "));
            println!("{}", formatter.format_reply(&reply)?);
        }
        Some(Command::Config) => {
            let mut shown = config.clone();
            shown.service.llm.api_key = shown.service.llm.api_key.map(|_| "***".to_string());
            shown.service.transit_api_key =
                shown.service.transit_api_key.map(|_| "***".to_string());
            println!("{}", shown.to_toml()?);
        }
    }

    Ok(())
}
