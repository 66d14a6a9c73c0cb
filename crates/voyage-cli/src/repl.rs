//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};
use std::path::PathBuf;
use voyage_domain::SessionId;
use voyage_server::service::Conversation;

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    NewTrip,
    Say(String),
}

/// Run the interactive REPL.
pub fn run_repl(
    conversation: &dyn Conversation,
    formatter: &Formatter,
    history_size: usize,
) -> Result<()> {
    println!(
        "{}",
        formatter.info("Voyage - Describe your trip, type 'help' for commands, 'exit' to quit")
    );
    println!();

    // Initialize readline editor
    let editor_config = EditorConfig::builder()
        .max_history_size(history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config).map_err(|e| {
        CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e)))
    })?;

    // Load history
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut session = SessionId::new();

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => print_help(formatter),
                    ReplCommand::NewTrip => {
                        session = SessionId::new();
                        println!("{}", formatter.success("Started a new trip"));
                    }
                    ReplCommand::Say(text) => {
                        let reply = conversation.handle_message(session, &text);
                        match formatter.format_reply(&reply) {
                            Ok(output) => println!("{}", output),
                            Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                        }
                        if reply.is_schedule() {
                            let hint = "Describe another trip, or type 'exit' to quit";
                            println!("{}", formatter.info(hint));
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    // Save history
    editor.save_history(&history_path).ok();

    Ok(())
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> ReplCommand {
    match line.trim().to_lowercase().as_str() {
        "exit" | "quit" | "q" => ReplCommand::Exit,
        "help" | "?" => ReplCommand::Help,
        "new" | "reset" => ReplCommand::NewTrip,
        _ => ReplCommand::Say(line.trim().to_string()),
    }
}

fn get_history_path() -> Result<PathBuf> {
    let voyage_dir = Config::dir()?;
    std::fs::create_dir_all(&voyage_dir)?;
    Ok(voyage_dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <any text>       - Tell the assistant about your trip");
    println!("                     e.g. 'from Moscow to Kazan via Samara on 01.05.2025 by train'");
    println!("  new, reset       - Forget the current trip and start over");
    println!("  help, ?          - Show this help");
    println!("  exit, quit, q    - Exit REPL");
    println!();
}
