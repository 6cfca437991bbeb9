//! Interactive session
//!
//! A readline REPL around a [`Session`]: holdings are added and removed
//! one command at a time and `analyze` builds the calendar on demand.

pub mod progress;
pub mod readline;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;

use crate::commands::parse_command;
use crate::dispatcher::{Flow, Session};
use crate::dividends::DividendProvider;

const COMMAND_KEYWORDS: &[&str] = &[
    "add", "remove", "clear", "list", "analyze", "help", "exit", "quit",
];

/// Launch the interactive REPL.
pub async fn launch_interactive<P: DividendProvider>(mut session: Session<P>) -> Result<()> {
    println!("{}", "Divcal - Dividend Calendar".bold());
    println!(
        "Type {} for help, {} to exit\n",
        "help".cyan(),
        "exit".cyan()
    );

    let history_path = session.config().history_path();
    let mut rl = readline::Readline::new(COMMAND_KEYWORDS, history_path)?;

    loop {
        match rl.readline("divcal> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match parse_command(trimmed) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        eprintln!("{} {}", "Parse error:".yellow().bold(), e.message);
                        continue;
                    }
                };

                match session.dispatch(command).await {
                    Ok(Flow::Continue(output)) => print!("{}", output),
                    Ok(Flow::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Err(e) => eprintln!("{} {:#}", "Error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}
