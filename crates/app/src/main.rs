mod chat;
mod config;

use anyhow::{Context, Result};
use chat::{ChatSession, TurnOutcome};
use providers::{Pacing, ProviderRouter};
use services::file_store::{FileEvent, FileStore};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const HELP: &str = "Type a message and press Enter. /files lists project files, /quit exits.";

fn print_files(files: &FileStore) {
    for item in files.all_files() {
        match item.content.as_deref() {
            Some(content) => println!("  {:<28} {:>6} bytes", item.path, content.len()),
            None => println!("  {}/", item.path),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let settings = config::load_from_environment().context("loading settings")?;
    let router = ProviderRouter::new(settings);
    let ingestor = router
        .ingestor(Pacing::typing())
        .context("setting up the HTTP client")?;

    let mut files = FileStore::with_starter_project();
    files.subscribe(|event| {
        if let FileEvent::Created(path) | FileEvent::Updated(path) = event {
            eprintln!("  📄 {}", path);
        }
    });
    let mut session = ChatSession::new(ingestor, files);

    println!("Vibe Coder ({})", router.active_provider());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/files" => {
                print_files(session.files());
                continue;
            }
            "/help" => {
                println!("{}", HELP);
                continue;
            }
            _ => {}
        }

        let outcome = session
            .send(&line, |delta| {
                print!("{}", delta);
                std::io::stdout().flush().ok();
            })
            .await;

        match outcome {
            TurnOutcome::Ignored => {}
            TurnOutcome::Completed { created_files } => {
                println!();
                if !created_files.is_empty() {
                    println!("\n{} file(s) written to the project.", created_files.len());
                }
            }
            TurnOutcome::Failed => {
                if let Some(last) = session.conversation().last() {
                    println!("{}", last.content);
                }
            }
        }
    }

    Ok(())
}
