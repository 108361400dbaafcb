use anyhow::Result;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use classybot_client::render::{HELP, bubble};
use classybot_client::{ChatClient, Command, Speaker};

#[derive(Parser)]
#[command(name = "classybot")]
#[command(version, about = "Chat with ClassyBot from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the ClassyBot API.
    #[arg(long, env = "CLASSYBOT_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Resume an existing conversation instead of starting a new one.
    #[arg(long)]
    session_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let session_id = cli
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let client = ChatClient::new(cli.api_url)?;

    println!("{}", "ClassyBot - Classic Tech support".bold());
    println!("{}", format!("session {session_id} @ {}", client.base_url()).as_str().dimmed());
    println!("{HELP}\n");

    show_history(&client, &session_id).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::History => show_history(&client, &session_id).await,
            Command::Clear => match client.clear(&session_id).await {
                Ok(msg) => println!("{}", msg.as_str().yellow()),
                Err(e) => eprintln!("{}", e.to_string().as_str().red()),
            },
            Command::Say(text) => {
                println!("{}", bubble(Speaker::You, text, Local::now()));
                match client.chat(&session_id, text).await {
                    Ok(reply) => println!("{}", bubble(Speaker::Bot, &reply, Local::now())),
                    Err(e) => eprintln!("{}", e.to_string().as_str().red()),
                }
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Prints the stored conversation; errors are shown, not fatal.
async fn show_history(client: &ChatClient, session_id: &str) {
    match client.messages(session_id).await {
        Ok(messages) if messages.is_empty() => {
            println!("{}", "(no messages yet)".dimmed());
        }
        Ok(messages) => {
            // History carries no timestamps; render at load time.
            let now = Local::now();
            for m in &messages {
                println!("{}", bubble(Speaker::from_sender(&m.sender), &m.message, now));
            }
        }
        Err(e) => eprintln!("{}", e.to_string().as_str().red()),
    }
}
