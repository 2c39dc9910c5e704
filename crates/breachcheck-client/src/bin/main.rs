//! Breach lookup CLI

use std::io::BufRead;

use anyhow::{Context, Result};
use breachcheck_client::BreachClient;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "breachcheck")]
#[command(about = "Check emails, phone numbers and passwords against a breach server")]
struct Args {
    /// Server base URL
    #[arg(long, env = "BREACHCHECK_SERVER", default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up an email address (hashed locally)
    Email { address: String },

    /// Look up a phone number (hashed locally)
    Phone { number: String },

    /// Check a password via its digest prefix. Reads stdin when omitted.
    Password { password: Option<String> },

    /// List all breaches
    Breaches,

    /// Load the demo data set into an empty server
    Seed,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_password() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = BreachClient::new(args.server);

    match args.command {
        Command::Email { address } => print_json(&client.search_email(&address).await?)?,
        Command::Phone { number } => print_json(&client.search_phone(&number).await?)?,
        Command::Password { password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let result = client.check_password(&password).await?;
            if result.found {
                println!("Pwned: seen {} times in breach corpora", result.count);
            } else {
                println!("Not found in any known breach");
            }
        }
        Command::Breaches => {
            for breach in client.breaches().await? {
                println!(
                    "{:>4}  {:<20} {:>12}  {}",
                    breach.id, breach.name, breach.pwn_count, breach.breach_date
                );
            }
        }
        Command::Seed => {
            let result = client.initialize_demo().await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}
