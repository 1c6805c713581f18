// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Main entry point for the consent gateway CLI
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use consent_gateway::authority::{HttpConsentAuthority, InMemoryConsentAuthority};
use consent_gateway::config::Config;
use consent_gateway::utils::record_loader::RecordLoader;
use consent_gateway::{ConsentGateway, Scope};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the scope identifier derived from an attribute label
    Scope {
        /// Attribute label, e.g. "credit_score"
        label: String,
    },

    /// Fetch a record through a remote consent authority
    Fetch(FetchArgs),

    /// Walk through register, refused fetch, grant, released fetch
    Demo,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Identity requesting the data
    #[arg(long)]
    requester: String,

    /// Identity the data is about
    #[arg(long)]
    subject: String,

    /// Scope as 0x-prefixed hex
    #[arg(long, conflicts_with = "scope_label", required_unless_present = "scope_label")]
    scope: Option<String>,

    /// Scope derived from an attribute label
    #[arg(long)]
    scope_label: Option<String>,

    /// Path to seed records YAML (overrides RECORDS_YAML_PATH)
    #[arg(long)]
    records: Option<PathBuf>,

    /// Consent authority JSON-RPC URL (overrides CONSENT_AUTHORITY_URL)
    #[arg(long)]
    authority_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    install_panic_hook();

    // A bad value must stop the process, never fall back to defaults
    let mut config = Config::from_env().context("Failed to load configuration")?;

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    match cli.command {
        Command::Scope { label } => {
            println!("{}", Scope::from_label(&label));
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch(args) => {
            if let Some(path) = args.records.clone() {
                config.records_yaml_path = Some(path);
            }
            if let Some(url) = args.authority_url.clone() {
                config.authority_url = Some(url);
            }
            config.validate()?;
            run_fetch(&config, args).await
        }
        Command::Demo => run_demo().await,
    }
}

async fn run_fetch(config: &Config, args: FetchArgs) -> Result<ExitCode> {
    let scope = match (&args.scope, &args.scope_label) {
        (Some(hex), _) => Scope::from_hex(hex)?,
        (None, Some(label)) => Scope::from_label(label),
        (None, None) => anyhow::bail!("one of --scope or --scope-label is required"),
    };

    let authority = HttpConsentAuthority::from_config(config)?;
    let gateway = ConsentGateway::from_config(config, Arc::new(authority))?;

    if let Some(path) = &config.records_yaml_path {
        let loader = RecordLoader::from_file(path)?;
        loader.register_into(&gateway);
    }

    info!("Fetching record through consent gateway");
    match gateway.fetch(args.requester, args.subject, scope).await {
        Ok(payload) => {
            let mut stdout = std::io::stdout();
            stdout
                .write_all(payload.as_bytes())
                .context("Failed to write payload")?;
            stdout.write_all(b"\n")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(refusal) => {
            eprintln!("{}", refusal);
            Ok(ExitCode::from(1))
        }
    }
}

async fn run_demo() -> Result<ExitCode> {
    let borrower = "0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266";
    let lender = "0x70997970C51812DC3A010C7D01B50E0D17DC79C8";
    let scope = Scope::from_label("credit_score");

    let authority = Arc::new(InMemoryConsentAuthority::new());
    let gateway = ConsentGateway::new(authority.clone());

    println!("=== Step 1: Register record ===");
    gateway.register(
        borrower,
        scope,
        "RAW{credit_score:720,income:90000,debt_ratio:0.18}",
    );
    println!("Registered record for subject {} scope {}", borrower, scope);

    println!("\n=== Step 2: Fetch WITHOUT consent ===");
    print_outcome(gateway.fetch(lender, borrower, scope).await);

    println!("\n=== Step 3: Grant consent for 7 days ===");
    let expires_at = authority.grant(borrower, lender, &[scope], chrono::Duration::days(7));
    println!("Consent granted until {}", expires_at.to_rfc3339());

    println!("\n=== Step 4: Fetch WITH consent ===");
    print_outcome(gateway.fetch(lender, borrower, scope).await);

    Ok(ExitCode::SUCCESS)
}

fn print_outcome(outcome: Result<consent_gateway::Payload, consent_gateway::Refusal>) {
    match outcome {
        Ok(payload) => println!(
            "DATA: {}",
            payload.as_str().unwrap_or("<binary payload>")
        ),
        Err(refusal) => println!("DATA: <{}>", refusal),
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(
    config: &Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("consent_gateway=debug,info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}
