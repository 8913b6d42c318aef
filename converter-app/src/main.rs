//! # Currency Converter
//!
//! Console binary that wires together all the components:
//! - Load configuration from environment
//! - Build the EVP rate client and the tokio clock
//! - Spawn the conversion engine with a console observer
//! - Feed stdin commands to the engine until `quit` or Ctrl-C

mod config;
mod console;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::{ConsoleCommand, ConsoleView, HELP};
use converter_engine::{ConversionEngine, TokioClock};
use converter_types::CurrencyCode;

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Live currency converter", long_about = None)]
struct Cli {
    /// Amount to convert on startup
    #[arg(long)]
    amount: Option<String>,

    /// Source currency
    #[arg(long, default_value = "USD")]
    from: CurrencyCode,

    /// Target currency
    #[arg(long, default_value = "EUR")]
    to: CurrencyCode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout belongs to the console view
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,converter_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_env()?;

    tracing::info!(
        api_url = %config.api_url,
        refresh = ?config.refresh_interval,
        "Starting currency converter"
    );

    let engine = ConversionEngine::spawn(
        Arc::new(config.client()),
        Arc::new(TokioClock::new()),
        Arc::new(ConsoleView),
        config.engine(),
    );

    engine.set_from(cli.from);
    engine.set_to(cli.to);
    if let Some(amount) = cli.amount.as_deref() {
        engine.set_amount(amount)?;
    }
    engine.start();

    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match ConsoleCommand::parse(&line) {
                    Ok(Some(command)) => {
                        if !console::apply(&engine, command) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => println!("{err:#}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    engine.stop();
    engine.flush().await;
    tracing::info!("Currency converter stopped");
    Ok(())
}
