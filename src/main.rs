mod analyzer;
mod config;
mod llm;
mod prompt;
mod session;
mod table;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use analyzer::Analyzer;
use config::{Cli, LlmConfig};
use llm::LlmClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env before clap so `.env` values feed the `env = ...` flags.
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let llm_config = LlmConfig::from_cli(&cli);

    println!("=== Table Data Analyzer ===");

    let table = match table::load(&cli.data_file) {
        Ok(table) => table,
        Err(e) => {
            println!("\nFailed to load table data: {}", e);
            std::process::exit(1);
        }
    };
    println!("\nData loaded successfully from {}", cli.data_file.display());
    println!("Available columns: {}", table.headers().join(", "));

    if llm_config.api_key.is_none() {
        warn!("no API key set (LLM_API_KEY or GROQ_API_KEY); requests will be unauthenticated");
    }
    let client = LlmClient::new(&llm_config)?;
    info!(base_url = %llm_config.base_url, model = %llm_config.model, "LLM client initialized");

    let analyzer = Analyzer::new(client, table, &llm_config);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    session::run(&analyzer, stdin, &mut stdout).await
}
