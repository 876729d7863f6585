use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Low temperature keeps answers close to the table contents.
pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 1024;

/// Ask natural-language questions about a JSON table
#[derive(Debug, Parser)]
#[command(name = "table-analyst", version)]
pub struct Cli {
    /// JSON file with `headers` and `rows`
    #[arg(env = "DATA_FILE", default_value = "data.json")]
    pub data_file: PathBuf,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model identifier sent with every request
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long, env = "LLM_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Settings for the completion endpoint, resolved once at startup.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            base_url: cli.base_url.clone(),
            model: cli.model.clone(),
            api_key: api_key_from_env(),
            timeout: cli.timeout_secs.map(Duration::from_secs),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

fn api_key_from_env() -> Option<String> {
    ["LLM_API_KEY", "GROQ_API_KEY"]
        .iter()
        .filter_map(|name| dotenv::var(name).ok())
        .find(|k| !k.trim().is_empty())
}
