//! TaxGPT terminal application.
//!
//! A line-oriented chat with the Canadian tax assistant. Replies stream to
//! stdout as they arrive; logs go to stderr.
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p taxgpt
//! cargo run -p taxgpt -- --model gpt-4o-mini --log-format json
//! ```

mod app;
mod render;

use clap::{Parser, ValueEnum};
use std::time::Duration;
use taxgpt_core::{AssistantConfig, ChatSession};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taxgpt", about = "TaxGPT - Canadian Tax Assistant")]
struct Cli {
    /// OpenAI API key (can also be entered later with /key)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model to use for answers
    #[arg(long, env = "TAXGPT_MODEL", default_value_t = AssistantConfig::default().model)]
    model: String,

    /// OpenAI-compatible endpoint root, e.g. http://localhost:11434/v1
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens per answer
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Give up on a request after this many seconds (no limit by default)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl Cli {
    fn assistant_config(&self) -> AssistantConfig {
        let mut config = AssistantConfig::new().with_model(&self.model);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.assistant_config();
    debug!(model = %config.model, base_url = ?config.base_url, "starting session");

    let mut session = ChatSession::new(config);
    if let Some(ref key) = cli.api_key {
        session.set_credential(key.as_str());
    }

    app::run(session).await
}
