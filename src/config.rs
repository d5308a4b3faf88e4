use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-gateway")]
#[command(about = "Streaming HTTP gateway for OpenAI-style chat completions")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // Upstream OpenAI-compatible API base URL
    #[arg(short, long, default_value = "https://api.openai.com/v1")]
    pub upstream_url: String,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Most recent conversation history entries forwarded upstream
    #[arg(long, default_value_t = 50)]
    pub history_limit: usize,

    // Model used when the request does not name one
    #[arg(long, default_value = "gpt-4.1-mini")]
    pub default_model: String,
}
