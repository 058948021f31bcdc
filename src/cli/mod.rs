use clap::Parser;
use crate::history::DEFAULT_HISTORY_LIMIT;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Telegram Args ---
    /// Bot token issued by @BotFather
    #[arg(long, env = "TELEGRAM_TOKEN")]
    pub telegram_token: String,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_BASE_URL", default_value = "https://api.telegram.org")]
    pub telegram_base_url: String,

    /// Long polling timeout in seconds for getUpdates
    #[arg(long, env = "TELEGRAM_POLL_TIMEOUT", default_value = "30")]
    pub poll_timeout: u64,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (groq, gemini)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., openai/gpt-oss-20b, gemini-2.5-flash)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Base URL for the Chat LLM provider API (groq only; gemini refuses it)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Sampling temperature sent with every completion request
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Seconds to wait for a completion before replying with an error
    #[arg(long, env = "COMPLETION_TIMEOUT", default_value = "60")]
    pub completion_timeout: u64,

    // --- Conversation Args ---
    /// Optional file holding the system prompt. Uses the built-in Herald persona when unset.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    /// Number of messages kept per conversation
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// How history is trimmed past the limit (last, keep-system)
    #[arg(long, env = "HISTORY_TRIM", default_value = "last")]
    pub history_trim: String,

    /// Minimum seconds between accepted messages from one chat
    #[arg(long, env = "RATE_LIMIT_DELAY", default_value = "1.2")]
    pub rate_limit_delay: f64,

    /// Message handling mode (relay, command)
    #[arg(long, env = "HANDLER_MODE", default_value = "relay")]
    pub handler_mode: String,

    /// Leading marker required in command mode
    #[arg(long, env = "COMMAND_PREFIX", default_value = "!")]
    pub command_prefix: String,

    // --- HTTP Server Args ---
    /// Port for the health and log viewer server
    #[arg(long, env = "PORT", default_value = "10000")]
    pub port: u16,

    /// Page served at / (health, logs)
    #[arg(long, env = "ROOT_ROUTE", default_value = "health")]
    pub root_route: String,

    /// Maximum /logs requests per second
    #[arg(long, env = "LOGS_RATE_LIMIT", default_value = "10")]
    pub logs_rate_limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let args = Args::try_parse_from(["herald", "--telegram-token", "t"]).unwrap();
        assert_eq!(args.history_limit, 16);
        assert_eq!(args.chat_llm_type, "groq");
        assert_eq!(args.handler_mode, "relay");
        assert_eq!(args.command_prefix, "!");
        assert!((args.rate_limit_delay - 1.2).abs() < f64::EPSILON);
        assert!((args.temperature - 0.7).abs() < f32::EPSILON);
    }
}
