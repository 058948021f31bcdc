pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod logs;
pub mod models;
pub mod rate_limit;
pub mod server;
pub mod telegram;

use agent::{ HandlerMode, RelayAgent };
use cli::Args;
use history::{ InMemoryConversationStore, TrimPolicy };
use llm::{ LlmConfig, LlmType };
use logs::LogBuffer;
use log::{ error, info };
use rate_limit::ChatRateLimiter;
use server::{ RootRoute, Server };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use telegram::TelegramClient;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let llm_type: LlmType = args.chat_llm_type.parse()?;
    let trim_policy: TrimPolicy = args.history_trim.parse()?;
    let root_route: RootRoute = args.root_route.parse()?;
    let mode = HandlerMode::parse(&args.handler_mode, &args.command_prefix)?;
    if !args.rate_limit_delay.is_finite() || args.rate_limit_delay < 0.0 {
        return Err(format!("Invalid rate limit delay: {}", args.rate_limit_delay).into());
    }

    info!("--- Core Configuration ---");
    info!("Chat LLM Type: {}", llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Temperature: {}", args.temperature);
    info!("Completion Timeout: {}s", args.completion_timeout);
    info!("History Limit: {} ({})", args.history_limit, trim_policy);
    info!("Rate Limit Delay: {}s", args.rate_limit_delay);
    info!("Handler Mode: {:?}", mode);
    info!("HTTP Port: {} (root → {:?})", args.port, root_route);
    info!("-------------------------");

    let chat_config = LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        temperature: args.temperature,
        timeout: Duration::from_secs(args.completion_timeout),
    };
    let chat_client = llm::chat::new_client(&chat_config)?;

    let system_prompt = config::prompt::load_system_prompt(args.system_prompt_path.as_deref())?;
    let store = Arc::new(InMemoryConversationStore::new(system_prompt, args.history_limit, trim_policy));
    let limiter = Arc::new(ChatRateLimiter::new(Duration::from_secs_f64(args.rate_limit_delay)));
    let journal = Arc::new(LogBuffer::default());
    let bot_api = Arc::new(
        TelegramClient::new(&args.telegram_base_url, &args.telegram_token, args.poll_timeout)?
    );

    let agent = Arc::new(
        RelayAgent::new(store, limiter, chat_client, bot_api.clone(), journal.clone(), mode)
    );

    let server = Server::new(args.port, root_route, journal, args.logs_rate_limit);
    let http_task = server.start().await?;
    let polling_task = tokio::spawn(telegram::run_polling(bot_api, agent));

    tokio::select! {
        result = polling_task => {
            match result {
                Ok(Ok(())) => info!("Polling stopped"),
                Ok(Err(e)) => {
                    error!("Polling stopped: {}", e);
                    return Err(Box::new(e));
                }
                Err(e) => return Err(Box::new(e)),
            }
        }
        result = http_task => {
            result?;
            return Err("HTTP server stopped unexpectedly".into());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
