use async_trait::async_trait;
use log::{ debug, error, info, warn };
use reqwest::Client as HttpClient;
use serde::{ de::DeserializeOwned, Deserialize, Serialize };
use serde_json::json;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use crate::agent::RelayAgent;
use crate::error::BotError;
use crate::models::chat::OutboundMessage;
use crate::models::telegram::{ ApiResponse, GetUpdatesRequest, SendMessageRequest, Update };

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Outbound side of the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), BotError>;
}

#[derive(Deserialize, Debug, Clone)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

pub struct TelegramClient {
    http: HttpClient,
    api_base: String,
    poll_timeout: u64,
    retry_delay: Duration,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str, poll_timeout: u64) -> Result<Self, BotError> {
        if token.trim().is_empty() {
            return Err(BotError::Config("Telegram bot token is required".to_string()));
        }
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(poll_timeout + 10))
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: format!("{}/bot{}", base_url.trim_end_matches('/'), token),
            poll_timeout,
            retry_delay: POLL_RETRY_DELAY,
        })
    }

    /// Pause after a failed `getUpdates` before polling again.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, BotError>
        where B: Serialize + ?Sized, T: DeserializeOwned
    {
        let url = format!("{}/{}", self.api_base, method);
        let resp = self.http
            .post(&url)
            .json(body)
            .send().await
            .map_err(|e| BotError::Telegram(format!("{} request failed: {}", method, e.without_url())))?;

        let status = resp.status();
        let parsed = resp
            .json::<ApiResponse<T>>().await
            .map_err(|e| {
                BotError::Telegram(format!("{} returned unreadable body (HTTP {}): {}", method, status, e.without_url()))
            })?;

        if !parsed.ok {
            let description = parsed.description.unwrap_or_else(|| format!("HTTP {}", status));
            return Err(BotError::Telegram(format!("{}: {}", method, description)));
        }
        parsed.result.ok_or_else(|| BotError::Telegram(format!("{}: missing result", method)))
    }

    pub async fn get_me(&self) -> Result<BotIdentity, BotError> {
        self.call("getMe", &json!({})).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, BotError> {
        self.call("deleteWebhook", &json!({ "drop_pending_updates": false })).await
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        let req = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
            allowed_updates: vec!["message".to_string(), "business_message".to_string()],
        };
        self.call("getUpdates", &req).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), BotError> {
        let req = SendMessageRequest::from(message);
        self.call::<_, serde_json::Value>("sendMessage", &req).await
            .map(|_| ())
            .map_err(|e| BotError::Delivery(e.to_string()))
    }
}

/// Long-polls Telegram and feeds updates to the agent one at a time, in order.
pub async fn run_polling(client: Arc<TelegramClient>, agent: Arc<RelayAgent>) -> Result<(), BotError> {
    if let Err(e) = client.delete_webhook().await {
        warn!("Could not delete webhook, polling may receive nothing: {}", e);
    }
    let me = client.get_me().await?;
    info!("Bot is running as @{} ({})", me.username.as_deref().unwrap_or("unknown"), me.id);

    let mut offset: i64 = 0;
    loop {
        match client.get_updates(offset).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    debug!("Received {} updates", updates.len());
                }
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(inbound) = update.into_inbound() {
                        agent.handle(inbound, Instant::now()).await;
                    }
                }
            }
            Err(e) => {
                error!("Polling failed: {}. Retrying in {:?}", e, client.retry_delay);
                tokio::time::sleep(client.retry_delay).await;
            }
        }
    }
}
