use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ non_empty_reply, with_timeout, ChatClient, CompletionResponse };
use crate::error::BotError;
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    temperature: f32,
    timeout: Duration,
}

#[derive(Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: Option<String>,
}

#[derive(Serialize)]
struct GroqRequest {
    messages: Vec<GroqMessage>,
    model: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}

impl GroqChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        temperature: f32,
        timeout: Duration
    ) -> Result<Self, BotError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| BotError::Config(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
            temperature,
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, BotError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BotError::Config("Groq API key is required".to_string()))?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.temperature,
            config.timeout,
        )
    }

    async fn request(&self, history: &[ChatMessage]) -> Result<CompletionResponse, BotError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let messages = history
            .iter()
            .map(|m| GroqMessage {
                role: m.role.as_str().to_string(),
                content: Some(m.content.clone()),
            })
            .collect();

        let req = GroqRequest {
            messages,
            model: self.model.clone(),
            temperature: self.temperature,
        };

        debug!("Groq request to {} with {} messages", url, history.len());
        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await
            .map_err(|e| BotError::Completion(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Completion(format!("Error code: {} - {}", status.as_u16(), body)));
        }

        let parsed = resp
            .json::<GroqResponse>().await
            .map_err(|e| BotError::Completion(format!("Malformed Groq response: {}", e)))?;

        let choice = parsed.choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::Completion("No response from Groq API".to_string()))?;
        let content = non_empty_reply(choice.message.content, "Groq")?;

        Ok(CompletionResponse { response: content })
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(&self, history: &[ChatMessage]) -> Result<CompletionResponse, BotError> {
        info!("GroqChatClient::complete() → model={} messages={}", self.model, history.len());
        with_timeout(self.timeout, self.request(history)).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{ routing::post, Json, Router, http::StatusCode, extract::State };
    use serde_json::{ json, Value };
    use std::sync::{ Arc, Mutex };

    #[derive(Clone)]
    struct Fake {
        status: StatusCode,
        body: Value,
        seen: Arc<Mutex<Option<Value>>>,
    }

    async fn completions(State(fake): State<Fake>, Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
        *fake.seen.lock().unwrap() = Some(payload);
        (fake.status, Json(fake.body.clone()))
    }

    async fn spawn_fake(status: StatusCode, body: Value) -> (String, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route("/openai/v1/chat/completions", post(completions))
            .with_state(Fake { status, body, seen: seen.clone() });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/openai/v1", addr), seen)
    }

    fn client(base_url: String) -> GroqChatClient {
        GroqChatClient::new(
            "test-key".to_string(),
            None,
            Some(base_url),
            0.7,
            Duration::from_secs(5)
        ).unwrap()
    }

    fn history() -> Vec<ChatMessage> {
        vec![ChatMessage::system("persona"), ChatMessage::user("Hello")]
    }

    #[tokio::test]
    async fn returns_first_choice_and_sends_history() {
        let (url, seen) = spawn_fake(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "Good day."}}]})
        ).await;

        let resp = client(url).complete(&history()).await.unwrap();
        assert_eq!(resp.response, "Good day.");

        let payload = seen.lock().unwrap().clone().unwrap();
        assert_eq!(payload["model"], DEFAULT_MODEL);
        assert!((payload["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "Hello");
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let (url, _) = spawn_fake(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "quota exceeded"}})
        ).await;

        match client(url).complete(&history()).await {
            Err(BotError::Completion(message)) => {
                assert!(message.starts_with("Error code: 429"));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let (url, _) = spawn_fake(StatusCode::OK, json!({"choices": []})).await;
        let err = client(url).complete(&history()).await.unwrap_err();
        assert_eq!(err, BotError::Completion("No response from Groq API".to_string()));
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let (url, _) = spawn_fake(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": ""}}]})
        ).await;
        let err = client(url).complete(&history()).await.unwrap_err();
        assert_eq!(err, BotError::Completion("Empty response from Groq API".to_string()));
    }

    #[tokio::test]
    async fn null_content_is_an_error() {
        let (url, _) = spawn_fake(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]})
        ).await;
        let err = client(url).complete(&history()).await.unwrap_err();
        assert_eq!(err, BotError::Completion("Empty response from Groq API".to_string()));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let err = client("http://127.0.0.1:9".to_string()).complete(&history()).await.unwrap_err();
        assert!(matches!(err, BotError::Completion(_)));
    }
}
