use crate::error::BotError;
use crate::logs::LogBuffer;
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use axum::{
    routing::get,
    Router,
    extract::State,
    response::{ Html, IntoResponse, Response },
    http::StatusCode,
};
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use tokio::task::JoinHandle;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error, warn };

pub const HEALTH_GREETING: &str = "Herald is at your service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootRoute {
    Health,
    Logs,
}

impl FromStr for RootRoute {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health" => Ok(RootRoute::Health),
            "logs" => Ok(RootRoute::Logs),
            _ => Err(BotError::Config(format!("Unsupported root route: {}", s))),
        }
    }
}

type LogsLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct AppState {
    journal: Arc<LogBuffer>,
    logs_limiter: Arc<LogsLimiter>,
}

impl AppState {
    pub fn new(journal: Arc<LogBuffer>, logs_per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(logs_per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            journal,
            logs_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

pub fn router(state: AppState, root: RootRoute) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let root_route = match root {
        RootRoute::Health => get(health_handler),
        RootRoute::Logs => get(logs_handler),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/logs", get(logs_handler))
        .route("/", root_route)
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    port: u16,
    state: AppState,
    root: RootRoute
) -> Result<JoinHandle<()>, Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", port).parse::<SocketAddr>()?;
    info!("Starting health check server on: http://{}", addr);

    let listener = tokio::net::TcpListener
        ::bind(addr).await
        .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;

    let app = router(state, root);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("Health check server running on port {}", port);
    Ok(handle)
}

async fn health_handler() -> &'static str {
    HEALTH_GREETING
}

async fn logs_handler(State(state): State<AppState>) -> Response {
    if state.logs_limiter.check().is_err() {
        warn!("Log viewer throttled");
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }
    Html(state.journal.render()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{ to_bytes, Body };
    use axum::http::{ header, Request };
    use tower::ServiceExt;

    async fn fetch(app: Router, path: &str) -> (StatusCode, Option<String>, String) {
        let resp = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap()).await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    fn app(journal: Arc<LogBuffer>, root: RootRoute, rps: u32) -> Router {
        router(AppState::new(journal, rps), root)
    }

    #[tokio::test]
    async fn health_returns_greeting() {
        let (status, content_type, body) = fetch(
            app(Arc::new(LogBuffer::default()), RootRoute::Health, 10),
            "/health"
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert_eq!(body, HEALTH_GREETING);
    }

    #[tokio::test]
    async fn logs_page_lists_escaped_entries() {
        let journal = Arc::new(LogBuffer::default());
        journal.push("[42] damian: Hello");
        journal.push("[42] eve: <script>alert(1)</script>");

        let (status, content_type, body) = fetch(app(journal, RootRoute::Health, 10), "/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("content=\"3\""));
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
        assert!(body.find("eve").unwrap() < body.find("damian").unwrap());
    }

    #[tokio::test]
    async fn root_follows_configuration() {
        let journal = Arc::new(LogBuffer::default());
        let (_, _, body) = fetch(app(journal.clone(), RootRoute::Health, 10), "/").await;
        assert_eq!(body, HEALTH_GREETING);

        let (status, _, body) = fetch(app(journal, RootRoute::Logs, 10), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Herald logs</title>"));
    }

    #[tokio::test]
    async fn logs_are_throttled_but_health_is_not() {
        let router = app(Arc::new(LogBuffer::default()), RootRoute::Health, 1);
        let (first, _, _) = fetch(router.clone(), "/logs").await;
        let (second, _, _) = fetch(router.clone(), "/logs").await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);

        for _ in 0..5 {
            let (status, _, body) = fetch(router.clone(), "/health").await;
            assert_eq!(status, StatusCode::OK);
            assert!(!body.is_empty());
        }
    }

    #[test]
    fn root_route_parsing() {
        assert_eq!("logs".parse::<RootRoute>().unwrap(), RootRoute::Logs);
        assert!("metrics".parse::<RootRoute>().is_err());
    }
}
