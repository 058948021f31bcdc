pub mod api;

pub use api::RootRoute;

use crate::logs::LogBuffer;
use api::AppState;
use std::error::Error;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct Server {
    port: u16,
    root: RootRoute,
    state: AppState,
}

impl Server {
    pub fn new(port: u16, root: RootRoute, journal: Arc<LogBuffer>, logs_per_second: u32) -> Self {
        Self {
            port,
            root,
            state: AppState::new(journal, logs_per_second),
        }
    }

    /// Binds the listener and serves in a background task.
    pub async fn start(&self) -> Result<JoinHandle<()>, Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.port, self.state.clone(), self.root).await
    }
}
