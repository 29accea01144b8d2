mod handlers;
mod router;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::search::SearchOrchestrator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) orchestrator: Arc<SearchOrchestrator>,
    pub(crate) default_language: String,
}

pub struct ApiServer {
    orchestrator: Arc<SearchOrchestrator>,
    default_language: String,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(
        orchestrator: Arc<SearchOrchestrator>,
        default_language: String,
        host: String,
        port: u16,
    ) -> Self {
        Self {
            orchestrator,
            default_language,
            host,
            port,
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let state = AppState {
            orchestrator: self.orchestrator,
            default_language: self.default_language,
        };
        let app = router::build_api_router(state, self.port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("API Server running at http://{addr}");
        axum::serve(listener, app)
            .await
            .context("API server crashed")?;
        Ok(())
    }
}
