use super::config::Config;
use super::settings::ResolvedPollSettings;
use crate::page::document::Page;
use crate::page::theme;
use crate::sync::poll::SharedPage;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Resolve poll settings with command-line overrides
    pub async fn poll_settings(
        &self,
        endpoint: Option<&str>,
        interval_ms: Option<u64>,
    ) -> Result<ResolvedPollSettings> {
        let config = self.config.read().await;
        ResolvedPollSettings::resolve(&config, endpoint, interval_ms)
    }

    /// Wrap a page for sharing with the poll loop, restoring the saved theme
    pub async fn share_page(&self, mut page: Page) -> SharedPage {
        let config = self.config.read().await;
        if let Some(applied) = theme::restore_theme(&mut page, &config) {
            tracing::debug!("Restored saved theme: {}", applied);
        }
        Arc::new(RwLock::new(page))
    }
}
