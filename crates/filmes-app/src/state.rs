use std::sync::Arc;

use filmes_dal::Pool;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner { app_config, pool }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    /// Absolute URL of a resource, relative to configured base URL
    pub fn build_url(&self, relative_url: &str) -> Result<Url, url::ParseError> {
        self.config().base_url.join(relative_url)
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    /// Number of records listed when client does not ask for specific count
    pub default_take: u32,
    pub max_take: u32,
}
