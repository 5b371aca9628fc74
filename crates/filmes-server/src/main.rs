use filmes_server::{config::ServerConfig, run::run, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "filmes_server=info,filmes_app=info,filmes_dal=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerConfig::load()?;
    run(args).await
}
