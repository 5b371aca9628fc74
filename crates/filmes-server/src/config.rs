use std::path::PathBuf;

use crate::error::Result;
pub use clap::Parser;
use filmes_app::state::AppConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "FILMES_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "FILMES_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "FILMES_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server as visible to clients, used in Location headers"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "FILMES_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/filmes.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "FILMES_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/filmes",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "FILMES_DEFAULT_TAKE",
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of movies listed when take parameter is not given"
    )]
    pub default_take: u32,

    #[arg(
        long,
        env = "FILMES_MAX_TAKE",
        default_value = "1000",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum value of take parameter"
    )]
    pub max_take: u32,

    #[arg(long, env = "FILMES_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("filmes"))
        .unwrap_or_else(|| PathBuf::from("filmes"));

    dir.to_string_lossy().to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/filmes.db", self.data_dir))
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            base_url: config.base_url.clone(),
            default_take: config.default_take,
            max_take: config.max_take,
        }
    }
}
