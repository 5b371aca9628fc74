pub mod rest;

use std::{fmt::Display, path::Path, time::Duration};

use anyhow::{Result, anyhow};
use filmes_server::{
    config::{Parser, ServerConfig},
    run::{build_state, run_graceful_with_state},
};
use rand::Rng as _;
use reqwest::Url;
use tempfile::TempDir;
use tracing::{debug, error};

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let base_url = format!("http://localhost:{}", port);
    let args = &[
        "filmes-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    test_config(test_name, &base_dir)
}

/// Starts server in background task and waits until it answers health check.
/// Server runs until the test runtime shuts down.
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    let health_url = args.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = run_graceful_with_state(args, state, std::future::pending()).await {
            error!("Server error: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..100 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => debug!("Server not ready: {}", response.status()),
            Err(e) => debug!("Server not ready: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Err(anyhow!("Server did not start"))
}

pub async fn launch_env(test_name: &str) -> Result<(reqwest::Client, Url, ConfigGuard)> {
    let (args, config_guard) = prepare_env(test_name).await?;
    let base_url = args.base_url.clone();
    spawn_server(args).await?;
    Ok((reqwest::Client::new(), base_url, config_guard))
}

pub fn extend_url(url: &Url, segment: impl Display) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("URL cannot be a base")
        .push(&segment.to_string());
    url
}
