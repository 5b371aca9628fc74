use anyhow::{Result, anyhow};
use filmes_dal::movie::{Movie, ReadMovie};
use reqwest::Url;
use serde_json::{Value, json};
use tracing::info;

/// Creates movie and returns it together with its location
pub async fn create_movie(
    client: &reqwest::Client,
    base_url: &Url,
    title: Option<&str>,
    genre: &str,
    duration: i64,
) -> Result<(Movie, Url)> {
    let payload = match title {
        Some(title) => json!({"titulo": title, "genero": genre, "duracao": duration}),
        None => json!({"genero": genre, "duracao": duration}),
    };
    let api_url = base_url.join("movies")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .ok_or_else(|| anyhow!("Missing location header"))?
        .to_str()?
        .parse::<Url>()?;

    let new_movie: Movie = response.json().await?;
    Ok((new_movie, location))
}

pub async fn get_movie(client: &reqwest::Client, url: &Url) -> Result<ReadMovie> {
    let response = client.get(url.clone()).send().await?;
    assert!(response.status().is_success());
    Ok(response.json().await?)
}

pub async fn patch_movie(
    client: &reqwest::Client,
    url: &Url,
    operations: Value,
) -> Result<reqwest::Response> {
    let response = client
        .patch(url.clone())
        .header(reqwest::header::CONTENT_TYPE, "application/json-patch+json")
        .body(serde_json::to_vec(&operations)?)
        .send()
        .await?;
    info!("Patch response: {:#?}", response);
    Ok(response)
}
