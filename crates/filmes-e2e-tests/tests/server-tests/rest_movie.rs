use filmes_dal::movie::ReadMovie;
use filmes_e2e_tests::{
    extend_url, launch_env,
    rest::{create_movie, get_movie, patch_movie},
};
use serde_json::{Value, json};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_movie_scenario() {
    let (client, base_url, _config_guard) = launch_env("test_movie_scenario").await.unwrap();

    let (movie, location) = create_movie(&client, &base_url, None, "Drama", 120)
        .await
        .unwrap();
    assert!(movie.id > 0);
    assert_eq!("", movie.title);
    assert_eq!(extend_url(&base_url.join("movies").unwrap(), movie.id), location);

    let read = get_movie(&client, &location).await.unwrap();
    assert_eq!(
        ReadMovie {
            title: "".into(),
            genre: "Drama".into(),
            duration: 120
        },
        read
    );

    // read view does not expose id
    let raw: Value = client
        .get(location.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(raw.get("id").is_none());
    assert_eq!(120, raw["duracao"]);

    let response = patch_movie(
        &client,
        &location,
        json!([{"op": "replace", "path": "/duracao", "value": 500}]),
    )
    .await
    .unwrap();
    assert_eq!(400, response.status().as_u16());
    let problem: Value = response.json().await.unwrap();
    assert!(problem["errors"].get("duracao").is_some());
    assert_eq!(120, get_movie(&client, &location).await.unwrap().duration);

    let response = client.delete(location.clone()).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = client.get(location.clone()).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
#[traced_test]
async fn test_create_validation() {
    let (client, base_url, _config_guard) = launch_env("test_create_validation").await.unwrap();
    let api_url = base_url.join("movies").unwrap();

    for payload in [
        json!({"titulo": "Sem genero", "duracao": 120}),
        json!({"titulo": "Curto", "genero": "Drama", "duracao": 59}),
        json!({"titulo": "Longo", "genero": "Drama", "duracao": 301}),
        json!({"titulo": "Sem duracao", "genero": "Drama"}),
        json!({"titulo": "Vazio", "genero": "", "duracao": 100}),
    ] {
        let response = client.post(api_url.clone()).json(&payload).send().await.unwrap();
        info!("Response: {:#?}", response);
        assert_eq!(400, response.status().as_u16());
        let problem: Value = response.json().await.unwrap();
        assert_eq!(400, problem["status"]);
        assert!(problem["errors"].is_object());
    }

    let response = client
        .post(api_url.clone())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let count: u64 = client
        .get(extend_url(&api_url, "count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(0, count);
}

#[tokio::test]
#[traced_test]
async fn test_list_window() {
    let (client, base_url, _config_guard) = launch_env("test_list_window").await.unwrap();
    let api_url = base_url.join("movies").unwrap();

    let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];
    for (i, name) in names.iter().enumerate() {
        create_movie(&client, &base_url, Some(name), "Drama", 60 + i as i64 * 10)
            .await
            .unwrap();
    }

    let list = async |query: Option<&str>| {
        let mut url = api_url.clone();
        url.set_query(query);
        let response = client.get(url).send().await.unwrap();
        info!("Response: {:#?}", response);
        assert!(response.status().is_success());
        let movies: Vec<ReadMovie> = response.json().await.unwrap();
        movies.into_iter().map(|m| m.title).collect::<Vec<_>>()
    };

    assert_eq!(vec!["B", "C"], list(Some("skip=1&take=2")).await);
    assert_eq!(names[..10].to_vec(), list(None).await);
    assert_eq!(vec!["K", "L"], list(Some("skip=10")).await);
    assert!(list(Some("skip=100")).await.is_empty());
    assert_eq!(vec!["L", "K"], list(Some("take=2&sort=-duracao")).await);

    // take above server maximum is truncated
    assert_eq!(names.to_vec(), list(Some("take=5000")).await);

    for query in ["skip=-1", "take=0", "take=abc", "sort=diretor"] {
        let mut url = api_url.clone();
        url.set_query(Some(query));
        let response = client.get(url).send().await.unwrap();
        assert_eq!(400, response.status().as_u16(), "query {query}");
    }

    let count: u64 = client
        .get(extend_url(&api_url, "count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names.len() as u64, count);
}

#[tokio::test]
#[traced_test]
async fn test_replace() {
    let (client, base_url, _config_guard) = launch_env("test_replace").await.unwrap();

    let (movie, location) = create_movie(&client, &base_url, Some("Pixote"), "Drama", 127)
        .await
        .unwrap();

    let update = json!({"titulo": "Pixote: A Lei do Mais Fraco", "genero": "Crime", "duracao": 128});
    let response = client.put(location.clone()).json(&update).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());
    let read = get_movie(&client, &location).await.unwrap();
    assert_eq!("Pixote: A Lei do Mais Fraco", read.title);
    assert_eq!("Crime", read.genre);
    assert_eq!(128, read.duration);

    let invalid = json!({"titulo": "X", "duracao": 128});
    let response = client.put(location.clone()).json(&invalid).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
    assert_eq!("Crime", get_movie(&client, &location).await.unwrap().genre);

    let missing = extend_url(&base_url.join("movies").unwrap(), movie.id + 1000);
    let response = client.put(missing).json(&update).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
#[traced_test]
async fn test_patch() {
    let (client, base_url, _config_guard) = launch_env("test_patch").await.unwrap();

    let (movie, location) = create_movie(&client, &base_url, Some("O Auto da Compadecida"), "Comedy", 104)
        .await
        .unwrap();

    let response = patch_movie(
        &client,
        &location,
        json!([
            {"op": "test", "path": "/duracao", "value": 104},
            {"op": "replace", "path": "/duracao", "value": 95},
            {"op": "copy", "from": "/genero", "path": "/titulo"}
        ]),
    )
    .await
    .unwrap();
    assert_eq!(204, response.status().as_u16());
    let read = get_movie(&client, &location).await.unwrap();
    assert_eq!(95, read.duration);
    assert_eq!("Comedy", read.title);

    // unknown field
    let response = patch_movie(
        &client,
        &location,
        json!([
            {"op": "replace", "path": "/genero", "value": "Drama"},
            {"op": "replace", "path": "/diretor", "value": "Guel Arraes"}
        ]),
    )
    .await
    .unwrap();
    assert_eq!(400, response.status().as_u16());
    let problem: Value = response.json().await.unwrap();
    assert_eq!("Malformed patch document", problem["title"]);
    assert_eq!("Comedy", get_movie(&client, &location).await.unwrap().genre);

    // value member is required for replace, explicit null is not
    let response = patch_movie(
        &client,
        &location,
        json!([{"op": "replace", "path": "/titulo"}]),
    )
    .await
    .unwrap();
    assert_eq!(400, response.status().as_u16());
    let problem: Value = response.json().await.unwrap();
    assert_eq!("Malformed patch document", problem["title"]);
    assert_eq!("Comedy", get_movie(&client, &location).await.unwrap().title);

    let response = patch_movie(
        &client,
        &location,
        json!([{"op": "replace", "path": "/titulo", "value": null}]),
    )
    .await
    .unwrap();
    assert_eq!(204, response.status().as_u16());
    assert_eq!("", get_movie(&client, &location).await.unwrap().title);

    let response = patch_movie(
        &client,
        &location,
        json!([{"op": "add", "path": "/titulo", "value": "Comedy"}]),
    )
    .await
    .unwrap();
    assert_eq!(204, response.status().as_u16());

    // one invalid change rejects all
    let response = patch_movie(
        &client,
        &location,
        json!([
            {"op": "replace", "path": "/titulo", "value": "Changed"},
            {"op": "remove", "path": "/genero"}
        ]),
    )
    .await
    .unwrap();
    assert_eq!(400, response.status().as_u16());
    let problem: Value = response.json().await.unwrap();
    assert!(problem["errors"].get("genero").is_some());
    assert_eq!("Comedy", get_movie(&client, &location).await.unwrap().title);

    let missing = extend_url(&base_url.join("movies").unwrap(), movie.id + 1000);
    let response = patch_movie(
        &client,
        &missing,
        json!([{"op": "replace", "path": "/duracao", "value": 100}]),
    )
    .await
    .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
#[traced_test]
async fn test_delete_and_ids() {
    let (client, base_url, _config_guard) = launch_env("test_delete_and_ids").await.unwrap();

    let (first, location) = create_movie(&client, &base_url, Some("Carandiru"), "Drama", 145)
        .await
        .unwrap();
    let response = client.delete(location.clone()).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());
    let response = client.delete(location.clone()).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());

    let (second, _) = create_movie(&client, &base_url, Some("Carandiru"), "Drama", 145)
        .await
        .unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
#[traced_test]
async fn test_legacy_path() {
    let (client, base_url, _config_guard) = launch_env("test_legacy_path").await.unwrap();

    let (movie, _) = create_movie(&client, &base_url, Some("Aquarius"), "Drama", 146)
        .await
        .unwrap();

    let url = extend_url(&base_url.join("Filme").unwrap(), movie.id);
    let read = get_movie(&client, &url).await.unwrap();
    assert_eq!("Aquarius", read.title);
}
