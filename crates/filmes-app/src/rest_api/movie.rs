use std::convert::Infallible;

use crate::{
    error::{ApiError, ApiResult},
    rest_api::Window,
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    response::IntoResponse,
    routing::get,
    Json,
};
use filmes_dal::{
    mapper,
    movie::{CreateMovie, Movie, MovieRepository, ReadMovie, UpdateMovie},
    patch::{self, MoviePatch, RawOperation},
};
use garde::Validate as _;
use http::{header, request::Parts, StatusCode};
use tracing::{debug, warn};

impl FromRequestParts<AppState> for MovieRepository {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MovieRepository::new(state.pool().clone()))
    }
}

/// Path of movie resource relative to base URL
pub const MOVIES_PATH: &str = "movies";

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        list_movies,
        count_movies,
        get_movie,
        create_movie,
        replace_movie,
        patch_movie,
        delete_movie
    ),
    components(schemas(Movie, ReadMovie, CreateMovie, UpdateMovie, RawOperation))
)]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

// Creating movie without title is allowed, though the stored record then breaks entity rules
fn check_stored(movie: &Movie) {
    if let Err(report) = movie.validate() {
        warn!(id = movie.id, "Stored movie violates entity rules: {report}");
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Movie", operation_id = "listMovies",
    params(Window),
    responses((status = 200, description = "Window of movies in natural order", body = Vec<ReadMovie>),
        (status = 400, description = "Invalid query"))))]
pub async fn list_movies(
    repository: MovieRepository,
    State(state): State<AppState>,
    window: Result<Query<Window>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(window) = window?;
    let config = state.config();
    let params = window.into_listing_params(config.default_take, config.max_take)?;
    let movies = repository.list(params).await?;
    let views: Vec<ReadMovie> = movies.iter().map(mapper::to_read_view).collect();
    Ok((StatusCode::OK, Json(views)))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/count", tag = "Movie", operation_id = "countMovies",
    responses((status = 200, description = "Number of movies", body = u64))))]
pub async fn count_movies(repository: MovieRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/{id}", tag = "Movie", operation_id = "getMovie",
    params(("id" = i64, Path, description = "Movie id")),
    responses((status = 200, description = "Movie", body = ReadMovie),
        (status = 404, description = "Movie not found"))))]
pub async fn get_movie(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let movie = repository.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::OK, Json(mapper::to_read_view(&movie))))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "", tag = "Movie", operation_id = "createMovie",
    request_body = CreateMovie,
    responses((status = 201, description = "Created movie, location header points to it", body = Movie),
        (status = 400, description = "Validation failed"))))]
pub async fn create_movie(
    repository: MovieRepository,
    State(state): State<AppState>,
    payload: Result<Json<CreateMovie>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;

    let movie = repository.create(mapper::to_entity(payload)).await?;
    check_stored(&movie);
    let location = state.build_url(&format!("{MOVIES_PATH}/{}", movie.id))?;
    debug!(id = movie.id, %location, "Created movie");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location.to_string())],
        Json(movie),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/{id}", tag = "Movie", operation_id = "replaceMovie",
    params(("id" = i64, Path, description = "Movie id")),
    request_body = UpdateMovie,
    responses((status = 204, description = "Movie replaced"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Movie not found"))))]
pub async fn replace_movie(
    Path(id): Path<i64>,
    repository: MovieRepository,
    payload: Result<Json<UpdateMovie>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;

    let mut movie = repository.find(id).await?.ok_or(ApiError::NotFound)?;
    mapper::apply_to_entity(payload, &mut movie);
    check_stored(&movie);
    repository.update(&movie).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg_attr(feature = "openapi", utoipa::path(patch, path = "/{id}", tag = "Movie", operation_id = "patchMovie",
    params(("id" = i64, Path, description = "Movie id")),
    request_body(content = Vec<RawOperation>, content_type = "application/json-patch+json"),
    responses((status = 204, description = "Movie patched"),
        (status = 400, description = "Malformed patch or validation failed"),
        (status = 404, description = "Movie not found"))))]
pub async fn patch_movie(
    Path(id): Path<i64>,
    repository: MovieRepository,
    document: Result<Json<Vec<RawOperation>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(document) = document?;

    let movie = repository.find(id).await?.ok_or(ApiError::NotFound)?;
    let movie_patch = MoviePatch::try_from(document)?;
    let patched = patch::patch_movie(&movie, &movie_patch)?;
    check_stored(&patched);
    repository.update(&patched).await?;
    debug!(id, operations = movie_patch.operations().len(), "Patched movie");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/{id}", tag = "Movie", operation_id = "deleteMovie",
    params(("id" = i64, Path, description = "Movie id")),
    responses((status = 204, description = "Movie deleted"),
        (status = 404, description = "Movie not found"))))]
pub async fn delete_movie(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let movie = repository.find(id).await?.ok_or(ApiError::NotFound)?;
    repository.delete(movie.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route("/count", get(count_movies))
        .route(
            "/{id}",
            get(get_movie)
                .put(replace_movie)
                .patch(patch_movie)
                .delete(delete_movie),
        )
}
