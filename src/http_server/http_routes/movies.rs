use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::http_server::{
    error::{ApiError, ApiResult},
    query_builder::PageNumber,
    response::{MovieListResponse, format_detail_response, format_list_response},
    state::AppState,
};
use crate::services::movie::{Movie, MovieService};

#[derive(Debug, Deserialize)]
pub struct ListMoviesParams {
    // Parsed by hand so malformed values surface as `ApiError::BadRequest`
    page: Option<String>,
}

#[tracing::instrument(skip(app_state))]
pub async fn list_movies(
    State(app_state): State<Arc<AppState>>,
    params: Result<Query<ListMoviesParams>, QueryRejection>,
) -> ApiResult<Json<MovieListResponse>> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    // `?page=` means the first page
    let page = params
        .page
        .as_deref()
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::parse::<PageNumber>)
        .transpose()?
        .unwrap_or_default();

    let service = MovieService::new(app_state.db.clone(), app_state.page_size);
    let result = service.list_movies(page).await?;

    Ok(format_list_response(result))
}

#[tracing::instrument(skip(app_state))]
pub async fn movie_detail(
    State(app_state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<Movie>> {
    // Ids that are not UUIDs cannot match any film work
    let movie_id = Uuid::parse_str(&movie_id)
        .map_err(|_| ApiError::NotFound(format!("Movie not found: {movie_id}")))?;

    let service = MovieService::new(app_state.db.clone(), app_state.page_size);
    let movie = service.get_movie(movie_id).await?;

    Ok(format_detail_response(movie))
}
