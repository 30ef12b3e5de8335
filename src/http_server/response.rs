use axum::Json;
use serde::Serialize;

use crate::services::movie::{Movie, PaginatedResult};

/// Paginated envelope returned by the list endpoint.
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub count: u64,
    pub total_pages: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
    pub results: Vec<Movie>,
}

impl From<PaginatedResult<Movie>> for MovieListResponse {
    fn from(page: PaginatedResult<Movie>) -> Self {
        Self {
            count: page.window.total_count,
            total_pages: page.window.total_pages,
            prev: page.window.previous_page_number(),
            next: page.window.next_page_number(),
            results: page.items,
        }
    }
}

pub fn format_list_response(page: PaginatedResult<Movie>) -> Json<MovieListResponse> {
    Json(page.into())
}

/// Detail responses are the film object itself, no envelope.
pub fn format_detail_response(movie: Movie) -> Json<Movie> {
    Json(movie)
}
