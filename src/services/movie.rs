use std::num::NonZeroU64;
use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::PaginatorTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::entities::film_work::FilmWorkType;
use crate::http_server::error::{ApiError, ApiResult};
use crate::http_server::query_builder::{
    FilmWorkRow, PageNumber, PageWindow, apply_page_window, build_movie_query, find_movie_query,
};

/// A film work as served by the API, with related names flattened in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub kind: FilmWorkType,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub writers: Vec<String>,
}

fn decode_names(
    column: &'static str,
    film_work_id: Uuid,
    raw: &str,
) -> Result<Vec<String>, ApiError> {
    let mut names: Vec<String> =
        serde_json::from_str(raw).map_err(|source| ApiError::Decode {
            column,
            film_work_id,
            source,
        })?;
    // Aggregates give no ordering guarantee
    names.sort();
    names.dedup();
    Ok(names)
}

impl TryFrom<FilmWorkRow> for Movie {
    type Error = ApiError;

    fn try_from(row: FilmWorkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            genres: decode_names("genres", row.id, &row.genres)?,
            actors: decode_names("actors", row.id, &row.actors)?,
            directors: decode_names("directors", row.id, &row.directors)?,
            writers: decode_names("writers", row.id, &row.writers)?,
            id: row.id,
            title: row.title,
            description: row.description,
            creation_date: row.creation_date,
            rating: row.rating,
            kind: row.kind,
        })
    }
}

#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

pub struct MovieService {
    db: Arc<Database>,
    page_size: NonZeroU64,
}

impl MovieService {
    pub fn new(db: Arc<Database>, page_size: NonZeroU64) -> Self {
        Self { db, page_size }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_movies(&self, page: PageNumber) -> ApiResult<PaginatedResult<Movie>> {
        let query = build_movie_query(self.db.backend());

        let total_count = query.clone().count(&self.db.conn).await?;
        let window = PageWindow::resolve(total_count, self.page_size, page)?;

        log::debug!(
            "Listing movies page {} of {} ({} total)",
            window.number,
            window.total_pages,
            window.total_count
        );

        let rows = apply_page_window(query, &window)
            .into_model::<FilmWorkRow>()
            .all(&self.db.conn)
            .await?;

        let items = rows
            .into_iter()
            .map(Movie::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult { items, window })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_movie(&self, id: Uuid) -> ApiResult<Movie> {
        let row = find_movie_query(self.db.backend(), id)
            .into_model::<FilmWorkRow>()
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Movie not found: {id}")))?;

        Movie::try_from(row)
    }
}
