use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveEnum, ColumnTrait, DbBackend, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QueryResult, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use crate::entities::{
    film_work, genre_film_work,
    person_film_work::{self, PersonRole},
};

pub mod pagination;
pub use pagination::*;

/// Value reported for a role that has nobody attached to the film.
pub const NO_DATA_PLACEHOLDER: &str = "no data";

// ============================================================================
// Aggregate Expressions
// ============================================================================

/// JSON array aggregate for the connection's backend.
///
/// Both produce the array as JSON text so rows decode the same way
/// regardless of where they came from.
fn json_array_agg(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Postgres => "json_agg",
        _ => "json_group_array",
    }
}

/// `CASE WHEN <nothing matched> THEN <default> ELSE <distinct aggregate> END`
///
/// `filter` restricts which joined rows feed the aggregate. SQLite's
/// `json_group_array` yields `[]` rather than NULL on no input, so the
/// default is chosen by counting matches instead of a `COALESCE`.
fn distinct_names_expr(
    backend: DbBackend,
    column: &str,
    filter: &str,
    default: &str,
) -> SimpleExpr {
    let agg = json_array_agg(backend);
    Expr::cust(format!(
        "CASE WHEN COUNT({column}) FILTER (WHERE {filter}) = 0 THEN '{default}' \
         ELSE CAST({agg}(DISTINCT {column}) FILTER (WHERE {filter}) AS TEXT) END"
    ))
}

fn genres_expr(backend: DbBackend) -> SimpleExpr {
    distinct_names_expr(
        backend,
        r#""genre"."name""#,
        r#""genre"."name" IS NOT NULL"#,
        "[]",
    )
}

fn role_expr(backend: DbBackend, role: PersonRole) -> SimpleExpr {
    let default = format!(r#"["{NO_DATA_PLACEHOLDER}"]"#);
    distinct_names_expr(
        backend,
        r#""person"."full_name""#,
        &format!(r#""person_film_work"."role" = '{}'"#, role.to_value()),
        &default,
    )
}

// ============================================================================
// Movie Query
// ============================================================================

/// One film with its genres and people flattened into name lists.
///
/// Lists come back as JSON text; see [`crate::services::movie::Movie`] for
/// the decoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmWorkRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<chrono::NaiveDate>,
    pub rating: Option<f64>,
    pub kind: film_work::FilmWorkType,
    pub genres: String,
    pub actors: String,
    pub directors: String,
    pub writers: String,
}

impl FromQueryResult for FilmWorkRow {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        let kind: String = res.try_get(pre, "type")?;
        Ok(Self {
            id: res.try_get(pre, "id")?,
            title: res.try_get(pre, "title")?,
            description: res.try_get(pre, "description")?,
            creation_date: res.try_get(pre, "creation_date")?,
            rating: res.try_get(pre, "rating")?,
            kind: film_work::FilmWorkType::from(kind),
            genres: res.try_get(pre, "genres")?,
            actors: res.try_get(pre, "actors")?,
            directors: res.try_get(pre, "directors")?,
            writers: res.try_get(pre, "writers")?,
        })
    }
}

/// Build the aggregated film query: one row per film work, ordered by title.
///
/// Nothing is executed here; the returned select can be counted, sliced or
/// filtered before it reaches the database.
pub fn build_movie_query(backend: DbBackend) -> Select<film_work::Entity> {
    film_work::Entity::find()
        .select_only()
        .columns([
            film_work::Column::Id,
            film_work::Column::Title,
            film_work::Column::Description,
            film_work::Column::CreationDate,
            film_work::Column::Rating,
            film_work::Column::Kind,
        ])
        .column_as(genres_expr(backend), "genres")
        .column_as(role_expr(backend, PersonRole::Actor), "actors")
        .column_as(role_expr(backend, PersonRole::Director), "directors")
        .column_as(role_expr(backend, PersonRole::Writer), "writers")
        .join(JoinType::LeftJoin, film_work::Relation::GenreFilmWork.def())
        .join(JoinType::LeftJoin, genre_film_work::Relation::Genre.def())
        .join(JoinType::LeftJoin, film_work::Relation::PersonFilmWork.def())
        .join(JoinType::LeftJoin, person_film_work::Relation::Person.def())
        .group_by(film_work::Column::Id)
        .order_by_asc(film_work::Column::Title)
        .order_by_asc(film_work::Column::Id)
}

/// [`build_movie_query`] narrowed to a single film work.
pub fn find_movie_query(backend: DbBackend, id: Uuid) -> Select<film_work::Entity> {
    build_movie_query(backend).filter(film_work::Column::Id.eq(id))
}

/// Slice a query down to the rows of one page.
pub fn apply_page_window<T: EntityTrait>(query: Select<T>, window: &PageWindow) -> Select<T> {
    query.limit(window.page_size).offset(window.offset())
}

// ============================================================================
// Tests
// ============================================================================
