use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Kind of film work. The ingestion service owns the set of values, so
/// anything unrecognised is carried through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum FilmWorkType {
    Movie,
    TvShow,
    Other(String),
}

impl FilmWorkType {
    pub fn as_str(&self) -> &str {
        match self {
            FilmWorkType::Movie => "movie",
            FilmWorkType::TvShow => "tv_show",
            FilmWorkType::Other(raw) => raw,
        }
    }
}

impl From<String> for FilmWorkType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "movie" => FilmWorkType::Movie,
            "tv_show" => FilmWorkType::TvShow,
            _ => FilmWorkType::Other(raw),
        }
    }
}

impl From<FilmWorkType> for String {
    fn from(kind: FilmWorkType) -> Self {
        match kind {
            FilmWorkType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "film_work")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<Date>,
    pub rating: Option<f64>,
    /// Raw value; see [`FilmWorkType`]
    #[sea_orm(column_name = "type")]
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::genre_film_work::Entity")]
    GenreFilmWork,
    #[sea_orm(has_many = "super::person_film_work::Entity")]
    PersonFilmWork,
}

impl Related<super::genre_film_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenreFilmWork.def()
    }
}

impl Related<super::person_film_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonFilmWork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
