use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database as SeaDatabase};
use uuid::Uuid;

use crate::database::Database;
use crate::entities::{
    film_work, genre, genre_film_work, person,
    person_film_work::{self, PersonRole},
};

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:?mode=rwc")
        .await
        .unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    let schema = include_str!("../schema.sql");
    for stmt in schema.split(';') {
        // Strip comment-only lines
        let without_comments: String = stmt
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let without_comments = without_comments.trim();
        if !without_comments.is_empty() {
            conn.execute_unprepared(without_comments)
                .await
                .unwrap_or_else(|e| {
                    panic!(
                        "Failed to execute SQL: {}\nStatement: {}",
                        e, without_comments
                    )
                });
        }
    }

    Arc::new(Database { conn })
}

/// Inserts catalog rows the way the ingestion service would.
pub struct CatalogFixture {
    db: Arc<Database>,
}

impl CatalogFixture {
    pub fn new(db: &Arc<Database>) -> Self {
        Self { db: db.clone() }
    }

    pub async fn film(&self, title: &str) -> film_work::Model {
        film_work::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.into()),
            description: Set(Some(format!("About {title}"))),
            creation_date: Set(NaiveDate::from_ymd_opt(1979, 5, 25)),
            rating: Set(Some(8.1)),
            kind: Set(film_work::FilmWorkType::Movie.into()),
        }
        .insert(&self.db.conn)
        .await
        .unwrap()
    }

    pub async fn genre(&self, name: &str) -> genre::Model {
        genre::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.into()),
        }
        .insert(&self.db.conn)
        .await
        .unwrap()
    }

    pub async fn person(&self, full_name: &str) -> person::Model {
        person::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(full_name.into()),
        }
        .insert(&self.db.conn)
        .await
        .unwrap()
    }

    pub async fn tag_genre(&self, film: &film_work::Model, genre: &genre::Model) {
        genre_film_work::ActiveModel {
            id: Set(Uuid::new_v4()),
            film_work_id: Set(film.id),
            genre_id: Set(genre.id),
        }
        .insert(&self.db.conn)
        .await
        .unwrap();
    }

    pub async fn credit(&self, film: &film_work::Model, person: &person::Model, role: PersonRole) {
        person_film_work::ActiveModel {
            id: Set(Uuid::new_v4()),
            film_work_id: Set(film.id),
            person_id: Set(person.id),
            role: Set(role),
        }
        .insert(&self.db.conn)
        .await
        .unwrap();
    }
}
