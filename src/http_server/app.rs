use std::num::NonZeroU64;
use std::sync::Arc;

use axum::{Router, routing::get};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
#[cfg(not(debug_assertions))]
use tower_http::cors::Any;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    database::Database,
    http_server::{http_routes::movies, state::AppState},
};

pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub database: Database,
    pub page_size: NonZeroU64,
}

async fn health() -> &'static str {
    "ok"
}

/// Every catalog route only answers GET; axum's method router turns
/// anything else into 405.
pub fn router(app_state: Arc<AppState>) -> Router {
    #[cfg(debug_assertions)]
    let cors_layer = CorsLayer::permissive();

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET]);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/movies", get(movies::list_movies))
        .route("/api/v1/movies/", get(movies::list_movies))
        .route("/api/v1/movies/{movie_id}", get(movies::movie_detail))
        .route("/api/v1/movies/{movie_id}/", get(movies::movie_detail))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState {
        db: Arc::new(config.database),
        page_size: config.page_size,
    });

    let app = router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| eyre!("Failed to bind to {}", addr))?;
    log::info!("Serving movie catalog on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    log::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use sea_orm::ConnectionTrait;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::entities::person_film_work::PersonRole;
    use crate::test_utils::{CatalogFixture, test_db};

    fn app(db: Arc<Database>) -> Router {
        router(Arc::new(AppState {
            db,
            page_size: NonZeroU64::new(50).unwrap(),
        }))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Option<Value>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn test_health() {
        let db = test_db().await;
        let response = app(db)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_empty_catalog() {
        let db = test_db().await;
        let (status, body) = send(app(db), Method::GET, "/api/v1/movies/").await;

        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["count"], 0);
        assert_eq!(body["total_pages"], 0);
        assert_eq!(body["prev"], Value::Null);
        assert_eq!(body["next"], Value::Null);
        assert_eq!(body["results"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_list_page_navigation() {
        let db = test_db().await;
        let fixture = CatalogFixture::new(&db);
        for i in 0..120 {
            fixture.film(&format!("Film {i:03}")).await;
        }

        let (status, body) = send(app(db.clone()), Method::GET, "/api/v1/movies/?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["count"], 120);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["prev"], Value::Null);
        assert_eq!(body["next"], 2);
        assert_eq!(body["results"].as_array().unwrap().len(), 50);

        let (status, body) = send(app(db.clone()), Method::GET, "/api/v1/movies/?page=last").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["prev"], 2);
        assert_eq!(body["next"], Value::Null);
        assert_eq!(body["results"].as_array().unwrap().len(), 20);

        let (status, _) = send(app(db), Method::GET, "/api/v1/movies/?page=4").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_page() {
        let db = test_db().await;
        for uri in ["/api/v1/movies/?page=abc", "/api/v1/movies/?page=0"] {
            let (status, body) = send(app(db.clone()), Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body.unwrap()["error"]["status"], 400);
        }
    }

    #[tokio::test]
    async fn test_list_empty_page_param_is_first_page() {
        let db = test_db().await;
        let fixture = CatalogFixture::new(&db);
        fixture.film("Andrei Rublev").await;

        let (status, body) = send(app(db), Method::GET, "/api/v1/movies/?page=").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["prev"], Value::Null);
        assert_eq!(body["results"][0]["title"], "Andrei Rublev");
    }

    #[tokio::test]
    async fn test_list_malformed_query_is_json_bad_request() {
        let db = test_db().await;
        let (status, body) = send(app(db), Method::GET, "/api/v1/movies/?page=1&page=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body.expect("error body should be JSON");
        assert_eq!(body["error"]["status"], 400);
    }

    #[tokio::test]
    async fn test_unknown_type_is_served() {
        let db = test_db().await;
        let id = uuid::Uuid::new_v4();
        db.conn
            .execute_raw(sea_orm::Statement::from_sql_and_values(
                sea_orm::DbBackend::Sqlite,
                "INSERT INTO film_work (id, title, type) VALUES (?, ?, ?)",
                [id.into(), "Voices of Time".into(), "documentary".into()],
            ))
            .await
            .unwrap();

        let (status, body) = send(app(db.clone()), Method::GET, "/api/v1/movies/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["results"][0]["type"], "documentary");

        let uri = format!("/api/v1/movies/{id}");
        let (status, body) = send(app(db), Method::GET, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["type"], "documentary");
    }

    #[tokio::test]
    async fn test_detail_has_exactly_the_film_fields() {
        let db = test_db().await;
        let fixture = CatalogFixture::new(&db);
        let film = fixture.film("The Sacrifice").await;
        let director = fixture.person("Andrei Tarkovsky").await;
        fixture.credit(&film, &director, PersonRole::Director).await;

        let uri = format!("/api/v1/movies/{}", film.id);
        let (status, body) = send(app(db), Method::GET, &uri).await;

        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        let mut keys: Vec<&str> = body
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "actors",
                "creation_date",
                "description",
                "directors",
                "genres",
                "id",
                "rating",
                "title",
                "type",
                "writers",
            ]
        );
        assert_eq!(body["id"], film.id.to_string());
        assert_eq!(body["directors"], serde_json::json!(["Andrei Tarkovsky"]));
        assert_eq!(body["actors"], serde_json::json!(["no data"]));
    }

    #[tokio::test]
    async fn test_detail_trailing_slash() {
        let db = test_db().await;
        let fixture = CatalogFixture::new(&db);
        let film = fixture.film("Solaris").await;

        let uri = format!("/api/v1/movies/{}/", film.id);
        let (status, body) = send(app(db), Method::GET, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["title"], "Solaris");
    }

    #[tokio::test]
    async fn test_detail_unknown_id_not_found() {
        let db = test_db().await;
        let uri = format!("/api/v1/movies/{}", uuid::Uuid::new_v4());
        let (status, body) = send(app(db.clone()), Method::GET, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.unwrap()["error"]["status"], 404);

        let (status, _) = send(app(db), Method::GET, "/api/v1/movies/not-a-uuid").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_get_is_allowed() {
        let db = test_db().await;
        let film_uri = format!("/api/v1/movies/{}", uuid::Uuid::new_v4());

        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            for uri in ["/api/v1/movies/", film_uri.as_str()] {
                let (status, _) = send(app(db.clone()), method.clone(), uri).await;
                assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            }
        }
    }
}
