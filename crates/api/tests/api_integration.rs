//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;
use yamdb_api::{middleware::AppState, router as api_router};
use yamdb_common::config::{AuthConfig, Config, DatabaseConfig, ServerConfig};
use yamdb_core::{
    AuthService, CategoryService, CommentService, GenreService, MailService, ReviewService,
    TitleService, UserService,
};
use yamdb_db::entities::{category, title, user};
use yamdb_db::repositories::{
    CategoryRepository, CommentRepository, GenreRepository, ReviewRepository, TitleRepository,
    UserRepository,
};

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_minutes: 60,
        },
        mail: None,
    }
}

/// Create test app state over a mock database.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let config = create_test_config();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let genre_repo = GenreRepository::new(Arc::clone(&db));
    let title_repo = TitleRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));

    let mail_service = MailService::new(&config).unwrap();
    let auth_service = AuthService::new(user_repo.clone(), mail_service, &config);
    let user_service = UserService::new(user_repo.clone());
    let category_service = CategoryService::new(category_repo.clone());
    let genre_service = GenreService::new(genre_repo.clone());
    let title_service = TitleService::new(
        title_repo.clone(),
        category_repo,
        genre_repo,
        review_repo.clone(),
    );
    let review_service = ReviewService::new(
        review_repo.clone(),
        title_repo.clone(),
        user_repo.clone(),
    );
    let comment_service = CommentService::new(comment_repo, review_repo, title_repo, user_repo);

    AppState {
        auth_service,
        user_service,
        category_service,
        genre_service,
        title_service,
        review_service,
        comment_service,
    }
}

/// Create a test router over a mock database.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            yamdb_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn empty_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn test_list_categories_returns_slugs() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[category::Model {
            id: 1,
            name: "Films".to_string(),
            slug: "films".to_string(),
        }]])
        .into_connection();

    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed[0]["slug"], "films");
    assert!(parsed[0].get("id").is_none());
}

#[tokio::test]
async fn test_create_category_anonymous_is_unauthorized() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"name": "Films", "slug": "films"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_titles_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<title::Model>::new()])
        .into_connection();

    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/titles?year=1990&genre=scifi")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[tokio::test]
async fn test_signup_with_invalid_username_is_rejected() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username": "bad name!", "email": "a@b.example"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_signup_reserved_username_is_rejected() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"username": "me", "email": "a@b.example"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/token")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username": "ghost", "confirmation_code": "A1B2C3"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_list_anonymous_is_unauthorized() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_anonymous_is_unauthorized() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_bearer_token_is_treated_as_anonymous() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .method("GET")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
