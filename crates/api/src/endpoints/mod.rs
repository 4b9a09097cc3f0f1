//! API endpoints.

mod auth;
mod categories;
mod comments;
mod genres;
mod reviews;
mod titles;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
        .nest("/titles/{title_id}/reviews", reviews::router())
        .nest(
            "/titles/{title_id}/reviews/{review_id}/comments",
            comments::router(),
        )
        .nest("/users", users::router())
}
