//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use yamdb_core::{
    AuthService, CategoryService, CommentService, GenreService, ReviewService, TitleService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Signup and token issuance.
    pub auth_service: AuthService,
    /// User administration.
    pub user_service: UserService,
    /// Categories.
    pub category_service: CategoryService,
    /// Genres.
    pub genre_service: GenreService,
    /// Titles with ratings.
    pub title_service: TitleService,
    /// Reviews.
    pub review_service: ReviewService,
    /// Comments.
    pub comment_service: CommentService,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a user and stores it in request
/// extensions. An invalid or expired token leaves the request
/// anonymous; the permission checks downstream produce the 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.auth_service.authenticate(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
