//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use yamdb_common::AppResult;
use yamdb_core::{SignupInput, SignupOutput, TokenInput, TokenOutput};

use crate::middleware::AppState;

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/token", post(token))
}

/// Register a user and dispatch a confirmation code.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> AppResult<Json<SignupOutput>> {
    let output = state.auth_service.signup(input).await?;
    Ok(Json(output))
}

/// Exchange a confirmation code for an access token.
async fn token(
    State(state): State<AppState>,
    Json(input): Json<TokenInput>,
) -> AppResult<Json<TokenOutput>> {
    let output = state.auth_service.issue_token(input).await?;
    Ok(Json(output))
}
