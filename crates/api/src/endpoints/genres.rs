//! Genre endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use yamdb_common::AppResult;
use yamdb_core::{CreateGenreInput, Permission, SlugRef};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{clamp_limit, created, no_content},
};

/// Create the genres router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// List genres.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<SlugRef>>> {
    let genres = state
        .genre_service
        .list(
            query.search.as_deref(),
            clamp_limit(query.limit),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(genres.into_iter().map(SlugRef::from).collect()))
}

/// Create a genre (admin only).
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(input): Json<CreateGenreInput>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrReadOnly.check("POST", user.as_ref(), None)?;

    let genre = state.genre_service.create(input).await?;
    Ok(created(SlugRef::from(genre)))
}

/// Delete a genre by slug (admin only).
async fn remove(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrReadOnly.check("DELETE", user.as_ref(), None)?;

    state.genre_service.delete(&slug).await?;
    Ok(no_content())
}
