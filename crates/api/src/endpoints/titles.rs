//! Title endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use yamdb_common::AppResult;
use yamdb_core::{CreateTitleInput, Permission, TitleDetail, TitleQuery, UpdateTitleInput};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{clamp_limit, created, no_content},
};

/// Create the titles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(retrieve).patch(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    name: Option<String>,
    year: Option<i32>,
    category: Option<String>,
    genre: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// List titles with combinable filters.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TitleDetail>>> {
    let filter = TitleQuery {
        name: query.name,
        year: query.year,
        category: query.category,
        genre: query.genre,
    };

    let titles = state
        .title_service
        .list(filter, clamp_limit(query.limit), query.offset.unwrap_or(0))
        .await?;

    Ok(Json(titles))
}

/// Fetch a single title.
async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TitleDetail>> {
    let title = state.title_service.get(id).await?;
    Ok(Json(title))
}

/// Create a title (admin only).
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(input): Json<CreateTitleInput>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrReadOnly.check("POST", user.as_ref(), None)?;

    let title = state.title_service.create(input).await?;
    Ok(created(title))
}

/// Partially update a title (admin only).
async fn update(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTitleInput>,
) -> AppResult<Json<TitleDetail>> {
    Permission::AdminOrReadOnly.check("PATCH", user.as_ref(), None)?;

    let title = state.title_service.update(id, input).await?;
    Ok(Json(title))
}

/// Delete a title (admin only).
async fn remove(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrReadOnly.check("DELETE", user.as_ref(), None)?;

    state.title_service.delete(id).await?;
    Ok(no_content())
}
