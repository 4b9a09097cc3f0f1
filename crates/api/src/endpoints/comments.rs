//! Comment endpoints, nested under a review.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use yamdb_common::{AppError, AppResult};
use yamdb_core::{CommentDetail, CreateCommentInput, Permission, UpdateCommentInput};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{clamp_limit, created, no_content},
};

/// Create the comments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{comment_id}",
            get(retrieve).patch(update).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u64>,
    offset: Option<u64>,
}

/// List comments of a review.
async fn list(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<CommentDetail>>> {
    let comments = state
        .comment_service
        .list(
            title_id,
            review_id,
            clamp_limit(query.limit),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(comments))
}

/// Fetch a comment.
async fn retrieve(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<Json<CommentDetail>> {
    let comment = state
        .comment_service
        .get(title_id, review_id, comment_id)
        .await?;
    Ok(Json(comment))
}

/// Create a comment authored by the requester.
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<impl IntoResponse> {
    Permission::AuthorModeratorAdminOrReadOnly.check("POST", user.as_ref(), None)?;
    let user = user.ok_or(AppError::Unauthorized)?;

    let comment = state
        .comment_service
        .create(title_id, review_id, &user, input)
        .await?;
    Ok(created(comment))
}

/// Partially update a comment (author, moderator, or admin).
async fn update(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(input): Json<UpdateCommentInput>,
) -> AppResult<Json<CommentDetail>> {
    Permission::AuthorModeratorAdminOrReadOnly.check("PATCH", user.as_ref(), None)?;
    let comment = state
        .comment_service
        .get_model(title_id, review_id, comment_id)
        .await?;
    Permission::AuthorModeratorAdminOrReadOnly.check(
        "PATCH",
        user.as_ref(),
        Some(comment.author_id),
    )?;

    let comment = state
        .comment_service
        .update(title_id, review_id, comment_id, input)
        .await?;
    Ok(Json(comment))
}

/// Delete a comment (author, moderator, or admin).
async fn remove(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<impl IntoResponse> {
    Permission::AuthorModeratorAdminOrReadOnly.check("DELETE", user.as_ref(), None)?;
    let comment = state
        .comment_service
        .get_model(title_id, review_id, comment_id)
        .await?;
    Permission::AuthorModeratorAdminOrReadOnly.check(
        "DELETE",
        user.as_ref(),
        Some(comment.author_id),
    )?;

    state
        .comment_service
        .delete(title_id, review_id, comment_id)
        .await?;
    Ok(no_content())
}
