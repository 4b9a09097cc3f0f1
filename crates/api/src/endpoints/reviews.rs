//! Review endpoints, nested under a title.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use yamdb_common::{AppError, AppResult};
use yamdb_core::{CreateReviewInput, Permission, ReviewDetail, UpdateReviewInput};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{clamp_limit, created, no_content},
};

/// Create the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{review_id}",
            get(retrieve).patch(update).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u64>,
    offset: Option<u64>,
}

/// List reviews of a title.
async fn list(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ReviewDetail>>> {
    let reviews = state
        .review_service
        .list(title_id, clamp_limit(query.limit), query.offset.unwrap_or(0))
        .await?;

    Ok(Json(reviews))
}

/// Fetch a review.
async fn retrieve(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<Json<ReviewDetail>> {
    let review = state.review_service.get(title_id, review_id).await?;
    Ok(Json(review))
}

/// Create a review authored by the requester.
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(title_id): Path<i64>,
    Json(input): Json<CreateReviewInput>,
) -> AppResult<impl IntoResponse> {
    Permission::AuthorModeratorAdminOrReadOnly.check("POST", user.as_ref(), None)?;
    let user = user.ok_or(AppError::Unauthorized)?;

    let review = state.review_service.create(title_id, &user, input).await?;
    Ok(created(review))
}

/// Partially update a review (author, moderator, or admin).
async fn update(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(input): Json<UpdateReviewInput>,
) -> AppResult<Json<ReviewDetail>> {
    // Authentication check before resource lookup, object check after.
    Permission::AuthorModeratorAdminOrReadOnly.check("PATCH", user.as_ref(), None)?;
    let review = state.review_service.get_model(title_id, review_id).await?;
    Permission::AuthorModeratorAdminOrReadOnly.check(
        "PATCH",
        user.as_ref(),
        Some(review.author_id),
    )?;

    let review = state
        .review_service
        .update(title_id, review_id, input)
        .await?;
    Ok(Json(review))
}

/// Delete a review (author, moderator, or admin).
async fn remove(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<impl IntoResponse> {
    Permission::AuthorModeratorAdminOrReadOnly.check("DELETE", user.as_ref(), None)?;
    let review = state.review_service.get_model(title_id, review_id).await?;
    Permission::AuthorModeratorAdminOrReadOnly.check(
        "DELETE",
        user.as_ref(),
        Some(review.author_id),
    )?;

    state.review_service.delete(title_id, review_id).await?;
    Ok(no_content())
}
