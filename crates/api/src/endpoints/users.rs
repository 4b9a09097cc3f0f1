//! User administration and profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use yamdb_common::AppResult;
use yamdb_core::{AdminCreateUserInput, Permission, UpdateMeInput, UpdateUserInput};
use yamdb_db::entities::user::{self, Role};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{clamp_limit, created, no_content},
};

/// Create the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/me", get(me).patch(update_me))
        .route(
            "/{username}",
            get(retrieve).patch(update).delete(remove),
        )
}

/// Public user representation.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Role.
    pub role: Role,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            role: model.role,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// List users (admin only).
async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    Permission::AdminOrSuperuserOnly.check("GET", requester.as_ref(), None)?;

    let users = state
        .user_service
        .list(
            query.search.as_deref(),
            clamp_limit(query.limit),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user with an explicit role (admin only).
async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Json(input): Json<AdminCreateUserInput>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrSuperuserOnly.check("POST", requester.as_ref(), None)?;

    let user = state.user_service.create(input).await?;
    Ok(created(UserResponse::from(user)))
}

/// Fetch the requester's own profile.
async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Update the requester's own profile. Role cannot be changed here.
async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<UpdateMeInput>,
) -> AppResult<Json<UserResponse>> {
    let updated = state.user_service.update_me(&user, input).await?;
    Ok(Json(UserResponse::from(updated)))
}

/// Fetch a user by username (admin only).
async fn retrieve(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    Permission::AdminOrSuperuserOnly.check("GET", requester.as_ref(), None)?;

    let user = state.user_service.get(&username).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Partially update a user (admin only).
async fn update(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserResponse>> {
    Permission::AdminOrSuperuserOnly.check("PATCH", requester.as_ref(), None)?;

    let user = state.user_service.update(&username, input).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete a user (admin only).
async fn remove(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    Permission::AdminOrSuperuserOnly.check("DELETE", requester.as_ref(), None)?;

    state.user_service.delete(&username).await?;
    Ok(no_content())
}
