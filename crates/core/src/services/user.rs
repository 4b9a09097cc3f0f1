//! User management service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yamdb_common::{AppError, AppResult};
use yamdb_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};

use crate::services::auth::{validate_email, validate_username};

/// User service for administration and self-service profile updates.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

/// Input for creating a user through the admin endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserInput {
    /// Username.
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    /// Email address.
    #[validate(email, length(max = 254))]
    pub email: String,

    /// Optional first name.
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    /// Optional last name.
    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    /// Optional biography.
    #[validate(length(max = 500))]
    pub bio: Option<String>,

    /// Role, defaults to `user`.
    pub role: Option<Role>,
}

/// Partial update applied by an admin to any user.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    /// New username.
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,

    /// New email address.
    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    /// New first name.
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    /// New last name.
    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    /// New biography.
    #[validate(length(max = 500))]
    pub bio: Option<String>,

    /// New role.
    pub role: Option<Role>,
}

/// Partial self-service update. Role is deliberately absent: users
/// cannot change their own role.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMeInput {
    /// New username.
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,

    /// New email address.
    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    /// New first name.
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    /// New last name.
    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    /// New biography.
    #[validate(length(max = 500))]
    pub bio: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// List users, optionally filtered by a username substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(search, limit, offset).await
    }

    /// Fetch a user by username.
    pub async fn get(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Create a user with an explicit role (admin operation).
    pub async fn create(&self, input: AdminCreateUserInput) -> AppResult<user::Model> {
        input.validate()?;
        validate_username(&input.username)?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "username is already taken".to_string(),
            ));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Validation("email is already taken".to_string()));
        }

        let model = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            bio: Set(input.bio),
            role: Set(input.role.unwrap_or_default()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.user_repo.create(model).await
    }

    /// Apply a partial update to a user (admin operation).
    pub async fn update(&self, username: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_username(username).await?;
        let mut active: user::ActiveModel = user.clone().into();

        if let Some(new_username) = input.username {
            self.check_username_free(&user, &new_username).await?;
            active.username = Set(new_username);
        }
        if let Some(new_email) = input.email {
            self.check_email_free(&user, &new_email).await?;
            active.email = Set(new_email);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Apply a partial self-service update. The role field is not
    /// accepted here, so a user can never escalate their own role.
    pub async fn update_me(
        &self,
        requester: &user::Model,
        input: UpdateMeInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut active: user::ActiveModel = requester.clone().into();

        if let Some(new_username) = input.username {
            self.check_username_free(requester, &new_username).await?;
            active.username = Set(new_username);
        }
        if let Some(new_email) = input.email {
            self.check_email_free(requester, &new_email).await?;
            active.email = Set(new_email);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Delete a user by username.
    pub async fn delete(&self, username: &str) -> AppResult<()> {
        self.user_repo.delete_by_username(username).await
    }

    async fn check_username_free(&self, current: &user::Model, username: &str) -> AppResult<()> {
        validate_username(username)?;
        if username != current.username
            && self.user_repo.find_by_username(username).await?.is_some()
        {
            return Err(AppError::Validation(
                "username is already taken".to_string(),
            ));
        }
        Ok(())
    }

    async fn check_email_free(&self, current: &user::Model, email: &str) -> AppResult<()> {
        validate_email(email)?;
        if email != current.email && self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::Validation("email is already taken".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn make_user(id: i64, username: &str, role: Role) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role,
            is_superuser: false,
            confirmation_code: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = make_user(1, "taken", Role::User);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();

        let service = UserService::new(UserRepository::new(Arc::new(db)));
        let result = service
            .create(AdminCreateUserInput {
                username: "taken".to_string(),
                email: "new@example.com".to_string(),
                first_name: None,
                last_name: None,
                bio: None,
                role: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_with_role() {
        let created = make_user(5, "newmod", Role::Moderator);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // username free
            .append_query_results([Vec::<user::Model>::new()])
            // email free
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[created]])
            .append_exec_results([MockExecResult {
                last_insert_id: 5,
                rows_affected: 1,
            }])
            .into_connection();

        let service = UserService::new(UserRepository::new(Arc::new(db)));
        let user = service
            .create(AdminCreateUserInput {
                username: "newmod".to_string(),
                email: "newmod@example.com".to_string(),
                first_name: None,
                last_name: None,
                bio: None,
                role: Some(Role::Moderator),
            })
            .await
            .unwrap();

        assert_eq!(user.role, Role::Moderator);
    }

    #[tokio::test]
    async fn test_update_me_keeps_role() {
        let me = make_user(3, "reader", Role::User);
        let mut updated = me.clone();
        updated.bio = Some("hi".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[updated]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = UserService::new(UserRepository::new(Arc::new(db)));
        let user = service
            .update_me(
                &me,
                UpdateMeInput {
                    bio: Some("hi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.bio.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_update_me_rejects_reserved_username() {
        let me = make_user(3, "reader", Role::User);

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = UserService::new(UserRepository::new(Arc::new(db)));

        let result = service
            .update_me(
                &me,
                UpdateMeInput {
                    username: Some("Me".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
