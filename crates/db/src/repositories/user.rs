//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use yamdb_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username, returning an error if not found.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Find users by ids.
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users ordered by id, optionally filtered by a username substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find();

        if let Some(term) = search {
            query = query.filter(user::Column::Username.contains(term));
        }

        query
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Validation("username or email is already taken".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user by username, failing if absent.
    pub async fn delete_by_username(&self, username: &str) -> AppResult<()> {
        let user = self.get_by_username(username).await?;
        user.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store a fresh confirmation code for the (username, email) pair,
    /// creating the user record on first signup.
    ///
    /// Runs in a transaction so a failed mail dispatch never leaves a
    /// half-written record behind. The unique username and email indexes
    /// backstop concurrent signups racing past the service pre-checks; the
    /// loser gets a validation error, not a server error.
    pub async fn upsert_confirmation_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Email.eq(email))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = if let Some(user) = existing {
            let mut active: user::ActiveModel = user.into();
            active.confirmation_code = Set(Some(code.to_string()));
            active.updated_at = Set(Some(chrono::Utc::now().into()));
            active
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
        } else {
            let active = user::ActiveModel {
                username: Set(username.to_string()),
                email: Set(email.to_string()),
                confirmation_code: Set(Some(code.to_string())),
                created_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            };
            active.insert(&txn).await.map_err(|e| {
                if super::is_unique_violation(&e) {
                    AppError::Validation("username or email is already taken".to_string())
                } else {
                    AppError::Database(e.to_string())
                }
            })?
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user::Role;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: Role::User,
            is_superuser: false,
            confirmation_code: Some("A1B2C3".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_username_found() {
        let user = create_test_user(1, "reader");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_username("reader").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().username, "reader");
    }

    #[tokio::test]
    async fn test_get_by_username_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_username("nobody").await;

        match result {
            Err(AppError::UserNotFound(name)) => assert_eq!(name, "nobody"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_upsert_confirmation_code_updates_existing() {
        let existing = create_test_user(7, "reader");
        let mut updated = existing.clone();
        updated.confirmation_code = Some("ZZZZ99".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let user = repo
            .upsert_confirmation_code("reader", "reader@example.com", "ZZZZ99")
            .await
            .unwrap();

        assert_eq!(user.confirmation_code.as_deref(), Some("ZZZZ99"));
    }

    #[tokio::test]
    async fn test_upsert_confirmation_code_creates_new() {
        let created = create_test_user(1, "fresh");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let user = repo
            .upsert_confirmation_code("fresh", "fresh@example.com", "A1B2C3")
            .await
            .unwrap();

        assert_eq!(user.username, "fresh");
    }
}
