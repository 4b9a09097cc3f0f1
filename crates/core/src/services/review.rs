//! Review service.

use std::collections::HashMap;

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_common::AppResult;
use yamdb_db::{
    entities::{review, user},
    repositories::{ReviewRepository, TitleRepository, UserRepository},
};

/// Review representation with the author rendered by username.
#[derive(Debug, Serialize)]
pub struct ReviewDetail {
    /// Review id.
    pub id: i64,
    /// Author username.
    pub author: String,
    /// Review text.
    pub text: String,
    /// Score from 1 to 10.
    pub score: i16,
    /// Publication timestamp.
    pub pub_date: sea_orm::prelude::DateTimeWithTimeZone,
}

/// Input for creating a review.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewInput {
    /// Review text.
    #[validate(length(min = 1))]
    pub text: String,

    /// Score from 1 to 10.
    #[validate(range(min = 1, max = 10))]
    pub score: i16,
}

/// Partial update for a review.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReviewInput {
    /// New text.
    #[validate(length(min = 1))]
    pub text: Option<String>,

    /// New score.
    #[validate(range(min = 1, max = 10))]
    pub score: Option<i16>,
}

/// Review service. Every operation resolves the parent title first, so a
/// review under a missing title is a 404 on the title, not the review.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    title_repo: TitleRepository,
    user_repo: UserRepository,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        title_repo: TitleRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            review_repo,
            title_repo,
            user_repo,
        }
    }

    /// List reviews of a title.
    pub async fn list(
        &self,
        title_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReviewDetail>> {
        self.title_repo.get_by_id(title_id).await?;
        let reviews = self
            .review_repo
            .list_for_title(title_id, limit, offset)
            .await?;
        self.assemble(reviews).await
    }

    /// Fetch a review scoped to its title.
    pub async fn get(&self, title_id: i64, review_id: i64) -> AppResult<ReviewDetail> {
        let review = self.get_model(title_id, review_id).await?;
        let author = self.user_repo.get_by_id(review.author_id).await?;
        Ok(detail(review, &author.username))
    }

    /// Fetch the raw review model, for permission checks on the author.
    pub async fn get_model(&self, title_id: i64, review_id: i64) -> AppResult<review::Model> {
        self.title_repo.get_by_id(title_id).await?;
        self.review_repo.get_scoped(title_id, review_id).await
    }

    /// Create a review authored by the requester. A second review of the
    /// same title by the same author is rejected.
    pub async fn create(
        &self,
        title_id: i64,
        author: &user::Model,
        input: CreateReviewInput,
    ) -> AppResult<ReviewDetail> {
        input.validate()?;
        self.title_repo.get_by_id(title_id).await?;

        let model = review::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author.id),
            text: Set(input.text),
            score: Set(input.score),
            pub_date: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let review = self.review_repo.create(model).await?;
        Ok(detail(review, &author.username))
    }

    /// Apply a partial update to a review.
    pub async fn update(
        &self,
        title_id: i64,
        review_id: i64,
        input: UpdateReviewInput,
    ) -> AppResult<ReviewDetail> {
        input.validate()?;

        let review = self.get_model(title_id, review_id).await?;
        let mut active: review::ActiveModel = review.into();

        if let Some(text) = input.text {
            active.text = Set(text);
        }
        if let Some(score) = input.score {
            active.score = Set(score);
        }

        let review = self.review_repo.update(active).await?;
        let author = self.user_repo.get_by_id(review.author_id).await?;
        Ok(detail(review, &author.username))
    }

    /// Delete a review; its comments cascade.
    pub async fn delete(&self, title_id: i64, review_id: i64) -> AppResult<()> {
        let review = self.get_model(title_id, review_id).await?;
        self.review_repo.delete(review).await
    }

    async fn assemble(&self, reviews: Vec<review::Model>) -> AppResult<Vec<ReviewDetail>> {
        let author_ids: Vec<i64> = reviews.iter().map(|r| r.author_id).collect();
        let authors: HashMap<i64, String> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let author = authors
                    .get(&review.author_id)
                    .cloned()
                    .unwrap_or_default();
                ReviewDetail {
                    id: review.id,
                    author,
                    text: review.text,
                    score: review.score,
                    pub_date: review.pub_date,
                }
            })
            .collect())
    }
}

fn detail(review: review::Model, author: &str) -> ReviewDetail {
    ReviewDetail {
        id: review.id,
        author: author.to_string(),
        text: review.text,
        score: review.score,
        pub_date: review.pub_date,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yamdb_common::AppError;
    use yamdb_db::entities::{title, user::Role};

    fn make_author(id: i64) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: Role::User,
            is_superuser: false,
            confirmation_code: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> ReviewService {
        let db = Arc::new(db);
        ReviewService::new(
            ReviewRepository::new(db.clone()),
            TitleRepository::new(db.clone()),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_missing_title_is_title_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<title::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service
            .create(
                42,
                &make_author(1),
                CreateReviewInput {
                    text: "fine".to_string(),
                    score: 7,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::TitleNotFound(42))));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_score() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .create(
                1,
                &make_author(1),
                CreateReviewInput {
                    text: "over the top".to_string(),
                    score: 11,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        let lowest = CreateReviewInput {
            text: "weak".to_string(),
            score: 1,
        };
        let highest = CreateReviewInput {
            text: "perfect".to_string(),
            score: 10,
        };
        let below = CreateReviewInput {
            text: "none".to_string(),
            score: 0,
        };

        assert!(lowest.validate().is_ok());
        assert!(highest.validate().is_ok());
        assert!(below.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_accepts_lowest_score() {
        let title = title::Model {
            id: 1,
            name: "Dune".to_string(),
            description: None,
            year: 1965,
            category_id: None,
        };
        let created = review::Model {
            id: 4,
            title_id: 1,
            author_id: 1,
            text: "weak".to_string(),
            score: 1,
            pub_date: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[title]])
            // no prior review by this author
            .append_query_results([Vec::<review::Model>::new()])
            .append_query_results([[created]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 4,
                rows_affected: 1,
            }])
            .into_connection();
        let service = service_with(db);

        let detail = service
            .create(
                1,
                &make_author(1),
                CreateReviewInput {
                    text: "weak".to_string(),
                    score: 1,
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.score, 1);
        assert_eq!(detail.author, "user1");
    }

    #[tokio::test]
    async fn test_list_renders_author_usernames() {
        let title = title::Model {
            id: 1,
            name: "Dune".to_string(),
            description: None,
            year: 1965,
            category_id: None,
        };
        let review = review::Model {
            id: 3,
            title_id: 1,
            author_id: 7,
            text: "solid".to_string(),
            score: 8,
            pub_date: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[title]])
            .append_query_results([[review]])
            .append_query_results([[make_author(7)]])
            .into_connection();
        let service = service_with(db);

        let details = service.list(1, 10, 0).await.unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].author, "user7");
        assert_eq!(details[0].score, 8);
    }
}
