//! Comment service.

use std::collections::HashMap;

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_common::AppResult;
use yamdb_db::{
    entities::{comment, user},
    repositories::{CommentRepository, ReviewRepository, TitleRepository, UserRepository},
};

/// Comment representation with the author rendered by username.
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    /// Comment id.
    pub id: i64,
    /// Author username.
    pub author: String,
    /// Comment text.
    pub text: String,
    /// Publication timestamp.
    pub pub_date: sea_orm::prelude::DateTimeWithTimeZone,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    /// Comment text.
    #[validate(length(min = 1))]
    pub text: String,
}

/// Partial update for a comment.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCommentInput {
    /// New text.
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

/// Comment service. The parent title and review are resolved before any
/// comment operation proceeds.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    review_repo: ReviewRepository,
    title_repo: TitleRepository,
    user_repo: UserRepository,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        review_repo: ReviewRepository,
        title_repo: TitleRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            review_repo,
            title_repo,
            user_repo,
        }
    }

    /// List comments of a review.
    pub async fn list(
        &self,
        title_id: i64,
        review_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentDetail>> {
        self.resolve_parents(title_id, review_id).await?;
        let comments = self
            .comment_repo
            .list_for_review(review_id, limit, offset)
            .await?;
        self.assemble(comments).await
    }

    /// Fetch a comment scoped to its review.
    pub async fn get(
        &self,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
    ) -> AppResult<CommentDetail> {
        let comment = self.get_model(title_id, review_id, comment_id).await?;
        let author = self.user_repo.get_by_id(comment.author_id).await?;
        Ok(detail(comment, &author.username))
    }

    /// Fetch the raw comment model, for permission checks on the author.
    pub async fn get_model(
        &self,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
    ) -> AppResult<comment::Model> {
        self.resolve_parents(title_id, review_id).await?;
        self.comment_repo.get_scoped(review_id, comment_id).await
    }

    /// Create a comment authored by the requester.
    pub async fn create(
        &self,
        title_id: i64,
        review_id: i64,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<CommentDetail> {
        input.validate()?;
        self.resolve_parents(title_id, review_id).await?;

        let model = comment::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author.id),
            text: Set(input.text),
            pub_date: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        Ok(detail(comment, &author.username))
    }

    /// Apply a partial update to a comment.
    pub async fn update(
        &self,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
        input: UpdateCommentInput,
    ) -> AppResult<CommentDetail> {
        input.validate()?;

        let comment = self.get_model(title_id, review_id, comment_id).await?;
        let mut active: comment::ActiveModel = comment.into();

        if let Some(text) = input.text {
            active.text = Set(text);
        }

        let comment = self.comment_repo.update(active).await?;
        let author = self.user_repo.get_by_id(comment.author_id).await?;
        Ok(detail(comment, &author.username))
    }

    /// Delete a comment.
    pub async fn delete(&self, title_id: i64, review_id: i64, comment_id: i64) -> AppResult<()> {
        let comment = self.get_model(title_id, review_id, comment_id).await?;
        self.comment_repo.delete(comment).await
    }

    async fn resolve_parents(&self, title_id: i64, review_id: i64) -> AppResult<()> {
        self.title_repo.get_by_id(title_id).await?;
        self.review_repo.get_scoped(title_id, review_id).await?;
        Ok(())
    }

    async fn assemble(&self, comments: Vec<comment::Model>) -> AppResult<Vec<CommentDetail>> {
        let author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        let authors: HashMap<i64, String> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors
                    .get(&comment.author_id)
                    .cloned()
                    .unwrap_or_default();
                CommentDetail {
                    id: comment.id,
                    author,
                    text: comment.text,
                    pub_date: comment.pub_date,
                }
            })
            .collect())
    }
}

fn detail(comment: comment::Model, author: &str) -> CommentDetail {
    CommentDetail {
        id: comment.id,
        author: author.to_string(),
        text: comment.text,
        pub_date: comment.pub_date,
    }
}
