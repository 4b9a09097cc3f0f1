//! Review repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Review, review};
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use yamdb_common::{AppError, AppResult};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List reviews of a title ordered by publication date.
    pub async fn list_for_title(
        &self,
        title_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::TitleId.eq(title_id))
            .order_by_asc(review::Column::PubDate)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a review by ID scoped to its title.
    pub async fn find_scoped(&self, title_id: i64, id: i64) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .filter(review::Column::TitleId.eq(title_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a review by ID scoped to its title, returning an error if not found.
    pub async fn get_scoped(&self, title_id: i64, id: i64) -> AppResult<review::Model> {
        self.find_scoped(title_id, id)
            .await?
            .ok_or(AppError::ReviewNotFound(id))
    }

    /// Create a review, rejecting a second review by the same author for the
    /// same title.
    ///
    /// The duplicate pre-check and the insert run in one transaction; the
    /// unique (title, author) index backstops concurrent submissions, and a
    /// constraint violation is reported as a validation error rather than a
    /// server error.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let title_id = match &model.title_id {
            sea_orm::ActiveValue::Set(v) => *v,
            _ => return Err(AppError::Internal("review without title id".to_string())),
        };
        let author_id = match &model.author_id {
            sea_orm::ActiveValue::Set(v) => *v,
            _ => return Err(AppError::Internal("review without author id".to_string())),
        };

        let existing = Review::find()
            .filter(review::Column::TitleId.eq(title_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(AppError::Validation(
                "you have already reviewed this title".to_string(),
            ));
        }

        let review = model.insert(&txn).await.map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Validation("you have already reviewed this title".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(review)
    }

    /// Update a review.
    pub async fn update(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a review.
    pub async fn delete(&self, review: review::Model) -> AppResult<()> {
        review
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mean review score per title for a batch of titles.
    ///
    /// Titles without reviews are simply absent from the map; the caller
    /// renders them with a null rating. Both single retrieval and collection
    /// listing go through this query, so the two can never disagree.
    pub async fn average_scores(&self, title_ids: &[i64]) -> AppResult<HashMap<i64, f64>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, Option<f64>)> = Review::find()
            .select_only()
            .column(review::Column::TitleId)
            .column_as(
                Expr::expr(Func::avg(
                    Expr::col(review::Column::Score).cast_as(Alias::new("double precision")),
                )),
                "rating",
            )
            .filter(review::Column::TitleId.is_in(title_ids.to_vec()))
            .group_by(review::Column::TitleId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(title_id, rating)| rating.map(|r| (title_id, r)))
            .collect())
    }
}
