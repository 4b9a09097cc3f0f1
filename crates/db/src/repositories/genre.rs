//! Genre repository.

use std::sync::Arc;

use crate::entities::{Genre, genre};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use yamdb_common::{AppError, AppResult};

/// Genre repository for database operations.
#[derive(Clone)]
pub struct GenreRepository {
    db: Arc<DatabaseConnection>,
}

impl GenreRepository {
    /// Create a new genre repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List genres ordered by name, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<genre::Model>> {
        let mut query = Genre::find();

        if let Some(term) = search {
            query = query.filter(genre::Column::Name.contains(term));
        }

        query
            .order_by_asc(genre::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a genre by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<genre::Model>> {
        Genre::find()
            .filter(genre::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a genre by slug, returning an error if not found.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<genre::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("genre {slug}")))
    }

    /// Find genres by slugs, preserving no particular order.
    pub async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<genre::Model>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        Genre::find()
            .filter(genre::Column::Slug.is_in(slugs.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new genre.
    pub async fn create(&self, model: genre::ActiveModel) -> AppResult<genre::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Validation("genre with this slug already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a genre by slug, failing if absent.
    pub async fn delete_by_slug(&self, slug: &str) -> AppResult<()> {
        let genre = self.get_by_slug(slug).await?;
        genre
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
