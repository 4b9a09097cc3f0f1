//! Genre service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yamdb_common::AppResult;
use yamdb_db::{entities::genre, repositories::GenreRepository};

use crate::services::category::SLUG_RE;

/// Input for creating a genre.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGenreInput {
    /// Display name.
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// URL-safe unique identifier.
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    pub slug: String,
}

/// Genre service.
#[derive(Clone)]
pub struct GenreService {
    genre_repo: GenreRepository,
}

impl GenreService {
    /// Create a new genre service.
    #[must_use]
    pub const fn new(genre_repo: GenreRepository) -> Self {
        Self { genre_repo }
    }

    /// List genres, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<genre::Model>> {
        self.genre_repo.list(search, limit, offset).await
    }

    /// Create a genre. A duplicate slug is a validation error.
    pub async fn create(&self, input: CreateGenreInput) -> AppResult<genre::Model> {
        input.validate()?;

        let model = genre::ActiveModel {
            name: Set(input.name),
            slug: Set(input.slug),
            ..Default::default()
        };

        self.genre_repo.create(model).await
    }

    /// Delete a genre by slug.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        self.genre_repo.delete_by_slug(slug).await
    }
}
