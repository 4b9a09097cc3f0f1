//! Category service.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yamdb_common::AppResult;
use yamdb_db::{entities::category, repositories::CategoryRepository};

/// Allowed slug characters, shared with genres.
pub(crate) static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug pattern")
});

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    /// Display name.
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// URL-safe unique identifier.
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    pub slug: String,
}

/// Category service.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository) -> Self {
        Self { category_repo }
    }

    /// List categories, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<category::Model>> {
        self.category_repo.list(search, limit, offset).await
    }

    /// Create a category. A duplicate slug is a validation error.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let model = category::ActiveModel {
            name: Set(input.name),
            slug: Set(input.slug),
            ..Default::default()
        };

        self.category_repo.create(model).await
    }

    /// Delete a category by slug.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        self.category_repo.delete_by_slug(slug).await
    }
}
