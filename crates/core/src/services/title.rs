//! Title service.
//!
//! Assembles the public title representation: category and genre
//! references by slug plus the computed average review score.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_common::{AppError, AppResult, constants::MIN_YEAR};
use yamdb_db::{
    entities::{category, genre, title},
    repositories::{CategoryRepository, GenreRepository, ReviewRepository, TitleFilter, TitleRepository},
};

/// Category or genre reference as exposed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SlugRef {
    /// Display name.
    pub name: String,
    /// Unique slug.
    pub slug: String,
}

impl From<category::Model> for SlugRef {
    fn from(model: category::Model) -> Self {
        Self {
            name: model.name,
            slug: model.slug,
        }
    }
}

impl From<genre::Model> for SlugRef {
    fn from(model: genre::Model) -> Self {
        Self {
            name: model.name,
            slug: model.slug,
        }
    }
}

/// Full title representation returned by every title read.
#[derive(Debug, Serialize)]
pub struct TitleDetail {
    /// Title id.
    pub id: i64,
    /// Title name.
    pub name: String,
    /// Publication year.
    pub year: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Mean review score, absent when the title has no reviews.
    pub rating: Option<f64>,
    /// Category reference, if assigned.
    pub category: Option<SlugRef>,
    /// Genre references.
    pub genre: Vec<SlugRef>,
}

/// Query parameters accepted by the title listing.
#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    /// Substring match on the name.
    pub name: Option<String>,
    /// Exact publication year.
    pub year: Option<i32>,
    /// Exact category slug.
    pub category: Option<String>,
    /// Exact genre slug.
    pub genre: Option<String>,
}

impl From<TitleQuery> for TitleFilter {
    fn from(query: TitleQuery) -> Self {
        Self {
            name: query.name,
            year: query.year,
            category: query.category,
            genre: query.genre,
        }
    }
}

/// Input for creating a title.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleInput {
    /// Title name.
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// Publication year.
    pub year: i32,

    /// Optional description.
    pub description: Option<String>,

    /// Category slug.
    pub category: Option<String>,

    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Partial update for a title.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTitleInput {
    /// New name.
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    /// New publication year.
    pub year: Option<i32>,

    /// New description.
    pub description: Option<String>,

    /// New category slug.
    pub category: Option<String>,

    /// Replacement genre slugs.
    pub genre: Option<Vec<String>>,
}

/// Title service.
#[derive(Clone)]
pub struct TitleService {
    title_repo: TitleRepository,
    category_repo: CategoryRepository,
    genre_repo: GenreRepository,
    review_repo: ReviewRepository,
}

impl TitleService {
    /// Create a new title service.
    #[must_use]
    pub const fn new(
        title_repo: TitleRepository,
        category_repo: CategoryRepository,
        genre_repo: GenreRepository,
        review_repo: ReviewRepository,
    ) -> Self {
        Self {
            title_repo,
            category_repo,
            genre_repo,
            review_repo,
        }
    }

    /// List titles with combinable filters.
    pub async fn list(
        &self,
        query: TitleQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<TitleDetail>> {
        let titles = self.title_repo.list(&query.into(), limit, offset).await?;
        self.assemble(titles).await
    }

    /// Fetch a single title.
    pub async fn get(&self, id: i64) -> AppResult<TitleDetail> {
        let title = self.title_repo.get_by_id(id).await?;
        let mut details = self.assemble(vec![title]).await?;
        details.pop().ok_or(AppError::TitleNotFound(id))
    }

    /// Create a title.
    pub async fn create(&self, input: CreateTitleInput) -> AppResult<TitleDetail> {
        input.validate()?;
        validate_year(input.year)?;

        let category_id = match &input.category {
            Some(slug) => Some(self.resolve_category(slug).await?.id),
            None => None,
        };
        let genre_ids = self.resolve_genres(&input.genre).await?;

        let model = title::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            year: Set(input.year),
            category_id: Set(category_id),
            ..Default::default()
        };

        let title = self.title_repo.create(model, &genre_ids).await?;
        self.get(title.id).await
    }

    /// Apply a partial update to a title.
    pub async fn update(&self, id: i64, input: UpdateTitleInput) -> AppResult<TitleDetail> {
        input.validate()?;

        let title = self.title_repo.get_by_id(id).await?;
        let mut active: title::ActiveModel = title.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(year) = input.year {
            validate_year(year)?;
            active.year = Set(year);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(slug) = &input.category {
            active.category_id = Set(Some(self.resolve_category(slug).await?.id));
        }

        let genre_ids = match &input.genre {
            Some(slugs) => Some(self.resolve_genres(slugs).await?),
            None => None,
        };

        let title = self
            .title_repo
            .update(active, genre_ids.as_deref())
            .await?;
        self.get(title.id).await
    }

    /// Delete a title; its reviews and their comments cascade.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.title_repo.delete_by_id(id).await
    }

    async fn resolve_category(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::Validation(format!("unknown category \"{slug}\"")))
    }

    /// Resolve genre slugs to ids, keeping request order. A slug listed
    /// twice yields one link, matching the set semantics of the field.
    async fn resolve_genres(&self, slugs: &[String]) -> AppResult<Vec<i64>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        let genres = self.genre_repo.find_by_slugs(slugs).await?;
        let found: HashMap<&str, i64> = genres.iter().map(|g| (g.slug.as_str(), g.id)).collect();

        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let id = found
                .get(slug.as_str())
                .copied()
                .ok_or_else(|| AppError::Validation(format!("unknown genre \"{slug}\"")))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Attach category, genres, and ratings to a batch of titles.
    async fn assemble(&self, titles: Vec<title::Model>) -> AppResult<Vec<TitleDetail>> {
        let title_ids: Vec<i64> = titles.iter().map(|t| t.id).collect();

        let ratings = self.review_repo.average_scores(&title_ids).await?;

        let mut genres_by_title: HashMap<i64, Vec<SlugRef>> = HashMap::new();
        for (title_id, genre) in self.title_repo.genres_for_titles(&title_ids).await? {
            genres_by_title
                .entry(title_id)
                .or_default()
                .push(genre.into());
        }

        let category_ids: Vec<i64> = titles.iter().filter_map(|t| t.category_id).collect();
        let categories: HashMap<i64, category::Model> = self
            .category_repo
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(titles
            .into_iter()
            .map(|title| TitleDetail {
                rating: ratings.get(&title.id).copied(),
                category: title
                    .category_id
                    .and_then(|id| categories.get(&id).cloned())
                    .map(SlugRef::from),
                genre: genres_by_title.remove(&title.id).unwrap_or_default(),
                id: title.id,
                name: title.name,
                year: title.year,
                description: title.description,
            })
            .collect())
    }
}

/// Titles cannot be published in the future or before year one.
fn validate_year(year: i32) -> AppResult<()> {
    let current = Utc::now().year();
    if year < MIN_YEAR || year > current {
        return Err(AppError::Validation(format!(
            "year must be between {MIN_YEAR} and {current}"
        )));
    }
    Ok(())
}
