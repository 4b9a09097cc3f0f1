//! Title repository.

use std::sync::Arc;

use crate::entities::{Genre, Title, TitleGenre, category, genre, title, title_genre};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use yamdb_common::{AppError, AppResult};

/// Combinable filters for title listing.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Substring match on the title name.
    pub name: Option<String>,
    /// Exact publication year.
    pub year: Option<i32>,
    /// Exact category slug.
    pub category: Option<String>,
    /// Exact genre slug.
    pub genre: Option<String>,
}

/// Title repository for database operations.
#[derive(Clone)]
pub struct TitleRepository {
    db: Arc<DatabaseConnection>,
}

impl TitleRepository {
    /// Create a new title repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List titles ordered by name, applying any combination of filters.
    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<title::Model>> {
        let mut query = Title::find();

        if let Some(name) = &filter.name {
            query = query.filter(title::Column::Name.contains(name));
        }
        if let Some(year) = filter.year {
            query = query.filter(title::Column::Year.eq(year));
        }
        if let Some(category_slug) = &filter.category {
            query = query
                .join(JoinType::InnerJoin, title::Relation::Category.def())
                .filter(category::Column::Slug.eq(category_slug));
        }
        if let Some(genre_slug) = &filter.genre {
            query = query
                .join(JoinType::InnerJoin, title_genre::Relation::Title.def().rev())
                .join(JoinType::InnerJoin, title_genre::Relation::Genre.def())
                .filter(genre::Column::Slug.eq(genre_slug))
                .distinct();
        }

        query
            .order_by_asc(title::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a title by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<title::Model>> {
        Title::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a title by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<title::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::TitleNotFound(id))
    }

    /// Load (title id, genre) pairs for a batch of titles.
    pub async fn genres_for_titles(&self, title_ids: &[i64]) -> AppResult<Vec<(i64, genre::Model)>> {
        if title_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = TitleGenre::find()
            .filter(title_genre::Column::TitleId.is_in(title_ids.to_vec()))
            .find_also_related(Genre)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, genre)| genre.map(|g| (link.title_id, g)))
            .collect())
    }

    /// Create a title together with its genre links in one transaction.
    pub async fn create(
        &self,
        model: title::ActiveModel,
        genre_ids: &[i64],
    ) -> AppResult<title::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let title = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !genre_ids.is_empty() {
            let links = genre_ids.iter().map(|genre_id| title_genre::ActiveModel {
                title_id: Set(title.id),
                genre_id: Set(*genre_id),
            });
            TitleGenre::insert_many(links)
                .exec(&txn)
                .await
                .map_err(map_link_err)?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(title)
    }

    /// Update a title, replacing its genre links when a new set is given.
    pub async fn update(
        &self,
        model: title::ActiveModel,
        genre_ids: Option<&[i64]>,
    ) -> AppResult<title::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let title = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(genre_ids) = genre_ids {
            TitleGenre::delete_many()
                .filter(title_genre::Column::TitleId.eq(title.id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if !genre_ids.is_empty() {
                let links = genre_ids.iter().map(|genre_id| title_genre::ActiveModel {
                    title_id: Set(title.id),
                    genre_id: Set(*genre_id),
                });
                TitleGenre::insert_many(links)
                    .exec(&txn)
                    .await
                    .map_err(map_link_err)?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(title)
    }

    /// Delete a title by ID, failing if absent.
    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = Title::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::TitleNotFound(id));
        }
        Ok(())
    }
}

/// Map genre-link insert errors. The composite (title, genre) primary key
/// turns a repeated genre into a validation error, not a 500.
#[allow(clippy::needless_pass_by_value)]
fn map_link_err(e: sea_orm::DbErr) -> AppError {
    if super::is_unique_violation(&e) {
        AppError::Validation("duplicate genre for this title".to_string())
    } else {
        AppError::Database(e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_title(id: i64, name: &str, year: i32) -> title::Model {
        title::Model {
            id,
            name: name.to_string(),
            description: None,
            year,
            category_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<title::Model>::new()])
                .into_connection(),
        );

        let repo = TitleRepository::new(db);
        let result = repo.get_by_id(99).await;

        match result {
            Err(AppError::TitleNotFound(id)) => assert_eq!(id, 99),
            _ => panic!("Expected TitleNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_list_titles() {
        let t1 = create_test_title(1, "Dune", 1965);
        let t2 = create_test_title(2, "Solaris", 1961);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[t1, t2]])
                .into_connection(),
        );

        let repo = TitleRepository::new(db);
        let filter = TitleFilter {
            year: Some(1965),
            ..Default::default()
        };
        let result = repo.list(&filter, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_genre_links() {
        let created = create_test_title(5, "Dune", 1965);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = TitleRepository::new(db);
        let active = title::ActiveModel {
            name: Set("Dune".to_string()),
            year: Set(1965),
            ..Default::default()
        };

        let result = repo.create(active, &[1, 2]).await.unwrap();
        assert_eq!(result.id, 5);
    }

    #[tokio::test]
    async fn test_delete_missing_title_errors() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = TitleRepository::new(db);
        let result = repo.delete_by_id(42).await;

        assert!(matches!(result, Err(AppError::TitleNotFound(42))));
    }
}
