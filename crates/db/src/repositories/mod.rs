//! Repository layer: one repository per entity.

mod category;
mod comment;
mod genre;
mod review;
mod title;
mod user;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use genre::GenreRepository;
pub use review::ReviewRepository;
pub use title::{TitleFilter, TitleRepository};
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};

/// Whether a database error is a unique-constraint violation.
///
/// Integrity violations surface to clients as validation errors, not 500s.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
