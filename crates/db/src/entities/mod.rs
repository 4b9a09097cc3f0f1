//! Database entities.

#![allow(missing_docs)]

pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod title;
pub mod title_genre;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use genre::Entity as Genre;
pub use review::Entity as Review;
pub use title::Entity as Title;
pub use title_genre::Entity as TitleGenre;
pub use user::Entity as User;
