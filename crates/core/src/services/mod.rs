//! Business logic services.

pub mod auth;
pub mod category;
pub mod comment;
pub mod genre;
pub mod mail;
pub mod review;
pub mod title;
pub mod user;

pub use auth::{AuthService, Claims, SignupInput, SignupOutput, TokenInput, TokenOutput};
pub use category::{CategoryService, CreateCategoryInput};
pub use comment::{CommentDetail, CommentService, CreateCommentInput, UpdateCommentInput};
pub use genre::{CreateGenreInput, GenreService};
pub use mail::MailService;
pub use review::{CreateReviewInput, ReviewDetail, ReviewService, UpdateReviewInput};
pub use title::{CreateTitleInput, SlugRef, TitleDetail, TitleQuery, TitleService, UpdateTitleInput};
pub use user::{AdminCreateUserInput, UpdateMeInput, UpdateUserInput, UserService};
