//! Field length limits and other shared constants.

/// Maximum length of a username.
pub const USERNAME_MAX_LENGTH: u64 = 150;

/// Maximum length of an email address.
pub const EMAIL_MAX_LENGTH: u64 = 254;

/// Maximum length of a user biography.
pub const BIO_MAX_LENGTH: u64 = 500;

/// Maximum length of a stored role value.
pub const ROLE_MAX_LENGTH: u64 = 20;

/// Length of a generated confirmation code.
pub const CONFIRMATION_CODE_LENGTH: usize = 6;

/// Maximum length of category/genre/title names.
pub const NAME_MAX_LENGTH: u64 = 256;

/// Maximum length of category/genre slugs.
pub const SLUG_MAX_LENGTH: u64 = 50;

/// Minimum score for a review.
pub const MIN_SCORE: i16 = 1;

/// Maximum score for a review.
pub const MAX_SCORE: i16 = 10;

/// Minimum publication year for a title.
pub const MIN_YEAR: i32 = 1;

/// Username reserved for the self-service profile route.
pub const RESERVED_USERNAME: &str = "me";
