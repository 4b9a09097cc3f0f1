//! API response helpers.

use axum::{
    Json,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

/// Default number of items per list page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound on the requested page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Clamp a requested page size to the allowed range.
#[must_use]
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}

/// 201 Created with a JSON body.
pub fn created<T: Serialize>(value: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(value))
}

/// 204 No Content.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(10_000)), MAX_PAGE_SIZE);
    }
}
