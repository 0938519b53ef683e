//! Input validation shared by the auth and catalog services
//!
//! Lengths are counted in characters, not bytes.

use crate::error::{ApiError, ApiResult};

const NAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 4;
const PASSWORD_MAX: usize = 32;

fn char_len_within(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len)
}

/// Usernames, category names and work titles: 1..=32 characters
pub fn validate_name(value: &str) -> ApiResult<()> {
    if char_len_within(value, 1, NAME_MAX) {
        Ok(())
    } else {
        Err(ApiError::Invalid)
    }
}

pub fn validate_credentials(username: &str, password: &str) -> ApiResult<()> {
    validate_name(username)?;
    if !char_len_within(password, PASSWORD_MIN, PASSWORD_MAX) {
        return Err(ApiError::Invalid);
    }
    Ok(())
}

/// A work must name exactly one source per file: an upload or an existing filename.
pub fn validate_exactly_one<U, F>(upload: &Option<U>, filename: &Option<F>) -> ApiResult<()> {
    match (upload, filename) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(ApiError::Invalid),
    }
}
