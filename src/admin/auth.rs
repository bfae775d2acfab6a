//! Admin bearer-token check

use hyper::header::AUTHORIZATION;
use hyper::HeaderMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header")]
    Malformed,

    #[error("Invalid admin token")]
    InvalidToken,
}

/// Require `Authorization: Bearer <expected>`
pub fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Malformed)?
        .trim();

    if token == expected {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}
