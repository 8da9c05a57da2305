// Request identity extraction.
//
// Authentication itself lives in an upstream gateway; requests arrive with the
// caller's id in the `x-user-id` header. This extractor is the seam handlers
// depend on, so swapping in a real token validator later only touches this file.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid x-user-id header".to_string()))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| ApiError::Unauthorized("x-user-id is not a valid UUID".to_string()))?;

        Ok(AuthenticatedUser { user_id })
    }
}
