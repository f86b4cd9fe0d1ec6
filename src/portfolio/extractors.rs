use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

pub const OWNER_HEADER: &str = "x-user-id";

/// Identity-provider subject of the caller, as forwarded by the auth proxy in
/// front of this service.
pub struct OwnerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                format!("missing {OWNER_HEADER} header"),
            ))?;

        Ok(OwnerId(owner.to_string()))
    }
}
