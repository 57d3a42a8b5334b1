use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::models::AccessTier;

/// Set by the access-control layer in front of this service.
pub const PREMIUM_HEADER: &str = "x-premium-access";

#[async_trait]
impl<S> FromRequestParts<S> for AccessTier
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let premium = parts
            .headers
            .get(PREMIUM_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(AccessTier::from(premium))
    }
}
