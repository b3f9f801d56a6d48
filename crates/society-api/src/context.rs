//! Builds a [`RequestContext`] from request headers.
//!
//! Authentication happens upstream; whatever sits in `X-User-Uuid` is taken
//! as the caller id.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use society_core::RequestContext;
use uuid::Uuid;

pub const USER_UUID_HEADER: &str = "x-user-uuid";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor yielding the caller's [`RequestContext`].
///
/// Never rejects. A missing caller is reported by the operation itself.
pub struct Caller(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let header = |name: &str| {
      parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    };

    let caller = header(USER_UUID_HEADER).map(str::to_owned);
    let request_id = header(REQUEST_ID_HEADER).and_then(|v| Uuid::parse_str(v).ok());

    Ok(Caller(RequestContext::from_parts(caller, request_id)))
  }
}
