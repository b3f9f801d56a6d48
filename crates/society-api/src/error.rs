//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use society_core::{ErrorKind, RequestContext};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] society_core::Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0.kind() {
      ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
      ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = json!({
      "error": self.0.to_string(),
      "kind":  self.0.kind().as_str(),
    });
    (self.status(), Json(body)).into_response()
  }
}

/// Unwrap an extractor result, turning a rejection into the usual error body.
///
/// The caller is checked first, so a request without one is always 401.
pub fn accept<T, E>(ctx: &RequestContext, extracted: Result<T, E>) -> Result<T, ApiError>
where
  E: std::fmt::Display,
{
  ctx.caller()?;
  extracted.map_err(|e| ApiError(society_core::Error::invalid(e.to_string())))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn each_kind_has_its_status() {
    let cases = [
      (society_core::Error::Unauthenticated, StatusCode::UNAUTHORIZED),
      (society_core::Error::invalid("x"), StatusCode::BAD_REQUEST),
      (society_core::Error::not_found("x"), StatusCode::NOT_FOUND),
      (
        society_core::Error::store("get_owner", std::io::Error::other("disk")),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }
}
