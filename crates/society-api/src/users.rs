//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{id}/societies` | `?limit=&offset=`; an empty page is `200` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use society_core::{
  messages::{SocietiesForUserIn, SocietyListOut},
  repo::SocietyRepo,
};

use crate::{
  AppState,
  context::Caller,
  error::{ApiError, accept},
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub limit:  i64,
  #[serde(default)]
  pub offset: i64,
}

/// `GET /users/{id}/societies[?limit=&offset=]`
pub async fn societies<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(user_uuid): Path<String>,
  page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<SocietyListOut>, ApiError> {
  let Query(page) = accept(&ctx, page)?;
  let input = SocietiesForUserIn { user_uuid, limit: page.limit, offset: page.offset };
  let out = state.handler.get_societies_for_user(&ctx, input).await?;
  Ok(Json(out))
}
