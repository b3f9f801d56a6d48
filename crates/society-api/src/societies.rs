//! Handlers for `/societies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/societies` | `?limit=&offset=&name=`; 404 on an empty page |
//! | `POST`   | `/societies` | Body: `{"name":"..","formatId":1,..}`; 201 |
//! | `GET`    | `/societies/{id}` | 404 if not found |
//! | `PUT`    | `/societies/{id}` | Full replacement; 204 |
//! | `DELETE` | `/societies/{id}` | Owner only; 204 |
//! | `POST`   | `/societies/{id}/subscription` | Join or request to join; 204 |
//! | `DELETE` | `/societies/{id}/subscription` | Leave; 204 |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use society_core::{
  messages::{
    CreateSocietyIn, CreateSocietyOut, SocietyInfo, SocietyListOut, SocietyWithOffsetIn,
    UpdateSocietyIn,
  },
  repo::SocietyRepo,
};

use crate::{
  AppState,
  context::Caller,
  error::{ApiError, accept},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /societies[?limit=&offset=&name=]`
pub async fn list<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  params: Result<Query<SocietyWithOffsetIn>, QueryRejection>,
) -> Result<Json<SocietyListOut>, ApiError> {
  let Query(params) = accept(&ctx, params)?;
  let page = state.handler.get_society_with_offset(&ctx, params).await?;
  Ok(Json(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /societies`
pub async fn create<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  body: Result<Json<CreateSocietyIn>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSocietyOut>), ApiError> {
  let Json(body) = accept(&ctx, body)?;
  let created = state.handler.create_society(&ctx, body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /societies/{id}`
pub async fn get_one<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(id): Path<String>,
) -> Result<Json<SocietyInfo>, ApiError> {
  let info = state.handler.get_society_info(&ctx, &id).await?;
  Ok(Json(info))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /societies/{id}`. The path id wins over any `societyUUID` in the
/// body.
pub async fn update<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(id): Path<String>,
  body: Result<Json<UpdateSocietyIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(mut body) = accept(&ctx, body)?;
  body.society_uuid = id;
  state.handler.update_society(&ctx, body).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /societies/{id}`
pub async fn remove<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  state.handler.remove_society(&ctx, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Subscription ─────────────────────────────────────────────────────────────

/// `POST /societies/{id}/subscription`
pub async fn subscribe<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  state.handler.subscribe_to_society(&ctx, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /societies/{id}/subscription`
pub async fn unsubscribe<R: SocietyRepo>(
  State(state): State<AppState<R>>,
  Caller(ctx): Caller,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  state.handler.unsubscribe_to_society(&ctx, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}
