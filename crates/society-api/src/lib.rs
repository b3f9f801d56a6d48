//! JSON HTTP API for the society service.
//!
//! Exposes an axum [`Router`] backed by any [`SocietyRepo`]. Caller identity
//! arrives in the `X-User-Uuid` header, set by an upstream gateway.

pub mod context;
pub mod error;
pub mod societies;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use society_core::{SocietyHandler, repo::SocietyRepo};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SOCIETY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Photo given to new societies. Falls back to the store's built-in
  /// default when unset.
  #[serde(default)]
  pub default_photo_url: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R> {
  pub handler: SocietyHandler<R>,
}

impl<R> Clone for AppState<R> {
  fn clone(&self) -> Self { Self { handler: self.handler.clone() } }
}

impl<R: SocietyRepo> AppState<R> {
  pub fn new(repo: Arc<R>) -> Self { Self { handler: SocietyHandler::new(repo) } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<R>(state: AppState<R>) -> Router
where
  R: SocietyRepo + 'static,
{
  Router::new()
    .route("/societies", get(societies::list::<R>).post(societies::create::<R>))
    .route(
      "/societies/{id}",
      get(societies::get_one::<R>)
        .put(societies::update::<R>)
        .delete(societies::remove::<R>),
    )
    .route(
      "/societies/{id}/subscription",
      post(societies::subscribe::<R>).delete(societies::unsubscribe::<R>),
    )
    .route("/users/{id}/societies", get(users::societies::<R>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use society_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use crate::context::USER_UUID_HEADER;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(AppState::new(Arc::new(store)))
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    caller: Option<&str>,
    body:   Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
      builder = builder.header(USER_UUID_HEADER, caller);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn send_raw(app: &Router, uri: &str, caller: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(caller) = caller {
      builder = builder.header(USER_UUID_HEADER, caller);
    }
    let req = builder.body(Body::from(body.to_owned())).unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create(app: &Router, caller: &str, name: &str, format_id: i64) -> String {
    let resp = send(
      app,
      "POST",
      "/societies",
      Some(caller),
      Some(json!({ "name": name, "formatId": format_id, "postPermissionId": 1, "isSearch": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["societyUUID"].as_str().unwrap().to_owned()
  }

  // ── Lifecycle ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chess_club_lifecycle() {
    let app = app().await;
    let id = create(&app, "u1", "Chess Club", 1).await;

    let resp = send(&app, "GET", &format!("/societies/{id}"), Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let info = json_body(resp).await;
    assert_eq!(info["name"], "Chess Club");
    assert_eq!(info["ownerUUID"], "u1");
    assert_eq!(info["description"], "");
    assert_eq!(info["subscriberCount"], 1);
    assert_eq!(info["canEditSociety"], true);

    let resp = send(&app, "POST", &format!("/societies/{id}/subscription"), Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, "GET", &format!("/societies/{id}"), Some("u2"), None).await;
    let info = json_body(resp).await;
    assert_eq!(info["subscriberCount"], 2);
    assert_eq!(info["canEditSociety"], false);

    let resp = send(&app, "GET", "/societies?limit=10&offset=0&name=chess", Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = json_body(resp).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["societies"][0]["societyUUID"], id.as_str());
    assert_eq!(list["societies"][0]["isMember"], true);

    let resp = send(&app, "DELETE", &format!("/societies/{id}/subscription"), Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, "DELETE", &format!("/societies/{id}"), Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, "GET", &format!("/societies/{id}"), Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_replaces_fields_for_editors_only() {
    let app = app().await;
    let id = create(&app, "u1", "Chess Club", 1).await;
    let update = json!({
      "name": "Chess Society",
      "description": "weekly games",
      "photoURL": "/img/chess.png",
      "formatId": 1,
      "postPermissionId": 2,
      "isSearch": false,
      "tagIds": [3, 7],
    });

    let resp = send(&app, "PUT", &format!("/societies/{id}"), Some("u2"), Some(update.clone())).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "peer is not Owner, Admin or Moderator");
    assert_eq!(body["kind"], "invalid_argument");

    let resp = send(&app, "PUT", &format!("/societies/{id}"), Some("u1"), Some(update)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let info = json_body(send(&app, "GET", &format!("/societies/{id}"), Some("u1"), None).await).await;
    assert_eq!(info["name"], "Chess Society");
    assert_eq!(info["description"], "weekly games");
    assert_eq!(info["tagIds"], json!([3, 7]));
  }

  #[tokio::test]
  async fn closed_society_records_a_request_instead() {
    let app = app().await;
    let id = create(&app, "u1", "Invite Only", 2).await;

    let resp = send(&app, "POST", &format!("/societies/{id}/subscription"), Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let info = json_body(send(&app, "GET", &format!("/societies/{id}"), Some("u2"), None).await).await;
    assert_eq!(info["subscriberCount"], 1);
  }

  #[tokio::test]
  async fn user_societies_lists_memberships() {
    let app = app().await;
    let a = create(&app, "u1", "A", 1).await;
    let _b = create(&app, "u2", "B", 1).await;

    let resp = send(&app, "GET", "/users/u1/societies?limit=10&offset=0", Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = json_body(resp).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["societies"][0]["societyUUID"], a.as_str());
    assert_eq!(list["societies"][0]["isMember"], false);

    let resp = send(&app, "GET", "/users/nobody/societies?limit=10", Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "societies": [], "total": 0 }));
  }

  // ── Error mapping ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_caller_is_unauthorized() {
    let app = app().await;
    let resp = send(&app, "POST", "/societies", None, Some(json!({ "name": "Chess Club" }))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "uuid not found in context");
    assert_eq!(body["kind"], "unauthenticated");

    let resp = send(&app, "GET", "/societies?limit=10", Some(""), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn empty_name_is_bad_request() {
    let app = app().await;
    let resp = send(&app, "POST", "/societies", Some("u1"), Some(json!({ "formatId": 1 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "name not provided");
  }

  #[tokio::test]
  async fn negative_page_bounds_are_bad_request() {
    let app = app().await;
    create(&app, "u1", "Chess Club", 1).await;
    let resp = send(&app, "GET", "/societies?limit=-1&offset=0", Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send(&app, "GET", "/users/u1/societies?limit=1&offset=-5", Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn no_matching_societies_is_not_found() {
    let app = app().await;
    create(&app, "u1", "Chess Club", 1).await;
    let resp = send(&app, "GET", "/societies?limit=10&name=zzz", Some("u1"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["kind"], "not_found");
  }

  #[tokio::test]
  async fn only_owner_may_remove() {
    let app = app().await;
    let id = create(&app, "u1", "Chess Club", 1).await;
    let resp = send(&app, "DELETE", &format!("/societies/{id}"), Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      json_body(resp).await["error"],
      "the user does not have the rights to delete the community"
    );
  }

  #[tokio::test]
  async fn duplicate_subscription_is_internal() {
    let app = app().await;
    let id = create(&app, "u1", "Chess Club", 1).await;
    let uri = format!("/societies/{id}/subscription");
    assert_eq!(send(&app, "POST", &uri, Some("u2"), None).await.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, "POST", &uri, Some("u2"), None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["kind"], "internal");
  }

  #[tokio::test]
  async fn malformed_body_is_bad_request_with_kind() {
    let app = app().await;
    let resp = send_raw(&app, "/societies", Some("u1"), "{not json").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
      "application/json"
    );
    let body = json_body(resp).await;
    assert_eq!(body["kind"], "invalid_argument");
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
  }

  #[tokio::test]
  async fn missing_caller_wins_over_malformed_body() {
    let app = app().await;
    let resp = send_raw(&app, "/societies", None, "{not json").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["kind"], "unauthenticated");
  }

  #[tokio::test]
  async fn malformed_query_is_bad_request_with_kind() {
    let app = app().await;
    for uri in ["/societies?limit=abc", "/users/u1/societies?offset=abc"] {
      let resp = send(&app, "GET", uri, Some("u1"), None).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
      assert_eq!(json_body(resp).await["kind"], "invalid_argument", "{uri}");
    }

    let resp = send(&app, "GET", "/societies?limit=abc", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
