//! [`SocietyHandler`]: validation, authorization and orchestration of every
//! society operation.
//!
//! Each operation resolves the caller first, then validates its input, then
//! checks rights, and only then mutates. Repository failures abort the
//! operation and surface as [`Error::Store`] tagged with the failing call.

use std::{collections::HashMap, sync::Arc};

use tracing::{Instrument as _, Span};

use crate::{
  Error, RequestContext, Result,
  messages::{
    CreateSocietyIn, CreateSocietyOut, SocietiesForUserIn, SocietyInfo, SocietyListItem,
    SocietyListOut, SocietyWithOffsetIn, UpdateSocietyIn,
  },
  repo::SocietyRepo,
  society::{NewSociety, Role, SocietyQuery, SocietySummary, SocietyUpdate, is_open_format},
};

/// Stateless request handler over a [`SocietyRepo`].
///
/// Cloning is cheap; the repository is reference-counted.
pub struct SocietyHandler<R> {
  repo: Arc<R>,
}

impl<R> Clone for SocietyHandler<R> {
  fn clone(&self) -> Self { Self { repo: Arc::clone(&self.repo) } }
}

impl<R: SocietyRepo> SocietyHandler<R> {
  pub fn new(repo: Arc<R>) -> Self { Self { repo } }

  // ── Create ────────────────────────────────────────────────────────────

  /// Create a society owned by the caller.
  pub async fn create_society(
    &self,
    ctx: &RequestContext,
    input: CreateSocietyIn,
  ) -> Result<CreateSocietyOut> {
    async move {
      let caller = caller(ctx)?;
      if input.name.is_empty() {
        return Err(reject("name not provided"));
      }

      let society_uuid = self
        .repo
        .create_society(NewSociety {
          name:               input.name,
          format_id:          input.format_id,
          post_permission_id: input.post_permission_id,
          is_search:          input.is_search,
          owner_uuid:         caller.to_owned(),
        })
        .await
        .map_err(store("create_society"))?;

      tracing::info!(society = %society_uuid, "society created");
      Ok(CreateSocietyOut { society_uuid })
    }
    .instrument(op_span("create_society", ctx))
    .await
  }

  // ── Read ──────────────────────────────────────────────────────────────

  /// Full detail of one society, with `can_edit_society` computed for the
  /// caller.
  pub async fn get_society_info(
    &self,
    ctx: &RequestContext,
    society_uuid: &str,
  ) -> Result<SocietyInfo> {
    async move {
      let caller = caller(ctx)?;
      if society_uuid.is_empty() {
        return Err(reject("societyUUID not provided"));
      }

      let record = self
        .repo
        .get_society_info(society_uuid)
        .await
        .map_err(store("get_society_info"))?
        .ok_or_else(|| missing_society(society_uuid))?;

      let subscriber_count = self
        .repo
        .count_subscribe(society_uuid)
        .await
        .map_err(store("count_subscribe"))?;

      let tag_ids = self
        .repo
        .get_tags(society_uuid)
        .await
        .map_err(store("get_tags"))?;

      let role = self
        .repo
        .is_owner_admin_moderator(caller, society_uuid)
        .await
        .map_err(store("is_owner_admin_moderator"))?;

      Ok(SocietyInfo {
        name: record.name,
        description: record.description.unwrap_or_default(),
        owner_uuid: record.owner_uuid,
        photo_url: record.photo_url,
        format_id: record.format_id,
        post_permission_id: record.post_permission_id,
        is_search: record.is_search,
        subscriber_count,
        tag_ids,
        can_edit_society: Role::from_raw(role).can_edit(),
      })
    }
    .instrument(op_span("get_society_info", ctx))
    .await
  }

  // ── Update ────────────────────────────────────────────────────────────

  /// Replace every editable field of a society. Requires owner, admin or
  /// moderator rights.
  pub async fn update_society(&self, ctx: &RequestContext, input: UpdateSocietyIn) -> Result<()> {
    async move {
      let caller = caller(ctx)?;
      if input.society_uuid.is_empty() {
        return Err(reject("societyUUID not provided"));
      }
      if input.name.is_empty() {
        return Err(reject("name not provided"));
      }

      self.require_editor(caller, &input.society_uuid).await?;

      let society_uuid = input.society_uuid.clone();
      self
        .repo
        .update_society(SocietyUpdate {
          society_uuid:       input.society_uuid,
          name:               input.name,
          description:        input.description,
          photo_url:          input.photo_url,
          format_id:          input.format_id,
          post_permission_id: input.post_permission_id,
          is_search:          input.is_search,
          tag_ids:            input.tag_ids,
        })
        .await
        .map_err(store("update_society"))?;

      tracing::info!(society = %society_uuid, "society updated");
      Ok(())
    }
    .instrument(op_span("update_society", ctx))
    .await
  }

  // ── Remove ────────────────────────────────────────────────────────────

  /// Delete a society and everything hanging off it. Owner only.
  pub async fn remove_society(&self, ctx: &RequestContext, society_uuid: &str) -> Result<()> {
    async move {
      let caller = caller(ctx)?;
      if society_uuid.is_empty() {
        return Err(reject("societyUUID not provided"));
      }

      let owner = self
        .repo
        .get_owner(society_uuid)
        .await
        .map_err(store("get_owner"))?
        .ok_or_else(|| missing_society(society_uuid))?;

      if owner != caller {
        return Err(reject("the user does not have the rights to delete the community"));
      }

      // Dependents first: requests and memberships reference the society row.
      let id = society_uuid.to_owned();
      self
        .repo
        .with_transaction(move |tx| {
          tx.remove_society_has_tags_entry(&id)?;
          tx.remove_members_request_entry(&id)?;
          tx.remove_society_members_entry(&id)?;
          tx.remove_society(&id)
        })
        .await
        .map_err(store("remove_society"))?;

      tracing::info!(society = %society_uuid, "society removed");
      Ok(())
    }
    .instrument(op_span("remove_society", ctx))
    .await
  }

  // ── Membership ────────────────────────────────────────────────────────

  /// Join an open society, or file a join request for any other format.
  pub async fn subscribe_to_society(&self, ctx: &RequestContext, society_uuid: &str) -> Result<()> {
    async move {
      let caller = caller(ctx)?;
      if society_uuid.is_empty() {
        return Err(reject("societyUUID not provided"));
      }

      let format_id = self
        .repo
        .get_format_society(society_uuid)
        .await
        .map_err(store("get_format_society"))?
        .ok_or_else(|| missing_society(society_uuid))?;

      if is_open_format(format_id) {
        self
          .repo
          .add_society_members(caller, society_uuid)
          .await
          .map_err(store("add_society_members"))?;
        tracing::debug!(society = %society_uuid, "joined open society");
      } else {
        self
          .repo
          .add_members_requests(caller, society_uuid)
          .await
          .map_err(store("add_members_requests"))?;
        tracing::debug!(society = %society_uuid, format_id, "join request filed");
      }
      Ok(())
    }
    .instrument(op_span("subscribe_to_society", ctx))
    .await
  }

  /// Leave a society. Any member may leave, owners included.
  pub async fn unsubscribe_to_society(
    &self,
    ctx: &RequestContext,
    society_uuid: &str,
  ) -> Result<()> {
    async move {
      let caller = caller(ctx)?;
      if society_uuid.is_empty() {
        return Err(reject("societyUUID not provided"));
      }

      let role = self
        .repo
        .get_role_society_members(caller, society_uuid)
        .await
        .map_err(store("get_role_society_members"))?;

      let Some(role) = role else {
        return Err(Error::not_found("not a member of the society"));
      };
      if role == Role::OWNER {
        tracing::warn!(society = %society_uuid, "owner is leaving their society");
      }

      self
        .repo
        .unsubscribe_to_society(caller, society_uuid)
        .await
        .map_err(store("unsubscribe_to_society"))?;
      Ok(())
    }
    .instrument(op_span("unsubscribe_to_society", ctx))
    .await
  }

  // ── Listings ──────────────────────────────────────────────────────────

  /// One page of societies, optionally filtered by name.
  ///
  /// `total` counts every society matching the filter, not just this page.
  /// An empty page is reported as [`Error::NotFound`].
  pub async fn get_society_with_offset(
    &self,
    ctx: &RequestContext,
    input: SocietyWithOffsetIn,
  ) -> Result<SocietyListOut> {
    async move {
      let caller = caller(ctx)?;
      let (limit, offset) = page_bounds(input.limit, input.offset)?;
      let query = SocietyQuery { name: input.name, limit, offset };

      let page = self
        .repo
        .get_society_with_offset(&query)
        .await
        .map_err(store("get_society_with_offset"))?;

      if page.is_empty() {
        return Err(Error::not_found("no societies found"));
      }

      let total = self
        .repo
        .count_society_with_offset(&query)
        .await
        .map_err(store("count_society_with_offset"))?;

      let societies = self.with_membership(caller, page).await?;
      Ok(SocietyListOut { societies, total })
    }
    .instrument(op_span("get_society_with_offset", ctx))
    .await
  }

  /// One page of the societies a given user belongs to, with `is_member`
  /// resolved for the caller. An empty page is a valid, empty result.
  pub async fn get_societies_for_user(
    &self,
    ctx: &RequestContext,
    input: SocietiesForUserIn,
  ) -> Result<SocietyListOut> {
    async move {
      let caller = caller(ctx)?;
      if input.user_uuid.is_empty() {
        return Err(reject("userUUID not provided"));
      }
      let (limit, offset) = page_bounds(input.limit, input.offset)?;

      let ids = self
        .repo
        .get_user_societies(limit, offset, &input.user_uuid)
        .await
        .map_err(store("get_user_societies"))?;

      if ids.is_empty() {
        return Ok(SocietyListOut { societies: Vec::new(), total: 0 });
      }

      let mut by_id: HashMap<String, SocietySummary> = self
        .repo
        .get_info_society(&ids)
        .await
        .map_err(store("get_info_society"))?
        .into_iter()
        .map(|s| (s.society_uuid.clone(), s))
        .collect();

      let page: Vec<SocietySummary> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
      let societies = self.with_membership(caller, page).await?;
      let total = societies.len() as i64;
      Ok(SocietyListOut { societies, total })
    }
    .instrument(op_span("get_societies_for_user", ctx))
    .await
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  /// Fail unless `caller` is owner, admin or moderator of the society.
  async fn require_editor(&self, caller: &str, society_uuid: &str) -> Result<()> {
    let raw = self
      .repo
      .is_owner_admin_moderator(caller, society_uuid)
      .await
      .map_err(store("is_owner_admin_moderator"))?;

    if !Role::from_raw(raw).can_edit() {
      tracing::warn!(society = %society_uuid, role = raw, "edit rejected");
      return Err(Error::invalid("peer is not Owner, Admin or Moderator"));
    }
    Ok(())
  }

  /// Resolve `is_member` for a whole page in one repository call.
  async fn with_membership(
    &self,
    caller: &str,
    page: Vec<SocietySummary>,
  ) -> Result<Vec<SocietyListItem>> {
    let ids: Vec<String> = page.iter().map(|s| s.society_uuid.clone()).collect();
    let membership = self
      .repo
      .get_member_of_societies(caller, &ids)
      .await
      .map_err(store("get_member_of_societies"))?;

    Ok(
      page
        .into_iter()
        .map(|s| SocietyListItem {
          is_member:    membership.get(&s.society_uuid).copied().unwrap_or(false),
          society_uuid: s.society_uuid,
          name:         s.name,
          photo_url:    s.photo_url,
          format_id:    s.format_id,
        })
        .collect(),
    )
  }
}

// ─── Free helpers ────────────────────────────────────────────────────────────

fn op_span(op: &'static str, ctx: &RequestContext) -> Span {
  tracing::info_span!(
    "society",
    op,
    request_id = %ctx.request_id(),
    caller = ctx.caller().unwrap_or("-"),
  )
}

fn caller(ctx: &RequestContext) -> Result<&str> {
  ctx.caller().inspect_err(|_| tracing::warn!("caller id missing from context"))
}

fn reject(msg: &str) -> Error {
  tracing::warn!(reason = msg, "request rejected");
  Error::invalid(msg)
}

fn missing_society(society_uuid: &str) -> Error {
  Error::not_found(format!("society {society_uuid} not found"))
}

/// Convert signed page bounds, rejecting negatives.
fn page_bounds(limit: i64, offset: i64) -> Result<(u64, u64)> {
  let limit = u64::try_from(limit).map_err(|_| reject("limit must not be negative"))?;
  let offset = u64::try_from(offset).map_err(|_| reject("offset must not be negative"))?;
  Ok((limit, offset))
}

fn store<E>(op: &'static str) -> impl FnOnce(E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  move |e| {
    tracing::error!(op, error = %e, "repository call failed");
    Error::store(op, e)
  }
}
