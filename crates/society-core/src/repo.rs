//! The `SocietyRepo` port and its transaction scope.
//!
//! Storage backends (e.g. `society-store-sqlite`) implement this trait. The
//! handler depends on the abstraction only and never sees a driver type.

use std::{collections::HashMap, future::Future};

use crate::society::{NewSociety, SocietyQuery, SocietyRecord, SocietySummary, SocietyUpdate};

// ─── Transaction scope ───────────────────────────────────────────────────────

/// Statements available inside [`SocietyRepo::with_transaction`].
///
/// All calls made through one `Transaction` commit together or not at all.
pub trait Transaction {
  type Error;

  /// Mark every tag association of the society inactive. Rows are kept.
  fn remove_society_has_tags_entry(&mut self, society_uuid: &str) -> Result<(), Self::Error>;

  /// Delete all pending membership requests for the society.
  fn remove_members_request_entry(&mut self, society_uuid: &str) -> Result<(), Self::Error>;

  /// Delete all memberships of the society, the owner's included.
  fn remove_society_members_entry(&mut self, society_uuid: &str) -> Result<(), Self::Error>;

  /// Delete the society row itself.
  fn remove_society(&mut self, society_uuid: &str) -> Result<(), Self::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store backing the society service.
///
/// All methods return `Send` futures so the trait can be driven from a
/// multi-threaded runtime.
pub trait SocietyRepo: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Societies ─────────────────────────────────────────────────────────

  /// Insert the society row and the owner's membership (role 1) as one unit.
  /// Returns the new society id. Either both rows exist afterwards or
  /// neither does.
  fn create_society(
    &self,
    society: NewSociety,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Core columns of a society. `None` if it does not exist.
  fn get_society_info<'a>(
    &'a self,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<Option<SocietyRecord>, Self::Error>> + Send + 'a;

  /// Overwrite every editable column and replace the active tag set.
  fn update_society(
    &self,
    update: SocietyUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Owner id of a society. `None` if it does not exist.
  fn get_owner<'a>(
    &'a self,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Format id of a society. `None` if it does not exist.
  fn get_format_society<'a>(
    &'a self,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;

  /// Ids of the society's active tag associations.
  fn get_tags<'a>(
    &'a self,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + 'a;

  /// Number of membership rows, owner included.
  fn count_subscribe<'a>(
    &'a self,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  // ── Membership ────────────────────────────────────────────────────────

  /// The member's raw role, or `0` when they hold no membership.
  fn is_owner_admin_moderator<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// The member's raw role, or `None` when they hold no membership.
  fn get_role_society_members<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;

  /// Record a pending request to join.
  fn add_members_requests<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Add a regular membership.
  fn add_society_members<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the member's membership row.
  fn unsubscribe_to_society<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// For each of `society_uuids`, whether `member_uuid` belongs to it.
  /// Every requested id is present in the returned map.
  fn get_member_of_societies<'a>(
    &'a self,
    member_uuid: &'a str,
    society_uuids: &'a [String],
  ) -> impl Future<Output = Result<HashMap<String, bool>, Self::Error>> + Send + 'a;

  // ── Listings ──────────────────────────────────────────────────────────

  /// One page of societies whose name contains `query.name`.
  fn get_society_with_offset<'a>(
    &'a self,
    query: &'a SocietyQuery,
  ) -> impl Future<Output = Result<Vec<SocietySummary>, Self::Error>> + Send + 'a;

  /// Number of societies whose name contains `query.name`, ignoring the
  /// page bounds.
  fn count_society_with_offset<'a>(
    &'a self,
    query: &'a SocietyQuery,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Ids of one page of the societies a user belongs to.
  fn get_user_societies<'a>(
    &'a self,
    limit: u64,
    offset: u64,
    user_uuid: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// Listing rows for the given societies. Unknown ids are skipped.
  fn get_info_society<'a>(
    &'a self,
    society_uuids: &'a [String],
  ) -> impl Future<Output = Result<Vec<SocietySummary>, Self::Error>> + Send + 'a;

  // ── Transactions ──────────────────────────────────────────────────────

  /// Run `f` inside a single transaction. Commits when `f` returns `Ok`;
  /// rolls back when it returns `Err` or panics.
  fn with_transaction<F, T>(
    &self,
    f: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut dyn Transaction<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
    T: Send + 'static;
}
