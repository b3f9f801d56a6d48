//! Society, membership and listing types shared by the handler and the
//! storage adapters.

// ─── Roles ───────────────────────────────────────────────────────────────────

/// A member's rank within a society.
///
/// Stored as an integer; `0` is the sentinel the port uses for "not a
/// member", and every value outside `1..=3` is an ordinary member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Owner,
  Admin,
  Moderator,
  Member,
  /// The caller holds no membership row.
  None,
}

impl Role {
  pub const OWNER: i64 = 1;
  pub const ADMIN: i64 = 2;
  pub const MODERATOR: i64 = 3;
  /// Role assigned to members who join an open society.
  pub const MEMBER: i64 = 4;
  pub const NOT_A_MEMBER: i64 = 0;

  pub fn from_raw(raw: i64) -> Self {
    match raw {
      Self::NOT_A_MEMBER => Role::None,
      Self::OWNER => Role::Owner,
      Self::ADMIN => Role::Admin,
      Self::MODERATOR => Role::Moderator,
      _ => Role::Member,
    }
  }

  /// Whether this role may edit the society. The only place the
  /// owner/admin/moderator threshold is defined.
  pub fn can_edit(self) -> bool {
    matches!(self, Role::Owner | Role::Admin | Role::Moderator)
  }
}

// ─── Formats ─────────────────────────────────────────────────────────────────

/// Format id of an open society: subscribing joins immediately.
pub const FORMAT_OPEN: i64 = 1;

/// Whether subscribing to a society of this format skips the join-request
/// workflow.
pub fn is_open_format(format_id: i64) -> bool { format_id == FORMAT_OPEN }

/// Status id of a membership request awaiting review.
pub const REQUEST_STATUS_PENDING: i64 = 1;

/// Payment status recorded for new memberships.
pub const PAYMENT_STATUS_DEFAULT: i64 = 1;

// ─── Records ─────────────────────────────────────────────────────────────────

/// Everything needed to create a society and its owner membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSociety {
  pub name:               String,
  pub format_id:          i64,
  pub post_permission_id: i64,
  pub is_search:          bool,
  pub owner_uuid:         String,
}

/// The core columns of a society row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocietyRecord {
  pub name:               String,
  /// `None` when the column is NULL.
  pub description:        Option<String>,
  pub owner_uuid:         String,
  pub photo_url:          String,
  pub format_id:          i64,
  pub post_permission_id: i64,
  pub is_search:          bool,
}

/// A full replacement of a society's editable fields, tag set included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocietyUpdate {
  pub society_uuid:       String,
  pub name:               String,
  pub description:        String,
  pub photo_url:          String,
  pub format_id:          i64,
  pub post_permission_id: i64,
  pub is_search:          bool,
  pub tag_ids:            Vec<i64>,
}

/// One row of a society listing, before membership is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocietySummary {
  pub society_uuid: String,
  pub name:         String,
  pub photo_url:    String,
  pub format_id:    i64,
}

/// Page parameters for [`SocietyRepo::get_society_with_offset`](crate::repo::SocietyRepo::get_society_with_offset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocietyQuery {
  /// Case-insensitive substring matched against the society name. Empty
  /// matches everything.
  pub name:   String,
  pub limit:  u64,
  pub offset: u64,
}
