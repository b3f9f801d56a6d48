//! Request and response shapes of the society operations.
//!
//! Field names on the wire follow the established client contract
//! (`societyUUID`, `formatId`, `isSearch`, ...), hence the explicit renames.

use serde::{Deserialize, Serialize};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSocietyIn {
  #[serde(default)]
  pub name:               String,
  #[serde(default)]
  pub format_id:          i64,
  #[serde(default)]
  pub post_permission_id: i64,
  #[serde(default)]
  pub is_search:          bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateSocietyOut {
  #[serde(rename = "societyUUID")]
  pub society_uuid: String,
}

// ─── Info ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyInfo {
  pub name:               String,
  /// Never null; an unset description is the empty string.
  pub description:        String,
  #[serde(rename = "ownerUUID")]
  pub owner_uuid:         String,
  #[serde(rename = "photoURL")]
  pub photo_url:          String,
  pub format_id:          i64,
  pub post_permission_id: i64,
  pub is_search:          bool,
  pub subscriber_count:   i64,
  pub tag_ids:            Vec<i64>,
  pub can_edit_society:   bool,
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Replaces every editable field of a society.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSocietyIn {
  #[serde(rename = "societyUUID", default)]
  pub society_uuid:       String,
  #[serde(default)]
  pub name:               String,
  #[serde(default)]
  pub description:        String,
  #[serde(rename = "photoURL", default)]
  pub photo_url:          String,
  #[serde(default)]
  pub format_id:          i64,
  #[serde(default)]
  pub post_permission_id: i64,
  #[serde(default)]
  pub is_search:          bool,
  #[serde(default)]
  pub tag_ids:            Vec<i64>,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SocietyWithOffsetIn {
  #[serde(default)]
  pub limit:  i64,
  #[serde(default)]
  pub offset: i64,
  /// Optional case-insensitive name filter.
  #[serde(default)]
  pub name:   String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SocietiesForUserIn {
  #[serde(rename = "userUUID", default)]
  pub user_uuid: String,
  #[serde(default)]
  pub limit:     i64,
  #[serde(default)]
  pub offset:    i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyListItem {
  #[serde(rename = "societyUUID")]
  pub society_uuid: String,
  pub name:         String,
  #[serde(rename = "photoURL")]
  pub photo_url:    String,
  pub is_member:    bool,
  pub format_id:    i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SocietyListOut {
  pub societies: Vec<SocietyListItem>,
  pub total:     i64,
}
