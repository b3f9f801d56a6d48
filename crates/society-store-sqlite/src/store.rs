//! [`SqliteStore`], the SQLite implementation of [`SocietyRepo`].

use std::{
  collections::{HashMap, HashSet},
  path::Path,
  sync::Arc,
};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use society_core::{
  repo::{SocietyRepo, Transaction},
  society::{
    NewSociety, PAYMENT_STATUS_DEFAULT, REQUEST_STATUS_PENDING, Role, SocietyQuery,
    SocietyRecord, SocietySummary, SocietyUpdate,
  },
};

use crate::{
  Error, Result,
  encode::{encode_dt, encode_u64, like_pattern, placeholders},
  schema::SCHEMA,
};

/// Photo assigned to new societies until one is uploaded.
pub const DEFAULT_PHOTO_URL: &str = "/static/avatars/society-default.png";

/// Ids bound per `IN (...)` statement. SQLite caps bound variables at 32766,
/// and a page of listing ids has no upper size.
const IN_LIST_CHUNK: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A society store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:   tokio_rusqlite::Connection,
  default_photo_url: Arc<str>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Use `url` as the photo of newly created societies.
  pub fn with_default_photo_url(mut self, url: impl Into<Arc<str>>) -> Self {
    self.default_photo_url = url.into();
    self
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, default_photo_url: Arc::from(DEFAULT_PHOTO_URL) })
  }

  /// Insert a row keyed by (member, society), translating constraint
  /// violations into domain errors. `extra` binds from `?3` onwards.
  async fn insert_member_row(
    &self,
    sql: &'static str,
    member_uuid: &str,
    society_uuid: &str,
    extra: Vec<Value>,
  ) -> Result<()> {
    let mut params = vec![
      Value::from(member_uuid.to_owned()),
      Value::from(society_uuid.to_owned()),
    ];
    params.extend(extra);

    let conflict = self
      .conn
      .call(move |conn| match conn.execute(sql, rusqlite::params_from_iter(params)) {
        Ok(_) => Ok(None),
        Err(e) => match Conflict::of(&e) {
          Some(c) => Ok(Some(c)),
          None => Err(e.into()),
        },
      })
      .await?;

    match conflict {
      None => Ok(()),
      Some(Conflict::Duplicate) => Err(Error::AlreadySubscribed {
        member_uuid:  member_uuid.to_owned(),
        society_uuid: society_uuid.to_owned(),
      }),
      Some(Conflict::MissingSociety) => Err(Error::SocietyNotFound(society_uuid.to_owned())),
    }
  }
}

/// Constraint violations worth reporting as something other than a raw
/// database error.
enum Conflict {
  Duplicate,
  MissingSociety,
}

impl Conflict {
  fn of(e: &rusqlite::Error) -> Option<Self> {
    let rusqlite::Error::SqliteFailure(failure, _) = e else {
      return None;
    };
    match failure.extended_code {
      rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
        Some(Conflict::Duplicate)
      }
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Conflict::MissingSociety),
      _ => None,
    }
  }
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SocietySummary> {
  Ok(SocietySummary {
    society_uuid: row.get(0)?,
    name:         row.get(1)?,
    photo_url:    row.get(2)?,
    format_id:    row.get(3)?,
  })
}

// ─── Transaction scope ───────────────────────────────────────────────────────

struct SqliteTransaction<'c> {
  tx: rusqlite::Transaction<'c>,
}

impl SqliteTransaction<'_> {
  fn run(&self, step: &'static str, sql: &str, society_uuid: &str) -> Result<()> {
    self
      .tx
      .execute(sql, rusqlite::params![society_uuid])
      .map(|_| ())
      .map_err(|source| Error::Statement { step, source })
  }
}

impl Transaction for SqliteTransaction<'_> {
  type Error = Error;

  fn remove_society_has_tags_entry(&mut self, society_uuid: &str) -> Result<()> {
    self.run(
      "remove_society_has_tags_entry",
      "UPDATE society_has_tags SET is_active = 0 WHERE society_id = ?1",
      society_uuid,
    )
  }

  fn remove_members_request_entry(&mut self, society_uuid: &str) -> Result<()> {
    self.run(
      "remove_members_request_entry",
      "DELETE FROM members_requests WHERE society_id = ?1",
      society_uuid,
    )
  }

  fn remove_society_members_entry(&mut self, society_uuid: &str) -> Result<()> {
    self.run(
      "remove_society_members_entry",
      "DELETE FROM society_members WHERE society_id = ?1",
      society_uuid,
    )
  }

  fn remove_society(&mut self, society_uuid: &str) -> Result<()> {
    self.run("remove_society", "DELETE FROM society WHERE id = ?1", society_uuid)
  }
}

// ─── SocietyRepo impl ────────────────────────────────────────────────────────

impl SocietyRepo for SqliteStore {
  type Error = Error;

  // ── Societies ─────────────────────────────────────────────────────────────

  async fn create_society(&self, society: NewSociety) -> Result<String> {
    let id = Uuid::new_v4().hyphenated().to_string();
    let id_str = id.clone();
    let at_str = encode_dt(Utc::now());
    let photo = self.default_photo_url.to_string();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO society (
             id, name, owner_uuid, photo_url, format_id,
             post_permission_id, is_search, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            society.name,
            society.owner_uuid,
            photo,
            society.format_id,
            society.post_permission_id,
            society.is_search,
            at_str,
          ],
        )?;
        tx.execute(
          "INSERT INTO society_members (society_id, user_uuid, role, payment_status)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, society.owner_uuid, Role::OWNER, PAYMENT_STATUS_DEFAULT],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(society = %id, "society and owner membership inserted");
    Ok(id)
  }

  async fn get_society_info(&self, society_uuid: &str) -> Result<Option<SocietyRecord>> {
    let id_str = society_uuid.to_owned();

    let record = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name, description, owner_uuid, photo_url,
                      format_id, post_permission_id, is_search
               FROM society WHERE id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(SocietyRecord {
                  name:               row.get(0)?,
                  description:        row.get(1)?,
                  owner_uuid:         row.get(2)?,
                  photo_url:          row.get(3)?,
                  format_id:          row.get(4)?,
                  post_permission_id: row.get(5)?,
                  is_search:          row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(record)
  }

  async fn update_society(&self, update: SocietyUpdate) -> Result<()> {
    let society_uuid = update.society_uuid.clone();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE society
           SET name = ?2, description = ?3, photo_url = ?4, format_id = ?5,
               post_permission_id = ?6, is_search = ?7
           WHERE id = ?1",
          rusqlite::params![
            update.society_uuid,
            update.name,
            update.description,
            update.photo_url,
            update.format_id,
            update.post_permission_id,
            update.is_search,
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }

        tx.execute(
          "UPDATE society_has_tags SET is_active = 0 WHERE society_id = ?1",
          rusqlite::params![update.society_uuid],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO society_has_tags (society_id, tag_id, is_active)
             VALUES (?1, ?2, 1)
             ON CONFLICT (society_id, tag_id) DO UPDATE SET is_active = 1",
          )?;
          for tag_id in &update.tag_ids {
            stmt.execute(rusqlite::params![update.society_uuid, tag_id])?;
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::SocietyNotFound(society_uuid));
    }
    Ok(())
  }

  async fn get_owner(&self, society_uuid: &str) -> Result<Option<String>> {
    let id_str = society_uuid.to_owned();

    let owner = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT owner_uuid FROM society WHERE id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(owner)
  }

  async fn get_format_society(&self, society_uuid: &str) -> Result<Option<i64>> {
    let id_str = society_uuid.to_owned();

    let format_id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT format_id FROM society WHERE id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(format_id)
  }

  async fn get_tags(&self, society_uuid: &str) -> Result<Vec<i64>> {
    let id_str = society_uuid.to_owned();

    let tags = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT tag_id FROM society_has_tags
           WHERE society_id = ?1 AND is_active = 1
           ORDER BY tag_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(tags)
  }

  async fn count_subscribe(&self, society_uuid: &str) -> Result<i64> {
    let id_str = society_uuid.to_owned();

    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM society_members WHERE society_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count)
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn is_owner_admin_moderator(&self, member_uuid: &str, society_uuid: &str) -> Result<i64> {
    let role = self.get_role_society_members(member_uuid, society_uuid).await?;
    Ok(role.unwrap_or(Role::NOT_A_MEMBER))
  }

  async fn get_role_society_members(
    &self,
    member_uuid: &str,
    society_uuid: &str,
  ) -> Result<Option<i64>> {
    let member = member_uuid.to_owned();
    let society = society_uuid.to_owned();

    let role = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT role FROM society_members WHERE society_id = ?1 AND user_uuid = ?2",
              rusqlite::params![society, member],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(role)
  }

  async fn add_members_requests(&self, member_uuid: &str, society_uuid: &str) -> Result<()> {
    self
      .insert_member_row(
        "INSERT INTO members_requests (user_uuid, society_id, status_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        member_uuid,
        society_uuid,
        vec![Value::from(REQUEST_STATUS_PENDING), Value::from(encode_dt(Utc::now()))],
      )
      .await
  }

  async fn add_society_members(&self, member_uuid: &str, society_uuid: &str) -> Result<()> {
    self
      .insert_member_row(
        "INSERT INTO society_members (user_uuid, society_id, role, payment_status)
         VALUES (?1, ?2, ?3, ?4)",
        member_uuid,
        society_uuid,
        vec![Value::from(Role::MEMBER), Value::from(PAYMENT_STATUS_DEFAULT)],
      )
      .await
  }

  async fn unsubscribe_to_society(&self, member_uuid: &str, society_uuid: &str) -> Result<()> {
    let member = member_uuid.to_owned();
    let society = society_uuid.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM society_members WHERE society_id = ?1 AND user_uuid = ?2",
          rusqlite::params![society, member],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn get_member_of_societies(
    &self,
    member_uuid: &str,
    society_uuids: &[String],
  ) -> Result<HashMap<String, bool>> {
    if society_uuids.is_empty() {
      return Ok(HashMap::new());
    }

    let member = member_uuid.to_owned();
    let ids = society_uuids.to_vec();

    let joined: HashSet<String> = self
      .conn
      .call(move |conn| {
        let mut joined = HashSet::new();
        for chunk in ids.chunks(IN_LIST_CHUNK) {
          let sql = format!(
            "SELECT society_id FROM society_members
             WHERE user_uuid = ?1 AND society_id IN ({})",
            placeholders(2, chunk.len())
          );
          let mut stmt = conn.prepare_cached(&sql)?;
          let params = std::iter::once(&member).chain(chunk.iter());
          for row in stmt.query_map(rusqlite::params_from_iter(params), |row| row.get(0))? {
            joined.insert(row?);
          }
        }
        Ok(joined)
      })
      .await?;

    Ok(
      society_uuids
        .iter()
        .map(|id| (id.clone(), joined.contains(id)))
        .collect(),
    )
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn get_society_with_offset(&self, query: &SocietyQuery) -> Result<Vec<SocietySummary>> {
    let pattern = like_pattern(&query.name);
    let limit = encode_u64(query.limit);
    let offset = encode_u64(query.offset);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, photo_url, format_id FROM society
           WHERE name LIKE ?1 ESCAPE '\\'
           ORDER BY rowid
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit, offset], summary_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn count_society_with_offset(&self, query: &SocietyQuery) -> Result<i64> {
    let pattern = like_pattern(&query.name);

    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM society WHERE name LIKE ?1 ESCAPE '\\'",
          rusqlite::params![pattern],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count)
  }

  async fn get_user_societies(
    &self,
    limit: u64,
    offset: u64,
    user_uuid: &str,
  ) -> Result<Vec<String>> {
    let user = user_uuid.to_owned();
    let limit = encode_u64(limit);
    let offset = encode_u64(offset);

    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT society_id FROM society_members
           WHERE user_uuid = ?1
           ORDER BY rowid
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user, limit, offset], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }

  async fn get_info_society(&self, society_uuids: &[String]) -> Result<Vec<SocietySummary>> {
    if society_uuids.is_empty() {
      return Ok(Vec::new());
    }

    let ids = society_uuids.to_vec();

    let rows = self
      .conn
      .call(move |conn| {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_LIST_CHUNK) {
          let sql = format!(
            "SELECT id, name, photo_url, format_id FROM society WHERE id IN ({})",
            placeholders(1, chunk.len())
          );
          let mut stmt = conn.prepare_cached(&sql)?;
          let params = rusqlite::params_from_iter(chunk.iter());
          for row in stmt.query_map(params, summary_from_row)? {
            rows.push(row?);
          }
        }
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  async fn with_transaction<F, T>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut dyn Transaction<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
    T: Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut scoped = SqliteTransaction { tx };
        // Dropping an uncommitted rusqlite transaction rolls it back.
        match f(&mut scoped) {
          Ok(value) => {
            scoped.tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => Ok(Err(e)),
        }
      })
      .await?;

    if outcome.is_err() {
      tracing::debug!("transaction rolled back");
    }
    outcome
  }
}
