//! Error type for `society-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A statement inside a [`with_transaction`](society_core::repo::SocietyRepo::with_transaction)
  /// scope failed; `step` names it.
  #[error("{step}: {source}")]
  Statement {
    step:   &'static str,
    #[source]
    source: rusqlite::Error,
  },

  #[error("member {member_uuid} already subscribed to society {society_uuid}")]
  AlreadySubscribed {
    member_uuid:  String,
    society_uuid: String,
  },

  #[error("society not found: {0}")]
  SocietyNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
