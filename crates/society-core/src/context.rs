//! Per-request context handed to every handler operation.

use uuid::Uuid;

use crate::{Error, Result};

/// Who is calling and how to correlate the call in logs.
///
/// The caller id is placed here by an upstream authentication layer; the
/// handler trusts it as-is and never verifies it.
#[derive(Debug, Clone)]
pub struct RequestContext {
  caller:     Option<String>,
  request_id: Uuid,
}

impl RequestContext {
  /// A context for an authenticated caller with a fresh request id.
  pub fn new(caller: impl Into<String>) -> Self {
    Self { caller: Some(caller.into()), request_id: Uuid::new_v4() }
  }

  /// A context with no caller identity. Every operation rejects it.
  pub fn anonymous() -> Self { Self { caller: None, request_id: Uuid::new_v4() } }

  /// Build a context from transport-level values. An empty caller id counts
  /// as absent.
  pub fn from_parts(caller: Option<String>, request_id: Option<Uuid>) -> Self {
    Self {
      caller:     caller.filter(|c| !c.is_empty()),
      request_id: request_id.unwrap_or_else(Uuid::new_v4),
    }
  }

  /// The caller id, or [`Error::Unauthenticated`] when none was supplied.
  pub fn caller(&self) -> Result<&str> {
    self.caller.as_deref().ok_or(Error::Unauthenticated)
  }

  pub fn request_id(&self) -> Uuid { self.request_id }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_caller_is_absent() {
    let ctx = RequestContext::from_parts(Some(String::new()), None);
    assert!(matches!(ctx.caller(), Err(Error::Unauthenticated)));
  }

  #[test]
  fn request_id_is_kept() {
    let id = Uuid::new_v4();
    let ctx = RequestContext::from_parts(Some("u1".into()), Some(id));
    assert_eq!(ctx.request_id(), id);
    assert_eq!(ctx.caller().unwrap(), "u1");
  }
}
