//! Core types, the repository port, and the request handler for the society
//! service.
//!
//! This crate has no HTTP or database dependencies. The storage adapter
//! (`society-store-sqlite`) implements [`repo::SocietyRepo`]; the transport
//! (`society-api`) drives [`handler::SocietyHandler`].

// Native `async fn` in traits; the port spells out its `Send` bounds itself.
#![allow(async_fn_in_trait)]

pub mod context;
pub mod error;
pub mod handler;
pub mod messages;
pub mod repo;
pub mod society;

pub use context::RequestContext;
pub use error::{Error, ErrorKind, Result};
pub use handler::SocietyHandler;
