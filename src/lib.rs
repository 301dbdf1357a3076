//! NoteKeeper Backend Library
//!
//! Authenticated personal notes: accounts, session tokens with logout
//! revocation, per-caller rate limiting, and owner-only note CRUD.
//! Exposes the modules for the binary and the integration tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notes;

pub use app::{build_router, AppState};
pub use config::Config;
pub use error::ApiError;
