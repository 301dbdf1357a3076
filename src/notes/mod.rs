//! Notes Module
//! Mission: Personal notes, visible and mutable only by their owner

pub mod api;
pub mod models;
pub mod service;
pub mod store;

pub use models::{Note, NoteLookup};
pub use service::NoteService;
pub use store::NoteStore;
