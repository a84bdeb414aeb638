//! # courier-store
//!
//! Persistence for Courier: the SQLite-backed record store (bots,
//! destinations, authorized users) and the poll-cursor stores.

pub mod cursor;
pub mod directory;

pub use cursor::{FileCursorStore, MemoryCursorStore};
pub use directory::Store;
