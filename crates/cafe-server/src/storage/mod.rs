//! Storage layer
//!
//! SQLite (embedded) behind a small typed API.

pub mod db;

pub use db::{Database, StoreError};
