//! Armory Core - Shared types library.
//!
//! This crate provides common types used across all Battle Armory components:
//! - `server` - JSON API service with the item lifecycle engine
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the battle item type set, usernames, and the
//!   pure item lifecycle time logic shared by the scheduler and the stats
//!   queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
