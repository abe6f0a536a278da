//! Core types for Battle Armory.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item_type;
pub mod lifecycle;
pub mod username;

pub use id::*;
pub use item_type::{ItemType, ItemTypeError};
pub use lifecycle::LifecycleStage;
pub use username::{Username, UsernameError};
