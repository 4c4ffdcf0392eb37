//! # nback-prefs
//!
//! Durable key-value preferences: the persisted high score and the game
//! configuration (n-back level, grid size, event count, event interval).
//!
//! Stores are passed explicitly to whoever needs them. Reading never fails:
//! a missing or unreadable backing file yields [`UserPreferences::default()`].
//! Each store also publishes the latest value through a `watch` channel so
//! several observers can follow changes.

#![deny(unsafe_code)]

pub mod errors;
pub mod store;
pub mod types;

pub use errors::{PrefsError, Result};
pub use store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, default_path};
pub use types::{PreferenceUpdate, UserPreferences};
