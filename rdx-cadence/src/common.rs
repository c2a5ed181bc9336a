//! Contains common, primitive types shared across the crate.
//!
//! This module defines the ID type used to uniquely identify registered tasks
//! and the typed error surface of the registration API. Using a generational
//! key instead of a random string keeps lookups cheap and test fixtures
//! deterministic.

use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Uniquely and safely identifies a registered task within the engine.
    ///
    /// This key is assigned at registration time and never changes for the
    /// lifetime of the task. Keys are never reused, preventing stale ID bugs.
    pub struct TaskId;
}

/// Errors raised by the scheduler's registration surface.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task with the same name is already registered.
    #[error("task '{0}' already exists")]
    DuplicateName(String),
}
