//! The ordered collection of registered tasks.

use crate::common::{SchedulerError, TaskId};
use crate::components::task::{BoxedAction, Task};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Owns every registered task and its mutable scheduling state.
///
/// Tasks are never removed, so slot order equals registration order. The
/// tick driver relies on that: its per-tick scan visits tasks in the order
/// they were registered.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: SlotMap<TaskId, Task>,
    by_name: HashMap<String, TaskId>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new task under a unique name.
    ///
    /// The task starts `Off` with no window; it becomes schedulable only once
    /// the builder commits it.
    pub fn insert(&mut self, name: &str, action: BoxedAction) -> Result<TaskId, SchedulerError> {
        if self.by_name.contains_key(name) {
            return Err(SchedulerError::DuplicateName(name.to_string()));
        }
        let id = self
            .tasks
            .insert_with_key(|key| Task::new(key, name.to_string(), action));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    /// Iterates over all tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter()
    }

    /// Mutably iterates over all tasks in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (TaskId, &mut Task)> {
        self.tasks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
