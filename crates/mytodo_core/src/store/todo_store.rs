//! Ordered to-do list store.
//!
//! # Responsibility
//! - Append, toggle and delete items with value-matching semantics.
//! - Re-emit the whole list to observers after each mutation.
//!
//! # Invariants
//! - `add` always appends at the end.
//! - `delete`/`toggle` touch at most one entry: the first value match.
//! - Operations on absent items are silent no-ops and do not notify.

use crate::model::todo::Todo;
use crate::store::observable::{Observable, ObserverId};

#[derive(Debug, Default)]
pub struct TodoStore {
    items: Observable<Vec<Todo>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Todo>) -> Self {
        Self {
            items: Observable::new(items),
        }
    }

    pub fn items(&self) -> &[Todo] {
        self.items.get()
    }

    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    /// Appends one item at the end of the list.
    pub fn add(&mut self, todo: Todo) {
        self.items.update(|items| items.push(todo));
    }

    /// Removes the first entry equal to `todo`.
    ///
    /// Returns `false` (and notifies nobody) when no entry matches.
    pub fn delete(&mut self, todo: &Todo) -> bool {
        match self.position_of(todo) {
            Some(index) => self.remove_index(index),
            None => false,
        }
    }

    /// Flips `is_done` on the first entry equal to `todo`.
    pub fn toggle(&mut self, todo: &Todo) -> bool {
        match self.position_of(todo) {
            Some(index) => self.toggle_index(index),
            None => false,
        }
    }

    /// Removes the entry a row gesture pointed at.
    ///
    /// See [`TodoStore::resolve`] for how `position` and `expected` combine.
    pub fn delete_at(&mut self, position: usize, expected: &Todo) -> bool {
        match self.resolve(position, expected) {
            Some(index) => self.remove_index(index),
            None => false,
        }
    }

    /// Toggles the entry a row gesture pointed at.
    pub fn toggle_at(&mut self, position: usize, expected: &Todo) -> bool {
        match self.resolve(position, expected) {
            Some(index) => self.toggle_index(index),
            None => false,
        }
    }

    /// Replaces the whole list with one notification.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = Todo>) {
        self.items.set(items.into_iter().collect());
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Returns the index of the first entry equal to `todo`.
    pub fn position_of(&self, todo: &Todo) -> Option<usize> {
        self.items.get().iter().position(|item| item == todo)
    }

    /// Maps a row gesture back to a list index.
    ///
    /// The row position wins while it still holds an equal item, which keeps
    /// duplicate texts apart. If the list changed underneath the gesture,
    /// falls back to the first value match.
    pub fn resolve(&self, position: usize, expected: &Todo) -> Option<usize> {
        match self.items.get().get(position) {
            Some(item) if item == expected => Some(position),
            _ => self.position_of(expected),
        }
    }

    /// Registers a list observer; the current list is delivered immediately.
    pub fn observe(&mut self, observer: impl FnMut(&Vec<Todo>) + Send + 'static) -> ObserverId {
        self.items.observe(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.items.remove_observer(id)
    }

    fn remove_index(&mut self, index: usize) -> bool {
        self.items.update(|items| {
            items.remove(index);
        });
        true
    }

    fn toggle_index(&mut self, index: usize) -> bool {
        self.items.update(|items| {
            if let Some(item) = items.get_mut(index) {
                item.toggle();
            }
        });
        true
    }
}
