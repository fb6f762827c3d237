//! Current-value holder with change observers.

use std::fmt::{Debug, Formatter};

/// Handle returned by [`Observable::observe`], used to detach an observer.
pub type ObserverId = u64;

type Observer<T> = Box<dyn FnMut(&T) + Send>;

/// Single value plus the observers interested in it.
///
/// Observers run synchronously on the thread that replaces the value.
pub struct Observable<T> {
    value: T,
    observers: Vec<(ObserverId, Observer<T>)>,
    next_observer_id: ObserverId,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value and notifies every observer.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutates the value in place, then notifies every observer.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let result = mutate(&mut self.value);
        self.notify();
        result
    }

    /// Registers an observer and immediately delivers the current value.
    pub fn observe(&mut self, mut observer: impl FnMut(&T) + Send + 'static) -> ObserverId {
        observer(&self.value);
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Detaches one observer. Returns `false` when the id is unknown.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self) {
        let value = &self.value;
        for (_, observer) in &mut self.observers {
            observer(value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}
