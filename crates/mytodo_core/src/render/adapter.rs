//! Row adapter with gesture callbacks.

use crate::model::todo::Todo;
use crate::render::row::TodoRow;

/// Callback invoked with the row position and the item bound to it.
pub type RowCallback = Box<dyn FnMut(usize, &Todo) + Send>;

/// Adapter between the current list snapshot and the list widget.
///
/// Holds its own copy of the data; callers push fresh lists through
/// [`TodoListAdapter::set_data`] after every store mutation.
pub struct TodoListAdapter {
    data: Vec<Todo>,
    on_click_delete: RowCallback,
    on_click_item: RowCallback,
    data_set_generation: u64,
}

impl TodoListAdapter {
    pub fn new(
        data: Vec<Todo>,
        on_click_delete: impl FnMut(usize, &Todo) + Send + 'static,
        on_click_item: impl FnMut(usize, &Todo) + Send + 'static,
    ) -> Self {
        Self {
            data,
            on_click_delete: Box::new(on_click_delete),
            on_click_item: Box::new(on_click_item),
            data_set_generation: 0,
        }
    }

    /// Replaces all data and invalidates every row.
    pub fn set_data(&mut self, data: Vec<Todo>) {
        self.data = data;
        self.data_set_generation += 1;
    }

    pub fn item_count(&self) -> usize {
        self.data.len()
    }

    /// Number of full invalidations since construction.
    pub fn data_set_generation(&self) -> u64 {
        self.data_set_generation
    }

    pub fn bind(&self, position: usize) -> Option<TodoRow> {
        self.data
            .get(position)
            .map(|todo| TodoRow::bind(position, todo))
    }

    pub fn rows(&self) -> Vec<TodoRow> {
        crate::render::row::render_rows(&self.data)
    }

    /// Forwards a tap on the row body. Out-of-range positions are ignored.
    pub fn click_item(&mut self, position: usize) -> bool {
        match self.data.get(position) {
            Some(todo) => {
                (self.on_click_item)(position, todo);
                true
            }
            None => false,
        }
    }

    /// Forwards a tap on the row's delete icon.
    pub fn click_delete(&mut self, position: usize) -> bool {
        match self.data.get(position) {
            Some(todo) => {
                (self.on_click_delete)(position, todo);
                true
            }
            None => false,
        }
    }
}
