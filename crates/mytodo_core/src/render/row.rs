//! Row view model and styling.

use crate::model::todo::Todo;

/// Text treatment applied to a row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub strikethrough: bool,
    pub italic: bool,
}

impl TextStyle {
    pub const PLAIN: Self = Self {
        strikethrough: false,
        italic: false,
    };

    /// Completed items are struck through and italicized.
    pub const DONE: Self = Self {
        strikethrough: true,
        italic: true,
    };

    pub fn for_item(todo: &Todo) -> Self {
        if todo.is_done {
            Self::DONE
        } else {
            Self::PLAIN
        }
    }
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub position: usize,
    pub text: String,
    pub is_done: bool,
    pub style: TextStyle,
}

impl TodoRow {
    pub fn bind(position: usize, todo: &Todo) -> Self {
        Self {
            position,
            text: todo.text().to_string(),
            is_done: todo.is_done,
            style: TextStyle::for_item(todo),
        }
    }
}

/// Renders every item into a row, preserving list order.
pub fn render_rows(items: &[Todo]) -> Vec<TodoRow> {
    items
        .iter()
        .enumerate()
        .map(|(position, todo)| TodoRow::bind(position, todo))
        .collect()
}
