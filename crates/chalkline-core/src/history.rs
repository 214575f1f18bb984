//! Ordered record of completed elements.

use crate::shapes::CanvasElement;

/// Completed elements in the order their strokes finished.
///
/// Unbounded and in-memory only.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    elements: Vec<CanvasElement>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished element.
    pub fn push(&mut self, element: CanvasElement) {
        self.elements.push(element);
    }

    /// Take the most recently finished element.
    pub fn pop(&mut self) -> Option<CanvasElement> {
        self.elements.pop()
    }

    pub fn last(&self) -> Option<&CanvasElement> {
        self.elements.last()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements from oldest to newest.
    pub fn iter(&self) -> std::slice::Iter<'_, CanvasElement> {
        self.elements.iter()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Whether both stacks hold the same drawings in the same order.
    pub fn same_drawing(&self, other: &HistoryStack) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.same_drawing(b))
    }
}

impl<'a> IntoIterator for &'a HistoryStack {
    type Item = &'a CanvasElement;
    type IntoIter = std::slice::Iter<'a, CanvasElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
