//! Document change notifications.

use crate::elements::Element;

/// Kind of operation that changed the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    Modify,
    Replace,
    Clear,
    Reorder,
    Group,
    Undo,
    Redo,
}

impl ChangeKind {
    pub fn name(self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Modify => "modify",
            ChangeKind::Replace => "replace",
            ChangeKind::Clear => "clear",
            ChangeKind::Reorder => "reorder",
            ChangeKind::Group => "group",
            ChangeKind::Undo => "undo",
            ChangeKind::Redo => "redo",
        }
    }
}

/// A notification sent to observers after a document mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    /// The affected element, when the operation targets one.
    pub element: Option<Element>,
}

impl DocumentChange {
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            element: None,
        }
    }

    pub fn with_element(kind: ChangeKind, element: Element) -> Self {
        Self {
            kind,
            element: Some(element),
        }
    }
}

/// Receives document change notifications (layer panels, persistence).
pub trait DocumentObserver {
    fn on_change(&mut self, change: &DocumentChange);
}

impl<F> DocumentObserver for F
where
    F: FnMut(&DocumentChange),
{
    fn on_change(&mut self, change: &DocumentChange) {
        self(change)
    }
}
