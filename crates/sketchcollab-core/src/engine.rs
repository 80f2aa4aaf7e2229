//! The drawing document engine: element store, selection and history.

use crate::elements::{
    Element, ElementId, ElementKind, ElementPatch, Group, now_millis, union_bounds,
};
use crate::events::{ChangeKind, DocumentChange, DocumentObserver};
use crate::history::History;
use kurbo::{Point, Rect};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;

/// Owns the element store and is its only writer.
///
/// Every successful mutation requests a redraw, records a history snapshot
/// and notifies observers. Continuous drags (`move_element`) and selection
/// changes only request a redraw.
pub struct DrawingEngine {
    elements: Vec<Element>,
    selection: Vec<ElementId>,
    history: History,
    observers: Vec<Box<dyn DocumentObserver>>,
    redraw_requested: bool,
}

impl Default for DrawingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DrawingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingEngine")
            .field("elements", &self.elements.len())
            .field("selection", &self.selection)
            .field("history", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DrawingEngine {
    /// Create an empty engine. The history is seeded with the empty state.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            selection: Vec::new(),
            history: History::default(),
            observers: Vec::new(),
            redraw_requested: false,
        }
    }

    // --- Observers and redraw -------------------------------------------

    /// Register an observer for document changes.
    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, change: DocumentChange) {
        for observer in &mut self.observers {
            observer.on_change(&change);
        }
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Return and reset the pending redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn snapshot(&mut self) {
        self.history.push(self.elements.clone());
    }

    // --- Queries ---------------------------------------------------------

    /// Elements in store (insertion) order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements by ascending z-order, ties kept in store order.
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut sorted: Vec<&Element> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.z());
        sorted
    }

    /// Union bounds of the document; `None` when nothing has extent.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(&self.elements)
    }

    /// Bounds of a single element; `None` for an empty stroke.
    pub fn element_bounds(element: &Element) -> Option<Rect> {
        element.bounds()
    }

    /// The topmost element whose bounding box contains `point`.
    ///
    /// Highest z-order wins; among equal z-orders the earlier store entry
    /// wins. Groups are tested as one box.
    pub fn element_at_point(&self, point: Point) -> Option<&Element> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.contains_point(point))
            .max_by_key(|(index, e)| (e.z(), Reverse(*index)))
            .map(|(_, e)| e)
    }

    // --- Mutations -------------------------------------------------------

    /// Give `element` a fresh identity when it has none or collides with
    /// an identity in `taken`.
    fn assign_identity(element: &mut Element, taken: &HashSet<ElementId>) {
        if element.id.is_unassigned() {
            element.id = ElementId::generate();
        } else if taken.contains(&element.id) {
            let fresh = ElementId::generate();
            log::warn!("Duplicate element id {}, reassigned to {}", element.id, fresh);
            element.id = fresh;
        }
    }

    /// Append an element, assigning identity and z-order when absent.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let taken: HashSet<ElementId> = self.elements.iter().map(|e| e.id.clone()).collect();
        Self::assign_identity(&mut element, &taken);
        if element.z_index.is_none() {
            element.z_index = Some(self.elements.len() as i64);
        }
        if element.timestamp.is_none() {
            element.timestamp = Some(now_millis());
        }

        let id = element.id.clone();
        log::debug!("Adding {} {}", element.element_type().name(), id);
        self.elements.push(element.clone());
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::with_element(ChangeKind::Add, element));
        id
    }

    /// Remove an element by identity. Absent identities are ignored.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.take_element(id)?;
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::with_element(ChangeKind::Remove, removed.clone()));
        Some(removed)
    }

    fn take_element(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);
        self.selection.retain(|s| s != id);
        log::debug!("Removed {} {}", removed.element_type().name(), id);
        Some(removed)
    }

    /// Merge a patch into an element. Returns whether the element existed.
    pub fn modify_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        patch.apply(&mut self.elements[index]);
        let modified = self.elements[index].clone();
        log::debug!("Modified {}", id);
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::with_element(ChangeKind::Modify, modified));
        true
    }

    /// Replace the whole store, the sole load entrypoint.
    ///
    /// Missing identities are generated, duplicates reassigned, and missing
    /// z-orders set to the list index.
    pub fn set_elements(&mut self, elements: Vec<Element>) {
        let mut taken = HashSet::with_capacity(elements.len());
        self.elements = elements
            .into_iter()
            .enumerate()
            .map(|(index, mut element)| {
                Self::assign_identity(&mut element, &taken);
                if element.z_index.is_none() {
                    element.z_index = Some(index as i64);
                }
                taken.insert(element.id.clone());
                element
            })
            .collect();
        self.selection.clear();
        log::debug!("Replaced document with {} elements", self.elements.len());
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::new(ChangeKind::Replace));
    }

    /// Remove every element and clear the selection.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selection.clear();
        log::debug!("Cleared document");
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::new(ChangeKind::Clear));
    }

    /// Translate an element during a drag. No snapshot, no notification;
    /// the gesture ends with [`DrawingEngine::commit_history`].
    pub fn move_element(&mut self, id: &ElementId, dx: f64, dy: f64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.elements[index].translate(dx, dy);
        self.request_redraw();
        true
    }

    /// Record the single terminal snapshot of a continuous gesture.
    pub fn commit_history(&mut self) {
        self.snapshot();
        self.notify(DocumentChange::new(ChangeKind::Modify));
    }

    // --- Selection -------------------------------------------------------

    /// Add an element to the selection. Absent identities are ignored.
    pub fn select_element(&mut self, id: &ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.selection.contains(id) {
            self.selection.push(id.clone());
        }
        self.request_redraw();
        true
    }

    pub fn deselect_element(&mut self, id: &ElementId) {
        self.selection.retain(|s| s != id);
        self.request_redraw();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.request_redraw();
    }

    pub fn select_all(&mut self) {
        self.selection = self.elements.iter().map(|e| e.id.clone()).collect();
        self.request_redraw();
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selection.contains(id)
    }

    /// Selected identities in selection order.
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Selected elements in store order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| self.selection.contains(&e.id))
            .collect()
    }

    /// Remove every selected element with a single history snapshot.
    /// Returns the number of removed elements.
    pub fn delete_selected_elements(&mut self) -> usize {
        let ids = std::mem::take(&mut self.selection);
        let removed: Vec<Element> = ids.iter().filter_map(|id| self.take_element(id)).collect();
        if removed.is_empty() {
            return 0;
        }
        self.request_redraw();
        self.snapshot();
        for element in &removed {
            self.notify(DocumentChange::with_element(ChangeKind::Remove, element.clone()));
        }
        removed.len()
    }

    /// Raise every selected element's z-order by one.
    pub fn move_selected_elements_up(&mut self) {
        self.reorder_selected(|z| z + 1);
    }

    /// Lower every selected element's z-order by one, floored at zero.
    pub fn move_selected_elements_down(&mut self) {
        self.reorder_selected(|z| (z - 1).max(0));
    }

    fn reorder_selected(&mut self, step: impl Fn(i64) -> i64) {
        if self.selection.is_empty() {
            return;
        }
        for element in &mut self.elements {
            if self.selection.contains(&element.id) {
                element.z_index = Some(step(element.z()));
            }
        }
        log::debug!("Reordered {} elements", self.selection.len());
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::new(ChangeKind::Reorder));
    }

    /// Combine the selected elements into one group.
    ///
    /// Requires at least two selected elements. Members keep their store
    /// order inside the group, the group takes the highest member z-order
    /// and becomes the only selected element.
    pub fn group_selected_elements(&mut self) -> Option<ElementId> {
        if self.selection.len() < 2 {
            return None;
        }
        let (members, rest): (Vec<Element>, Vec<Element>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| self.selection.contains(&e.id));
        self.elements = rest;

        let z_index = members.iter().map(Element::z).max().unwrap_or(0);
        let member_count = members.len();
        let group = Element::new(ElementKind::Group(Group::from_members(members)))
            .with_id(ElementId::generate())
            .with_z_index(z_index)
            .with_timestamp(now_millis());
        let id = group.id.clone();
        log::debug!("Grouped {} elements into {}", member_count, id);

        self.elements.push(group.clone());
        self.selection = vec![id.clone()];
        self.request_redraw();
        self.snapshot();
        self.notify(DocumentChange::with_element(ChangeKind::Group, group));
        Some(id)
    }

    // --- History ---------------------------------------------------------

    /// Restore the previous snapshot. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.restore(state);
        self.notify(DocumentChange::new(ChangeKind::Undo));
        true
    }

    /// Restore the next snapshot. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.restore(state);
        self.notify(DocumentChange::new(ChangeKind::Redo));
        true
    }

    fn restore(&mut self, state: Vec<Element>) {
        self.elements = state;
        self.selection.clear();
        self.request_redraw();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots currently held.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{SerializableColor, StrokePoint};
    use crate::history::MAX_HISTORY;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rect(x: f64, y: f64) -> Element {
        Element::rectangle(x, y, 10.0, 10.0)
    }

    #[test]
    fn test_add_assigns_distinct_ids_and_z() {
        let mut engine = DrawingEngine::new();
        let ids: Vec<ElementId> = (0..20).map(|i| engine.add_element(rect(i as f64, 0.0))).collect();
        assert_eq!(engine.len(), 20);
        let unique: HashSet<&ElementId> = ids.iter().collect();
        assert_eq!(unique.len(), 20);
        assert_eq!(engine.elements()[5].z_index, Some(5));
        assert!(engine.take_redraw_request());
        assert!(!engine.take_redraw_request());
    }

    #[test]
    fn test_add_reassigns_duplicate_id() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0).with_id("element_1"));
        let b = engine.add_element(rect(5.0, 0.0).with_id("element_1"));
        assert_eq!(a, ElementId::new("element_1"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_undo_redo_single_mutations() {
        let mut engine = DrawingEngine::new();
        let id = engine.add_element(rect(0.0, 0.0));
        let before = engine.elements().to_vec();

        engine.modify_element(&id, &ElementPatch::new().with_stroke_width(7.0));
        let after = engine.elements().to_vec();
        assert!(engine.undo());
        assert_eq!(engine.elements(), before.as_slice());
        assert!(engine.redo());
        assert_eq!(engine.elements(), after.as_slice());

        engine.remove_element(&id);
        assert!(engine.is_empty());
        assert!(engine.undo());
        assert_eq!(engine.elements(), after.as_slice());
    }

    /// Run `mutate`, then check that undo restores the prior store and
    /// redo re-applies the change.
    fn assert_undo_redo(engine: &mut DrawingEngine, mutate: impl FnOnce(&mut DrawingEngine)) {
        let before = engine.elements().to_vec();
        mutate(engine);
        let after = engine.elements().to_vec();
        assert_ne!(before, after);
        assert!(engine.undo());
        assert_eq!(engine.elements(), before.as_slice());
        assert!(engine.redo());
        assert_eq!(engine.elements(), after.as_slice());
    }

    #[test]
    fn test_undo_redo_group() {
        let mut engine = DrawingEngine::new();
        engine.add_element(rect(0.0, 0.0));
        engine.add_element(rect(20.0, 0.0));
        engine.select_all();
        assert_undo_redo(&mut engine, |engine| {
            assert!(engine.group_selected_elements().is_some());
        });
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_undo_redo_reorder() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        let b = engine.add_element(rect(20.0, 0.0));

        engine.select_element(&a);
        assert_undo_redo(&mut engine, DrawingEngine::move_selected_elements_up);
        assert_eq!(engine.element(&a).unwrap().z_index, Some(1));

        engine.select_element(&b);
        assert_undo_redo(&mut engine, DrawingEngine::move_selected_elements_down);
        assert_eq!(engine.element(&b).unwrap().z_index, Some(0));
    }

    #[test]
    fn test_undo_redo_set_elements() {
        let mut engine = DrawingEngine::new();
        engine.add_element(rect(0.0, 0.0));
        assert_undo_redo(&mut engine, |engine| {
            engine.set_elements(vec![rect(5.0, 5.0), rect(50.0, 5.0)]);
        });
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_undo_first_add_restores_empty() {
        let mut engine = DrawingEngine::new();
        assert!(!engine.can_undo());
        engine.add_element(rect(0.0, 0.0));
        assert!(engine.undo());
        assert!(engine.is_empty());
        assert!(!engine.undo());
    }

    #[test]
    fn test_new_edit_discards_redo() {
        let mut engine = DrawingEngine::new();
        engine.add_element(rect(0.0, 0.0));
        engine.add_element(rect(20.0, 0.0));
        engine.undo();
        assert!(engine.can_redo());
        engine.add_element(rect(40.0, 0.0));
        assert!(!engine.can_redo());
        assert!(!engine.redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut engine = DrawingEngine::new();
        for i in 0..80 {
            engine.add_element(rect(i as f64, 0.0));
            assert!(engine.history_len() <= MAX_HISTORY);
        }
        let mut undos = 0;
        while engine.undo() {
            undos += 1;
        }
        assert_eq!(undos, MAX_HISTORY - 1);
        // Oldest entries were dropped: 80 - 49 elements remain.
        assert_eq!(engine.len(), 80 - (MAX_HISTORY - 1));
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let mut engine = DrawingEngine::new();
        let ghost = ElementId::new("missing");
        let history = engine.history_len();
        assert!(engine.remove_element(&ghost).is_none());
        assert!(!engine.modify_element(&ghost, &ElementPatch::new().with_opacity(0.5)));
        assert!(!engine.move_element(&ghost, 1.0, 1.0));
        assert!(!engine.select_element(&ghost));
        assert!(engine.selection().is_empty());
        assert_eq!(engine.history_len(), history);
    }

    #[test]
    fn test_move_element_skips_history() {
        let mut engine = DrawingEngine::new();
        let id = engine.add_element(Element::freedraw(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(10.0, 10.0),
        ]));
        let history = engine.history_len();
        for _ in 0..10 {
            engine.move_element(&id, 1.0, 2.0);
        }
        assert_eq!(engine.history_len(), history);
        engine.commit_history();
        assert_eq!(engine.history_len(), history + 1);
        let bounds = engine.element(&id).and_then(Element::bounds).unwrap();
        assert_eq!(bounds, Rect::new(10.0, 20.0, 20.0, 30.0));
        assert!(engine.undo());
        let bounds = engine.element(&id).and_then(Element::bounds).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_element_at_point_prefers_highest_z() {
        let mut engine = DrawingEngine::new();
        let front = engine.add_element(Element::rectangle(0.0, 0.0, 100.0, 100.0).with_z_index(5));
        let back = engine.add_element(Element::rectangle(50.0, 50.0, 100.0, 100.0).with_z_index(1));
        assert_eq!(engine.element_at_point(Point::new(75.0, 75.0)).map(|e| &e.id), Some(&front));
        assert_eq!(engine.element_at_point(Point::new(120.0, 120.0)).map(|e| &e.id), Some(&back));
        assert!(engine.element_at_point(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_element_at_point_tie_goes_to_earlier_entry() {
        let mut engine = DrawingEngine::new();
        let first = engine.add_element(rect(0.0, 0.0).with_z_index(0));
        engine.add_element(rect(0.0, 0.0).with_z_index(0));
        assert_eq!(engine.element_at_point(Point::new(5.0, 5.0)).map(|e| &e.id), Some(&first));
    }

    #[test]
    fn test_element_at_point_after_removal_shares_z() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        let b = engine.add_element(rect(0.0, 0.0));
        engine.remove_element(&a);
        let c = engine.add_element(rect(0.0, 0.0));
        assert_eq!(engine.element(&b).unwrap().z_index, engine.element(&c).unwrap().z_index);
        assert_eq!(engine.element_at_point(Point::new(5.0, 5.0)).map(|e| &e.id), Some(&b));
    }

    #[test]
    fn test_selection_operations() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        let b = engine.add_element(rect(20.0, 0.0));
        engine.take_redraw_request();
        let history = engine.history_len();

        assert!(engine.select_element(&a));
        assert!(engine.take_redraw_request());
        engine.select_element(&a);
        assert_eq!(engine.selection(), &[a.clone()]);
        engine.select_all();
        assert!(engine.is_selected(&b));
        engine.deselect_element(&a);
        assert!(!engine.is_selected(&a));
        engine.clear_selection();
        assert!(engine.selection().is_empty());
        assert_eq!(engine.history_len(), history);
    }

    #[test]
    fn test_remove_drops_from_selection() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        engine.select_element(&a);
        engine.remove_element(&a);
        assert!(!engine.is_selected(&a));
    }

    #[test]
    fn test_delete_selected_single_snapshot() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        let b = engine.add_element(rect(20.0, 0.0));
        let c = engine.add_element(rect(40.0, 0.0));
        engine.select_element(&a);
        engine.select_element(&c);
        let history = engine.history_len();
        assert_eq!(engine.delete_selected_elements(), 2);
        assert_eq!(engine.history_len(), history + 1);
        assert_eq!(engine.len(), 1);
        assert!(engine.contains(&b));
        assert_eq!(engine.delete_selected_elements(), 0);
        assert!(engine.undo());
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn test_reorder_selected() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        let b = engine.add_element(rect(0.0, 0.0));
        let history = engine.history_len();
        engine.move_selected_elements_up();
        assert_eq!(engine.history_len(), history);

        engine.select_element(&a);
        engine.move_selected_elements_up();
        engine.move_selected_elements_up();
        assert_eq!(engine.element(&a).unwrap().z_index, Some(2));
        assert_eq!(engine.sorted_elements().last().map(|e| &e.id), Some(&a));

        engine.clear_selection();
        engine.select_element(&b);
        engine.move_selected_elements_down();
        engine.move_selected_elements_down();
        assert_eq!(engine.element(&b).unwrap().z_index, Some(0));
    }

    #[test]
    fn test_group_selected() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(Element::rectangle(0.0, 0.0, 10.0, 10.0).with_z_index(3));
        let b = engine.add_element(Element::ellipse(50.0, 50.0, 20.0, 20.0).with_z_index(7));
        let c = engine.add_element(rect(200.0, 200.0));
        let expected = union_bounds([engine.element(&a).unwrap(), engine.element(&b).unwrap()]);

        engine.select_element(&b);
        assert!(engine.group_selected_elements().is_none());
        engine.select_element(&a);
        let group_id = engine.group_selected_elements().unwrap();

        assert_eq!(engine.len(), 2);
        assert!(!engine.contains(&a));
        assert!(!engine.contains(&b));
        assert!(engine.contains(&c));
        let group = engine.element(&group_id).unwrap();
        assert_eq!(group.bounds(), expected);
        assert_eq!(group.z_index, Some(7));
        // Members keep store order.
        let members = group.as_group().unwrap().members();
        assert_eq!(members[0].id, a);
        assert_eq!(members[1].id, b);
        assert_eq!(engine.selection(), &[group_id]);
    }

    #[test]
    fn test_move_group_moves_members() {
        let mut engine = DrawingEngine::new();
        engine.add_element(rect(0.0, 0.0));
        engine.add_element(rect(20.0, 0.0));
        engine.select_all();
        let group_id = engine.group_selected_elements().unwrap();
        engine.move_element(&group_id, 5.0, 5.0);
        let group = engine.element(&group_id).unwrap().as_group().unwrap();
        assert_eq!(group.bounds(), Some(Rect::new(5.0, 5.0, 35.0, 15.0)));
        assert_eq!(group.members[1].bounds(), Some(Rect::new(25.0, 5.0, 35.0, 15.0)));
    }

    #[test]
    fn test_set_elements_assigns_missing_fields() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        engine.select_element(&a);
        engine.set_elements(vec![
            rect(0.0, 0.0),
            rect(1.0, 1.0).with_id("keep").with_z_index(9),
            rect(2.0, 2.0).with_id("keep"),
        ]);
        assert!(engine.selection().is_empty());
        let elements = engine.elements();
        assert!(!elements[0].id.is_unassigned());
        assert_eq!(elements[0].z_index, Some(0));
        assert_eq!(elements[1].id, ElementId::new("keep"));
        assert_eq!(elements[1].z_index, Some(9));
        assert_ne!(elements[2].id, ElementId::new("keep"));
        assert_eq!(elements[2].z_index, Some(2));
    }

    #[test]
    fn test_set_elements_roundtrip_is_idempotent() {
        let mut engine = DrawingEngine::new();
        engine.add_element(rect(0.0, 0.0).with_stroke(SerializableColor::white(), 2.0));
        engine.add_element(Element::text(5.0, 5.0, "hello"));
        engine.add_element(Element::freedraw(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(3.0, 4.0).with_pressure(0.5, 1.5),
        ]));
        let json = serde_json::to_string(engine.elements()).unwrap();
        let reloaded: Vec<Element> = serde_json::from_str(&json).unwrap();
        let before = engine.elements().to_vec();
        engine.set_elements(reloaded);
        assert_eq!(engine.elements(), before.as_slice());
    }

    #[test]
    fn test_bounds() {
        let mut engine = DrawingEngine::new();
        assert!(engine.bounds().is_none());
        engine.add_element(Element::freedraw(Vec::new()));
        assert!(engine.bounds().is_none());
        engine.add_element(rect(10.0, 10.0));
        assert_eq!(engine.bounds(), Some(Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(DrawingEngine::element_bounds(&Element::freedraw(Vec::new())).is_none());
    }

    #[test]
    fn test_clear() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0));
        engine.select_element(&a);
        engine.clear();
        assert!(engine.is_empty());
        assert!(engine.selection().is_empty());
        assert!(engine.undo());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_observers_receive_changes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut engine = DrawingEngine::new();
        engine.subscribe(move |change: &DocumentChange| {
            sink.borrow_mut()
                .push((change.kind, change.element.as_ref().map(|e| e.id.clone())));
        });

        let id = engine.add_element(rect(0.0, 0.0));
        engine.move_element(&id, 1.0, 1.0);
        engine.select_element(&id);
        engine.modify_element(&id, &ElementPatch::new().with_opacity(0.5));
        engine.undo();
        engine.redo();
        engine.remove_element(&id);
        engine.set_elements(Vec::new());
        engine.clear();

        let kinds: Vec<ChangeKind> = log.borrow().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Add,
                ChangeKind::Modify,
                ChangeKind::Undo,
                ChangeKind::Redo,
                ChangeKind::Remove,
                ChangeKind::Replace,
                ChangeKind::Clear,
            ]
        );
        assert_eq!(log.borrow()[0].1, Some(id));
    }

    #[test]
    fn test_sorted_elements_stable() {
        let mut engine = DrawingEngine::new();
        let a = engine.add_element(rect(0.0, 0.0).with_z_index(1));
        let b = engine.add_element(rect(0.0, 0.0).with_z_index(0));
        let c = engine.add_element(rect(0.0, 0.0).with_z_index(1));
        let order: Vec<&ElementId> = engine.sorted_elements().iter().map(|e| &e.id).collect();
        assert_eq!(order, vec![&b, &a, &c]);
    }
}
