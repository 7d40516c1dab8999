/// Linear undo/redo stacks of whole-state frames.
///
/// Both stacks are most-recent-last. Recording a new frame discards the redo
/// stack, so there is never more than one future to redo into.
#[derive(Debug, Clone)]
pub struct UndoHistory<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
}

impl<T> UndoHistory<T> {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Save the pre-mutation state before a new change.
    pub fn record(&mut self, before: T) {
        self.undo_stack.push(before);
        self.redo_stack.clear();
    }

    /// Step back: pops the most recent undo frame and parks `current` on the
    /// redo stack. `None` (and nothing parked) when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward: the mirror of [`UndoHistory::undo`].
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

impl<T> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}
