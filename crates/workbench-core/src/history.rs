use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::debug;

/// One recorded point in a feature's history.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    state: T,
    label: String,
    captured_at: DateTime<Utc>,
}

impl<T: Clone> Snapshot<T> {
    fn capture(state: &T, label: &str) -> Self {
        Snapshot {
            state: state.clone(),
            label: label.to_string(),
            captured_at: Utc::now(),
        }
    }

    pub fn state(&self) -> T {
        self.state.clone()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Bounded linear undo/redo over full-state snapshots.
///
/// The newest entry of `past` is the state the feature is currently showing,
/// so undoing needs at least two entries: the first recorded state is never
/// undone away. `future` is a stack whose last element is the next redo.
#[derive(Debug, Clone)]
pub struct HistoryManager<T> {
    past: VecDeque<Snapshot<T>>,
    future: Vec<Snapshot<T>>,
    capacity: usize,
    restoring: bool,
}

impl<T: Clone> HistoryManager<T> {
    pub const DEFAULT_CAPACITY: usize = 30;

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        HistoryManager {
            past: VecDeque::with_capacity(capacity),
            future: Vec::new(),
            capacity,
            restoring: false,
        }
    }

    pub fn add_state(&mut self, state: &T, label: &str) {
        if self.restoring {
            debug!(label = %label, "history add ignored during restore");
            return;
        }

        self.past.push_back(Snapshot::capture(state, label));
        self.future.clear();

        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
        debug!(label = %label, past = self.past.len(), "history state added");
    }

    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        let current = self.past.pop_back()?;
        self.future.push(current);
        self.past.back().map(Snapshot::state)
    }

    pub fn redo(&mut self) -> Option<T> {
        let next = self.future.pop()?;
        let state = next.state();
        self.past.push_back(next);
        Some(state)
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Label of the entry `undo()` would restore.
    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.past.get(self.past.len() - 2).map(Snapshot::label)
    }

    /// Label of the entry `redo()` would restore.
    pub fn redo_description(&self) -> Option<&str> {
        self.future.last().map(Snapshot::label)
    }

    /// Label of the newest recorded entry, i.e. the action that produced the
    /// state currently on screen.
    pub fn current_description(&self) -> Option<&str> {
        self.past.back().map(Snapshot::label)
    }

    pub fn last_recorded_at(&self) -> Option<DateTime<Utc>> {
        self.past.back().map(Snapshot::captured_at)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Open the restoration window. Until `end_restore`, `add_state` is a no-op
    /// so replaying a restored state through normal mutation paths does not
    /// record it as a new action.
    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len_past(&self) -> usize {
        self.past.len()
    }

    pub fn len_future(&self) -> usize {
        self.future.len()
    }

    /// Snapshot states in `past`, oldest first.
    pub fn past_states(&self) -> Vec<T> {
        self.past.iter().map(Snapshot::state).collect()
    }
}

impl<T: Clone> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
