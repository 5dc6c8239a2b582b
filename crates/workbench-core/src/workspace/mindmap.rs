use super::KeyOutcome;
use crate::config::WorkbenchConfig;
use crate::error::{Result, WorkbenchError};
use crate::history::HistoryManager;
use crate::interaction::{dispatch_mindmap_key, Command, Interaction, KeyInput};
use crate::mindmap::GraphEditor;
use crate::model::*;
use crate::notify::Notifier;
use crate::search::{self, SearchHit};
use crate::storage::{self, KeyValueStore, WriteBehind};
use std::time::Instant;
use tracing::{debug, info, warn};

const MAX_SEARCH_RESULTS: usize = 50;

/// The mind-map feature: graph model, its undo history, selection and
/// gesture state, and debounced persistence under one storage key.
pub struct MindMapWorkspace<S, N> {
    editor: GraphEditor,
    history: HistoryManager<MindMapState>,
    interaction: Interaction,
    store: S,
    notifier: N,
    key: String,
    writes: WriteBehind,
}

impl<S: KeyValueStore, N: Notifier> MindMapWorkspace<S, N> {
    /// Load the saved mind map, or start empty when nothing usable is stored.
    /// The loaded state becomes the first history entry.
    pub fn open(store: S, mut notifier: N, config: &WorkbenchConfig) -> Self {
        let loaded = storage::load_json::<MindMapState>(&store, &config.mindmap_key)
            .and_then(|state| match state {
                Some(state) => GraphEditor::check_ids(&state).map(|()| Some(state)),
                None => Ok(None),
            });
        let editor = match loaded {
            Ok(state) => state.map(GraphEditor::from_state).unwrap_or_default(),
            Err(e) => {
                warn!(key = %config.mindmap_key, error = %e, "starting with an empty mind map");
                notifier.notify("Failed to load saved mind map", Severity::Error);
                GraphEditor::default()
            }
        };

        let mut history = HistoryManager::with_capacity(config.mindmap_history_capacity);
        history.add_state(&editor.to_state(), "Initial mind map");

        info!(key = %config.mindmap_key, nodes = editor.nodes().len(), "mind map opened");
        MindMapWorkspace {
            editor,
            history,
            interaction: Interaction::default(),
            store,
            notifier,
            key: config.mindmap_key.clone(),
            writes: WriteBehind::new(config.save_debounce()),
        }
    }

    // ---- Views ----

    pub fn editor(&self) -> &GraphEditor {
        &self.editor
    }

    pub fn nodes(&self) -> &[GraphNode] {
        self.editor.nodes()
    }

    pub fn connections(&self) -> &[Connection] {
        self.editor.connections()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.interaction.selected()
    }

    pub fn history(&self) -> &HistoryManager<MindMapState> {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- Internals ----

    /// Record the current model as the result of `label` and schedule a save.
    fn commit(&mut self, label: &str) {
        self.history.add_state(&self.editor.to_state(), label);
        self.writes.schedule(Instant::now());
    }

    /// Replace the live model wholesale and commit it under `label`. During
    /// undo/redo the history is in its restore window, so the commit only
    /// schedules the save. Ids already handed out this session stay retired.
    fn apply_state(&mut self, state: MindMapState, label: &str) {
        let issued = self.editor.next_id();
        self.editor = GraphEditor::from_state(state);
        self.editor.reserve_ids_below(issued);
        self.interaction.reset();
        self.commit(label);
    }

    // ---- Node commands ----

    /// Add a root node, select it and open it for editing. Non-finite
    /// positions and an exhausted id space are ignored.
    pub fn add_root_node(&mut self, position: Option<(f64, f64)>) -> Option<NodeId> {
        let id = self.editor.add_root_node(position)?;
        self.commit("Add root node");
        info!(node = %id, "add_root_node");
        self.interaction.begin_edit(id, ROOT_PLACEHOLDER);
        Some(id)
    }

    /// Add a child under `parent_id`. Stale parents are ignored.
    pub fn add_child_node(&mut self, parent_id: NodeId) -> Option<NodeId> {
        let id = self.editor.add_child_node(parent_id)?;
        self.commit("Add child node");
        info!(node = %id, parent = %parent_id, "add_child_node");
        self.interaction.begin_edit(id, CHILD_PLACEHOLDER);
        Some(id)
    }

    pub fn add_child_to_selection(&mut self) -> Result<NodeId> {
        let Some(parent) = self.interaction.selected() else {
            self.notifier.notify("Please select a parent node first", Severity::Error);
            return Err(WorkbenchError::NothingSelected);
        };
        match self.add_child_node(parent) {
            Some(id) => Ok(id),
            None => {
                self.interaction.forget(&[parent]);
                self.notifier.notify("Please select a parent node first", Severity::Error);
                Err(WorkbenchError::NothingSelected)
            }
        }
    }

    /// How many nodes removing `node_id` would take with it, itself included.
    /// The shell asks for confirmation when this is more than one.
    pub fn removal_size(&self, node_id: NodeId) -> usize {
        self.editor.find_descendants(node_id).len()
    }

    /// Remove a node and its subtree. Confirmation is the caller's job.
    pub fn remove_node(&mut self, node_id: NodeId) -> Vec<NodeId> {
        let removed = self.editor.remove_node(node_id);
        if removed.is_empty() {
            debug!(node = %node_id, "remove_node on stale id ignored");
            return removed;
        }
        self.commit("Remove node");
        self.interaction.forget(&removed);
        info!(node = %node_id, removed = removed.len(), "remove_node");
        let message = match removed.len() {
            1 => "Node removed".to_string(),
            n => format!("Removed {n} nodes"),
        };
        self.notifier.notify(&message, Severity::Success);
        removed
    }

    pub fn remove_selected(&mut self) -> Result<Vec<NodeId>> {
        let Some(selected) = self.interaction.selected() else {
            self.notifier.notify("Please select a node to remove", Severity::Error);
            return Err(WorkbenchError::NothingSelected);
        };
        Ok(self.remove_node(selected))
    }

    pub fn select(&mut self, node_id: NodeId) -> bool {
        if !self.editor.contains(node_id) {
            return false;
        }
        self.interaction.select(node_id);
        true
    }

    pub fn deselect(&mut self) {
        self.interaction.reset();
    }

    // ---- Text editing ----

    pub fn begin_edit(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.editor.get(node_id) else {
            return false;
        };
        let text = node.text.clone();
        self.interaction.begin_edit(node_id, &text);
        true
    }

    pub fn update_draft(&mut self, text: &str) -> bool {
        self.interaction.update_draft(text)
    }

    /// Close the text field and store its draft. Returns true when the label
    /// actually changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some((node_id, draft)) = self.interaction.finish_edit() else {
            return false;
        };
        let Some(before) = self.editor.get(node_id).map(|n| n.text.clone()) else {
            return false;
        };
        self.editor.set_node_text(node_id, &draft);
        let changed = self.editor.get(node_id).is_some_and(|n| n.text != before);
        if changed {
            self.commit("Edit node text");
            debug!(node = %node_id, "node text edited");
        }
        changed
    }

    pub fn cancel_edit(&mut self) {
        self.interaction.finish_edit();
    }

    // ---- Dragging ----

    pub fn begin_drag(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.editor.get(node_id) else {
            return false;
        };
        let origin = (node.x, node.y);
        self.interaction.begin_drag(node_id, origin);
        true
    }

    /// Move the dragged node. Intermediate positions are not recorded.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        match self.interaction.drag_moved() {
            Some(node_id) => self.editor.move_node(node_id, x, y),
            None => false,
        }
    }

    /// Finish the gesture, recording one history entry if the node moved.
    pub fn end_drag(&mut self) -> bool {
        let Some((node_id, origin, moved)) = self.interaction.finish_drag() else {
            return false;
        };
        let displaced = self
            .editor
            .get(node_id)
            .is_some_and(|n| (n.x, n.y) != origin);
        if moved && displaced {
            self.commit("Move node");
            return true;
        }
        false
    }

    /// Abort the gesture and put the node back where it started.
    pub fn cancel_drag(&mut self) {
        if let Some((node_id, (x, y), _)) = self.interaction.finish_drag() {
            self.editor.move_node(node_id, x, y);
        }
    }

    // ---- History ----

    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            self.notifier.notify("Nothing to undo", Severity::Info);
            return false;
        };
        let label = self.history.redo_description().unwrap_or("Action").to_string();
        self.restore(state, &label);
        self.notifier.notify(&format!("Undo: {label}"), Severity::Info);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            self.notifier.notify("Nothing to redo", Severity::Info);
            return false;
        };
        let label = self.history.current_description().unwrap_or("Action").to_string();
        self.restore(state, &label);
        self.notifier.notify(&format!("Redo: {label}"), Severity::Info);
        true
    }

    fn restore(&mut self, state: MindMapState, label: &str) {
        self.history.begin_restore();
        self.apply_state(state, label);
        self.history.end_restore();
        info!(label = %label, nodes = self.editor.nodes().len(), "mind map restored");
    }

    /// Wipe the board and its history, leaving a single fresh root node.
    pub fn clear(&mut self) -> Option<NodeId> {
        self.editor.clear();
        self.history.clear();
        self.interaction.reset();
        let id = self.editor.add_root_node(None);
        self.commit("Clear mind map");
        info!(root = ?id, "mind map cleared");
        id
    }

    // ---- Search / import / export ----

    pub fn search(&mut self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let hits = search::search_nodes(&self.editor, query, MAX_SEARCH_RESULTS);
        if hits.is_empty() {
            self.notifier
                .notify(&format!("No matches found for \"{query}\""), Severity::Error);
        } else {
            self.notifier
                .notify(&format!("Found matches for \"{query}\""), Severity::Success);
        }
        hits
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.editor.state())?)
    }

    /// Replace the board with an exported mind map. Undoable.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let state: MindMapState = serde_json::from_str(json)?;
        GraphEditor::check_ids(&state)?;
        self.apply_state(state, "Import mind map");
        info!(nodes = self.editor.nodes().len(), "mind map imported");
        Ok(())
    }

    // ---- Keyboard ----

    pub fn handle_key(&mut self, key: &KeyInput) -> KeyOutcome {
        let Some(command) = dispatch_mindmap_key(&self.interaction, key) else {
            return KeyOutcome::Ignored;
        };
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::AddChild => {
                // Dispatch only yields AddChild with a selection; a stale one
                // is reported through the notifier.
                let _ = self.add_child_to_selection();
            }
            Command::RemoveSelected => {
                if let Some(selected) = self.interaction.selected() {
                    let size = self.removal_size(selected);
                    if size > 1 {
                        return KeyOutcome::NeedsConfirmation(command, size);
                    }
                    self.remove_node(selected);
                }
            }
            Command::Deselect => self.deselect(),
            Command::CommitEdit => {
                self.commit_edit();
            }
            Command::CancelEdit => self.cancel_edit(),
            Command::CancelDrag => self.cancel_drag(),
            Command::PreviousWeek | Command::NextWeek | Command::Today => {
                return KeyOutcome::Ignored;
            }
        }
        KeyOutcome::Handled(command)
    }

    // ---- Persistence ----

    pub fn has_pending_save(&self) -> bool {
        self.writes.is_pending()
    }

    /// Write the board if the debounce delay has passed. Returns true when a
    /// write happened.
    pub fn poll_save(&mut self, now: Instant) -> Result<bool> {
        if !self.writes.take_due(now) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Write any pending change immediately.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.writes.take_pending() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&mut self) -> Result<()> {
        debug!(key = %self.key, nodes = self.editor.nodes().len(), "saving mind map");
        storage::save_json(&mut self.store, &self.key, self.editor.state())
    }
}
