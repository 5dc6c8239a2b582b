use crate::error::{Result, WorkbenchError};
use crate::model::*;
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_ROOT_POSITION: (f64, f64) = (200.0, 200.0);
pub const CHILD_OFFSET: (f64, f64) = (150.0, 80.0);

/// Node ids cross the Node-API boundary as `u32`.
pub const MAX_NODE_ID: u64 = u32::MAX as u64;

/// The mind-map forest: nodes linked by `parent_id`, plus the parallel
/// connection list the renderer draws.
#[derive(Debug, Clone, Default)]
pub struct GraphEditor {
    state: MindMapState,
}

impl GraphEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an editor from persisted or snapshotted state.
    ///
    /// Dangling parent references are cut loose to roots, connections are
    /// regenerated from `parent_id`, and `next_id` is bumped past every
    /// existing id so ids are never handed out twice.
    pub fn from_state(mut state: MindMapState) -> Self {
        let ids: HashSet<NodeId> = state.nodes.iter().map(|n| n.id).collect();
        for node in &mut state.nodes {
            if let Some(pid) = node.parent_id {
                if pid == node.id || !ids.contains(&pid) {
                    debug!(node = %node.id, parent = %pid, "dropping dangling parent");
                    node.parent_id = None;
                }
            }
        }

        let mut editor = GraphEditor { state };
        editor.break_cycles();
        editor.state.connections = editor.derived_connections();

        let max_id = editor.state.nodes.iter().map(|n| n.id.0).max().unwrap_or(0);
        if editor.state.next_id <= max_id {
            editor.state.next_id = max_id.saturating_add(1);
        }
        editor
    }

    /// Reject state whose ids fall outside the range the bindings can carry.
    pub fn check_ids(state: &MindMapState) -> Result<()> {
        if let Some(node) = state.nodes.iter().find(|n| n.id.0 > MAX_NODE_ID) {
            return Err(WorkbenchError::NodeIdOutOfRange(node.id.0));
        }
        if state.next_id > MAX_NODE_ID + 1 {
            return Err(WorkbenchError::NodeIdOutOfRange(state.next_id));
        }
        Ok(())
    }

    pub fn state(&self) -> &MindMapState {
        &self.state
    }

    pub fn to_state(&self) -> MindMapState {
        self.state.clone()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.state.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.state.connections
    }

    pub fn next_id(&self) -> u64 {
        self.state.next_id
    }

    /// Make sure ids below `floor` are never allocated again.
    pub fn reserve_ids_below(&mut self, floor: u64) {
        self.state.next_id = self.state.next_id.max(floor);
    }

    pub fn is_empty(&self) -> bool {
        self.state.nodes.is_empty()
    }

    pub fn get(&self, node_id: NodeId) -> Option<&GraphNode> {
        self.state.nodes.iter().find(|n| n.id == node_id)
    }

    fn get_mut(&mut self, node_id: NodeId) -> Option<&mut GraphNode> {
        self.state.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.get(node_id).is_some()
    }

    pub fn children_of(&self, node_id: NodeId) -> impl Iterator<Item = &GraphNode> {
        self.state
            .nodes
            .iter()
            .filter(move |n| n.parent_id == Some(node_id))
    }

    /// `None` once every id up to `MAX_NODE_ID` has been handed out.
    fn allocate_id(&mut self) -> Option<NodeId> {
        if self.state.next_id > MAX_NODE_ID {
            debug!(next_id = self.state.next_id, "node ids exhausted");
            return None;
        }
        let id = NodeId(self.state.next_id);
        self.state.next_id += 1;
        Some(id)
    }

    /// Add a root at `position`, or the default spot. Non-finite coordinates
    /// are refused.
    pub fn add_root_node(&mut self, position: Option<(f64, f64)>) -> Option<NodeId> {
        let (x, y) = position.unwrap_or(DEFAULT_ROOT_POSITION);
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let id = self.allocate_id()?;
        self.state.nodes.push(GraphNode {
            id,
            text: ROOT_PLACEHOLDER.to_string(),
            x,
            y,
            parent_id: None,
        });
        debug!(node = %id, "root node added");
        Some(id)
    }

    pub fn add_child_node(&mut self, parent_id: NodeId) -> Option<NodeId> {
        let (px, py) = {
            let parent = self.get(parent_id)?;
            (parent.x, parent.y)
        };

        let id = self.allocate_id()?;
        self.state.nodes.push(GraphNode {
            id,
            text: CHILD_PLACEHOLDER.to_string(),
            x: px + CHILD_OFFSET.0,
            y: py + CHILD_OFFSET.1,
            parent_id: Some(parent_id),
        });
        self.state.connections.push(Connection {
            from: parent_id,
            to: id,
        });
        debug!(node = %id, parent = %parent_id, "child node added");
        Some(id)
    }

    /// Remove `node_id` and its whole subtree. Returns the removed ids, empty
    /// when the id is stale.
    pub fn remove_node(&mut self, node_id: NodeId) -> Vec<NodeId> {
        let to_delete = self.find_descendants(node_id);
        if to_delete.is_empty() {
            return to_delete;
        }

        let delete_set: HashSet<NodeId> = to_delete.iter().copied().collect();
        self.state
            .connections
            .retain(|c| !delete_set.contains(&c.from) && !delete_set.contains(&c.to));
        self.state.nodes.retain(|n| !delete_set.contains(&n.id));

        debug!(node = %node_id, cascade = to_delete.len(), "node removed");
        to_delete
    }

    pub fn set_node_text(&mut self, node_id: NodeId, text: &str) -> bool {
        let Some(node) = self.get_mut(node_id) else {
            return false;
        };
        let trimmed = text.trim();
        node.text = if trimmed.is_empty() {
            BLANK_PLACEHOLDER.to_string()
        } else {
            trimmed.to_string()
        };
        true
    }

    pub fn move_node(&mut self, node_id: NodeId, x: f64, y: f64) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let Some(node) = self.get_mut(node_id) else {
            return false;
        };
        node.x = x;
        node.y = y;
        true
    }

    /// `node_id` followed by every node reachable through child links, in
    /// depth-first pre-order. Empty when the id is stale.
    pub fn find_descendants(&self, node_id: NodeId) -> Vec<NodeId> {
        if !self.contains(node_id) {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            result.push(id);
            let children: Vec<NodeId> = self.children_of(id).map(|n| n.id).collect();
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// Ancestors of `node_id`, nearest parent first.
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.get(node_id).and_then(|n| n.parent_id);
        while let Some(pid) = current {
            if ancestors.contains(&pid) || pid == node_id {
                break;
            }
            ancestors.push(pid);
            current = self.get(pid).and_then(|n| n.parent_id);
        }
        ancestors
    }

    pub fn roots(&self) -> impl Iterator<Item = &GraphNode> {
        self.state.nodes.iter().filter(|n| n.is_root())
    }

    /// Drop every node and connection. The id counter keeps running so ids
    /// held by late UI callbacks can never match a new node.
    pub fn clear(&mut self) {
        self.state.nodes.clear();
        self.state.connections.clear();
    }

    fn derived_connections(&self) -> Vec<Connection> {
        self.state
            .nodes
            .iter()
            .filter_map(|n| n.parent_id.map(|pid| Connection { from: pid, to: n.id }))
            .collect()
    }

    fn break_cycles(&mut self) {
        let ids: Vec<NodeId> = self.state.nodes.iter().map(|n| n.id).collect();
        for id in ids {
            let mut visited = HashSet::new();
            visited.insert(id);
            let mut current = self.get(id).and_then(|n| n.parent_id);
            while let Some(pid) = current {
                if pid == id {
                    if let Some(node) = self.get_mut(id) {
                        debug!(node = %id, "breaking parent cycle");
                        node.parent_id = None;
                    }
                    break;
                }
                if !visited.insert(pid) {
                    break;
                }
                current = self.get(pid).and_then(|n| n.parent_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_connections_match_parents(editor: &GraphEditor) {
        let mut expected = editor.derived_connections();
        let mut actual = editor.connections().to_vec();
        expected.sort_by_key(|c| (c.from, c.to));
        actual.sort_by_key(|c| (c.from, c.to));
        assert_eq!(expected, actual);
    }

    fn node(id: u64, text: &str, parent: Option<u64>) -> GraphNode {
        GraphNode {
            id: NodeId(id),
            text: text.to_string(),
            x: 0.0,
            y: 0.0,
            parent_id: parent.map(NodeId),
        }
    }

    #[test]
    fn test_add_root_node_defaults() {
        let mut editor = GraphEditor::new();
        let id = editor.add_root_node(None).unwrap();
        let node = editor.get(id).unwrap();
        assert_eq!(id, NodeId(1));
        assert_eq!(node.text, ROOT_PLACEHOLDER);
        assert_eq!((node.x, node.y), DEFAULT_ROOT_POSITION);
        assert!(node.is_root());
        assert_eq!(editor.next_id(), 2);
    }

    #[test]
    fn test_add_child_node_creates_connection() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(Some((10.0, 20.0))).unwrap();
        let child = editor.add_child_node(root).unwrap();

        let node = editor.get(child).unwrap();
        assert_eq!(node.parent_id, Some(root));
        assert_eq!(node.text, CHILD_PLACEHOLDER);
        assert_eq!((node.x, node.y), (160.0, 100.0));
        assert_eq!(editor.connections(), &[Connection { from: root, to: child }]);
    }

    #[test]
    fn test_add_child_to_stale_parent_is_noop() {
        let mut editor = GraphEditor::new();
        editor.add_root_node(None);
        let before = editor.to_state();
        assert!(editor.add_child_node(NodeId(42)).is_none());
        assert_eq!(editor.to_state(), before);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(None).unwrap();
        let c1 = editor.add_child_node(root).unwrap();
        let c2 = editor.add_child_node(c1).unwrap();

        let removed = editor.remove_node(c1);
        assert_eq!(removed, vec![c1, c2]);
        assert_eq!(editor.nodes().len(), 1);
        assert_eq!(editor.nodes()[0].id, root);
        assert!(editor.connections().is_empty());
        assert!(!editor.contains(c1));
        assert!(!editor.contains(c2));
    }

    #[test]
    fn test_remove_subtree_leaves_siblings() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(None).unwrap();
        let a = editor.add_child_node(root).unwrap();
        let b = editor.add_child_node(root).unwrap();
        let a1 = editor.add_child_node(a).unwrap();
        let b1 = editor.add_child_node(b).unwrap();

        editor.remove_node(a);
        for gone in [a, a1] {
            assert!(!editor.contains(gone));
            assert!(editor.connections().iter().all(|c| c.from != gone && c.to != gone));
        }
        assert!(editor.contains(b) && editor.contains(b1));
        assert_connections_match_parents(&editor);
    }

    #[test]
    fn test_remove_stale_node_is_noop() {
        let mut editor = GraphEditor::new();
        editor.add_root_node(None);
        let before = editor.to_state();
        assert!(editor.remove_node(NodeId(99)).is_empty());
        assert_eq!(editor.to_state(), before);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(None).unwrap();
        let child = editor.add_child_node(root).unwrap();
        editor.remove_node(child);
        let next = editor.add_child_node(root).unwrap();
        assert!(next.0 > child.0);
    }

    #[test]
    fn test_set_node_text_blank_uses_placeholder() {
        let mut editor = GraphEditor::new();
        let id = editor.add_root_node(None).unwrap();

        assert!(editor.set_node_text(id, ""));
        assert_eq!(editor.get(id).unwrap().text, BLANK_PLACEHOLDER);

        assert!(editor.set_node_text(id, "   "));
        assert_eq!(editor.get(id).unwrap().text, BLANK_PLACEHOLDER);

        assert!(editor.set_node_text(id, "  Project ideas "));
        assert_eq!(editor.get(id).unwrap().text, "Project ideas");

        assert!(!editor.set_node_text(NodeId(7), "ghost"));
    }

    #[test]
    fn test_move_node_allows_negative_positions() {
        let mut editor = GraphEditor::new();
        let id = editor.add_root_node(None).unwrap();
        assert!(editor.move_node(id, -40.0, -5.5));
        let node = editor.get(id).unwrap();
        assert_eq!((node.x, node.y), (-40.0, -5.5));
        assert!(!editor.move_node(NodeId(3), 0.0, 0.0));
    }

    #[test]
    fn test_find_descendants_preorder() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(None).unwrap();
        let a = editor.add_child_node(root).unwrap();
        let a1 = editor.add_child_node(a).unwrap();
        let b = editor.add_child_node(root).unwrap();

        assert_eq!(editor.find_descendants(root), vec![root, a, a1, b]);
        assert_eq!(editor.find_descendants(b), vec![b]);
        assert!(editor.find_descendants(NodeId(100)).is_empty());
    }

    #[test]
    fn test_ancestors() {
        let mut editor = GraphEditor::new();
        let root = editor.add_root_node(None).unwrap();
        let a = editor.add_child_node(root).unwrap();
        let a1 = editor.add_child_node(a).unwrap();
        assert_eq!(editor.ancestors(a1), vec![a, root]);
        assert!(editor.ancestors(root).is_empty());
    }

    #[test]
    fn test_from_state_repairs_references() {
        let state = MindMapState {
            nodes: vec![
                node(1, "A", None),
                node(2, "B", Some(1)),
                node(5, "C", Some(9)),
            ],
            connections: vec![Connection { from: NodeId(9), to: NodeId(5) }],
            next_id: 3,
        };
        let editor = GraphEditor::from_state(state);

        assert!(editor.get(NodeId(5)).unwrap().is_root());
        let expected = Connection {
            from: NodeId(1),
            to: NodeId(2),
        };
        assert_eq!(editor.connections(), &[expected]);
        assert_eq!(editor.next_id(), 6);
    }

    #[test]
    fn test_from_state_breaks_cycles() {
        let state = MindMapState {
            nodes: vec![
                node(1, "A", Some(2)),
                node(2, "B", Some(1)),
            ],
            connections: vec![],
            next_id: 3,
        };
        let editor = GraphEditor::from_state(state);
        assert!(editor.roots().count() >= 1);
        let reachable =
            editor.find_descendants(NodeId(1)).len() + editor.find_descendants(NodeId(2)).len();
        assert_eq!(reachable, 3);
        assert_connections_match_parents(&editor);
    }

    #[test]
    fn test_clear_keeps_id_counter() {
        let mut editor = GraphEditor::new();
        editor.add_root_node(None);
        editor.clear();
        assert!(editor.is_empty());
        assert!(editor.connections().is_empty());
        assert_eq!(editor.add_root_node(None), Some(NodeId(2)));
    }

    #[test]
    fn test_non_finite_positions_rejected() {
        let mut editor = GraphEditor::new();
        assert!(editor.add_root_node(Some((f64::NAN, 0.0))).is_none());
        assert!(editor.add_root_node(Some((0.0, f64::INFINITY))).is_none());
        assert!(editor.is_empty());
        assert_eq!(editor.next_id(), 1);

        let id = editor.add_root_node(Some((5.0, 6.0))).unwrap();
        assert!(!editor.move_node(id, f64::NAN, 10.0));
        assert!(!editor.move_node(id, 10.0, f64::NEG_INFINITY));
        let node = editor.get(id).unwrap();
        assert_eq!((node.x, node.y), (5.0, 6.0));
    }

    #[test]
    fn test_ids_exhausted_at_max() {
        let state = MindMapState {
            next_id: MAX_NODE_ID,
            ..Default::default()
        };
        let mut editor = GraphEditor::from_state(state);
        let last = editor.add_root_node(None).unwrap();
        assert_eq!(last, NodeId(MAX_NODE_ID));
        assert!(editor.add_root_node(None).is_none());
        assert!(editor.add_child_node(last).is_none());
        assert_eq!(editor.nodes().len(), 1);
    }

    #[test]
    fn test_from_state_huge_id_does_not_overflow() {
        let state = MindMapState {
            nodes: vec![node(u64::MAX, "A", None)],
            connections: vec![],
            next_id: 1,
        };
        let mut editor = GraphEditor::from_state(state);
        assert_eq!(editor.next_id(), u64::MAX);
        assert!(editor.add_root_node(None).is_none());
    }

    #[test]
    fn test_check_ids_range() {
        let fits = MindMapState {
            nodes: vec![node(MAX_NODE_ID, "A", None)],
            connections: vec![],
            next_id: MAX_NODE_ID + 1,
        };
        assert!(GraphEditor::check_ids(&fits).is_ok());

        let big_node = MindMapState {
            nodes: vec![node(MAX_NODE_ID + 1, "A", None)],
            ..Default::default()
        };
        assert!(matches!(
            GraphEditor::check_ids(&big_node),
            Err(WorkbenchError::NodeIdOutOfRange(_))
        ));

        let big_counter = MindMapState {
            next_id: u64::MAX,
            ..Default::default()
        };
        assert!(GraphEditor::check_ids(&big_counter).is_err());
    }
}
