use crate::model::NodeId;

/// What the pointer/keyboard is currently doing on the mind-map canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Editing { node: NodeId, draft: String },
    Dragging { node: NodeId, origin: (f64, f64), moved: bool },
}

/// Selection and gesture state. At most one node is selected and at most one
/// node is being edited or dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    selected: Option<NodeId>,
    mode: Mode,
}

impl Default for Interaction {
    fn default() -> Self {
        Interaction {
            selected: None,
            mode: Mode::Idle,
        }
    }
}

impl Interaction {
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, Mode::Dragging { .. })
    }

    pub fn editing_node(&self) -> Option<NodeId> {
        match self.mode {
            Mode::Editing { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn select(&mut self, node: NodeId) {
        self.selected = Some(node);
    }

    /// Clear selection and abandon any gesture in progress.
    pub fn reset(&mut self) {
        self.selected = None;
        self.mode = Mode::Idle;
    }

    /// Forget `node` if it is referenced by the selection or a gesture.
    pub fn forget(&mut self, removed: &[NodeId]) {
        if self.selected.is_some_and(|s| removed.contains(&s)) {
            self.selected = None;
        }
        let gesture_node = match self.mode {
            Mode::Editing { node, .. } | Mode::Dragging { node, .. } => Some(node),
            Mode::Idle => None,
        };
        if gesture_node.is_some_and(|n| removed.contains(&n)) {
            self.mode = Mode::Idle;
        }
    }

    pub fn begin_edit(&mut self, node: NodeId, current_text: &str) {
        self.selected = Some(node);
        self.mode = Mode::Editing {
            node,
            draft: current_text.to_string(),
        };
    }

    pub fn update_draft(&mut self, text: &str) -> bool {
        match &mut self.mode {
            Mode::Editing { draft, .. } => {
                *draft = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Leave editing mode, handing back the node and its draft text.
    pub fn finish_edit(&mut self) -> Option<(NodeId, String)> {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Editing { node, draft } => Some((node, draft)),
            other => {
                self.mode = other;
                None
            }
        }
    }

    pub fn begin_drag(&mut self, node: NodeId, origin: (f64, f64)) {
        self.selected = Some(node);
        self.mode = Mode::Dragging {
            node,
            origin,
            moved: false,
        };
    }

    /// Record a movement. Returns the dragged node, or `None` when no drag is
    /// in progress.
    pub fn drag_moved(&mut self) -> Option<NodeId> {
        match &mut self.mode {
            Mode::Dragging { node, moved, .. } => {
                *moved = true;
                Some(*node)
            }
            _ => None,
        }
    }

    /// Leave dragging mode, handing back node, origin and whether it moved.
    pub fn finish_drag(&mut self) -> Option<(NodeId, (f64, f64), bool)> {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Dragging { node, origin, moved } => Some((node, origin, moved)),
            other => {
                self.mode = other;
                None
            }
        }
    }
}

/// A key press as reported by the UI shell, using DOM `KeyboardEvent.key` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        KeyInput {
            key: key.to_string(),
            ctrl: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        KeyInput {
            key: key.to_string(),
            ctrl: true,
        }
    }

    fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    AddChild,
    RemoveSelected,
    Deselect,
    CommitEdit,
    CancelEdit,
    CancelDrag,
    PreviousWeek,
    NextWeek,
    Today,
}

/// Map a key press on the mind map to a command. While a node's text is being
/// edited only Enter and Escape are claimed; every other key, Delete and the
/// undo shortcuts included, belongs to the text field.
pub fn dispatch_mindmap_key(interaction: &Interaction, key: &KeyInput) -> Option<Command> {
    if interaction.is_editing() {
        if key.is("Enter") {
            return Some(Command::CommitEdit);
        }
        if key.is("Escape") {
            return Some(Command::CancelEdit);
        }
        return None;
    }
    if interaction.is_dragging() {
        return key.is("Escape").then_some(Command::CancelDrag);
    }

    if key.ctrl {
        if key.is("z") {
            return Some(Command::Undo);
        }
        if key.is("y") {
            return Some(Command::Redo);
        }
        return None;
    }

    interaction.selected()?;
    if key.is("Escape") {
        Some(Command::Deselect)
    } else if key.is("Delete") || key.is("Backspace") {
        Some(Command::RemoveSelected)
    } else if key.is("Enter") {
        Some(Command::AddChild)
    } else {
        None
    }
}

pub fn dispatch_calendar_key(key: &KeyInput) -> Option<Command> {
    if !key.ctrl {
        return None;
    }
    let command = if key.is("z") {
        Command::Undo
    } else if key.is("y") {
        Command::Redo
    } else if key.is("ArrowLeft") {
        Command::PreviousWeek
    } else if key.is("ArrowRight") {
        Command::NextWeek
    } else if key.is("t") {
        Command::Today
    } else {
        return None;
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(interaction: &Interaction, key: KeyInput) -> Option<Command> {
        dispatch_mindmap_key(interaction, &key)
    }

    #[test]
    fn test_editing_captures_keys() {
        let mut interaction = Interaction::default();
        interaction.begin_edit(NodeId(1), "Idea");

        assert_eq!(press(&interaction, KeyInput::plain("Enter")), Some(Command::CommitEdit));
        assert_eq!(press(&interaction, KeyInput::plain("Escape")), Some(Command::CancelEdit));
        assert_eq!(press(&interaction, KeyInput::plain("Delete")), None);
        assert_eq!(press(&interaction, KeyInput::ctrl("z")), None);
    }

    #[test]
    fn test_idle_shortcuts() {
        let mut interaction = Interaction::default();
        assert_eq!(press(&interaction, KeyInput::ctrl("Z")), Some(Command::Undo));
        assert_eq!(press(&interaction, KeyInput::ctrl("y")), Some(Command::Redo));
        assert_eq!(press(&interaction, KeyInput::plain("Delete")), None);

        interaction.select(NodeId(3));
        assert_eq!(press(&interaction, KeyInput::plain("Delete")), Some(Command::RemoveSelected));
        assert_eq!(press(&interaction, KeyInput::plain("Enter")), Some(Command::AddChild));
        assert_eq!(press(&interaction, KeyInput::plain("Escape")), Some(Command::Deselect));
    }

    #[test]
    fn test_drag_escape_cancels() {
        let mut interaction = Interaction::default();
        interaction.begin_drag(NodeId(2), (10.0, 10.0));
        assert_eq!(press(&interaction, KeyInput::plain("Escape")), Some(Command::CancelDrag));
        assert_eq!(press(&interaction, KeyInput::ctrl("z")), None);
    }

    #[test]
    fn test_finish_edit_returns_draft() {
        let mut interaction = Interaction::default();
        assert!(interaction.finish_edit().is_none());

        interaction.begin_edit(NodeId(4), "Old");
        assert!(interaction.update_draft("New"));
        assert_eq!(interaction.finish_edit(), Some((NodeId(4), "New".to_string())));
        assert!(!interaction.is_editing());
        assert_eq!(interaction.selected(), Some(NodeId(4)));
    }

    #[test]
    fn test_finish_drag_reports_movement() {
        let mut interaction = Interaction::default();
        interaction.begin_drag(NodeId(5), (1.0, 2.0));
        assert_eq!(interaction.drag_moved(), Some(NodeId(5)));
        assert_eq!(interaction.finish_drag(), Some((NodeId(5), (1.0, 2.0), true)));
        assert_eq!(interaction.drag_moved(), None);
    }

    #[test]
    fn test_forget_removed_nodes() {
        let mut interaction = Interaction::default();
        interaction.begin_edit(NodeId(6), "x");
        interaction.forget(&[NodeId(6), NodeId(7)]);
        assert_eq!(interaction.selected(), None);
        assert_eq!(interaction.mode(), &Mode::Idle);
    }

    #[test]
    fn test_calendar_keys() {
        let left = dispatch_calendar_key(&KeyInput::ctrl("ArrowLeft"));
        assert_eq!(left, Some(Command::PreviousWeek));
        let right = dispatch_calendar_key(&KeyInput::ctrl("ArrowRight"));
        assert_eq!(right, Some(Command::NextWeek));
        assert_eq!(dispatch_calendar_key(&KeyInput::ctrl("t")), Some(Command::Today));
        assert_eq!(dispatch_calendar_key(&KeyInput::plain("t")), None);
    }
}
