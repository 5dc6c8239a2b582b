use crate::calendar::{EventEdit, NewEvent};
use crate::history::HistoryManager;
use crate::interaction::{Command, Interaction, KeyInput, Mode};
use crate::mindmap::MAX_NODE_ID;
use crate::model;
use crate::napi_dto::*;
use crate::notify::Notice;
use crate::search;
use crate::workspace::KeyOutcome;
use chrono::NaiveDate;

pub fn convert_vec<'a, T, U>(items: &'a [T]) -> Vec<U>
where
    U: From<&'a T>,
{
    items.iter().map(U::from).collect()
}

/// Workspaces only hold ids up to `MAX_NODE_ID`, so the cast is lossless.
pub fn js_node_id(id: model::NodeId) -> u32 {
    debug_assert!(id.0 <= MAX_NODE_ID);
    id.0 as u32
}

pub fn parse_date(s: &str) -> napi::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| napi::Error::from_reason(format!("invalid date {s:?}: {e}")))
}

pub fn command_name(command: Command) -> &'static str {
    match command {
        Command::Undo => "undo",
        Command::Redo => "redo",
        Command::AddChild => "add_child",
        Command::RemoveSelected => "remove_selected",
        Command::Deselect => "deselect",
        Command::CommitEdit => "commit_edit",
        Command::CancelEdit => "cancel_edit",
        Command::CancelDrag => "cancel_drag",
        Command::PreviousWeek => "previous_week",
        Command::NextWeek => "next_week",
        Command::Today => "today",
    }
}

// ---- From impls: domain -> JS ----

impl From<&model::GraphNode> for JsNode {
    fn from(node: &model::GraphNode) -> Self {
        JsNode {
            id: js_node_id(node.id),
            text: node.text.clone(),
            x: node.x,
            y: node.y,
            parent_id: node.parent_id.map(js_node_id),
        }
    }
}

impl From<&model::Connection> for JsConnection {
    fn from(c: &model::Connection) -> Self {
        JsConnection {
            from: js_node_id(c.from),
            to: js_node_id(c.to),
        }
    }
}

impl From<&search::SearchHit> for JsSearchHit {
    fn from(hit: &search::SearchHit) -> Self {
        JsSearchHit {
            node_id: js_node_id(hit.node_id),
            text: hit.text.clone(),
            score: hit.score,
            depth: hit.depth as u32,
        }
    }
}

impl From<&Interaction> for JsInteraction {
    fn from(interaction: &Interaction) -> Self {
        let (mode, node, draft) = match interaction.mode() {
            Mode::Idle => ("idle", None, None),
            Mode::Editing { node, draft } => {
                ("editing", Some(js_node_id(*node)), Some(draft.clone()))
            }
            Mode::Dragging { node, .. } => ("dragging", Some(js_node_id(*node)), None),
        };
        JsInteraction {
            selected: interaction.selected().map(js_node_id),
            mode: mode.to_string(),
            node,
            draft,
        }
    }
}

impl From<&model::CalendarEvent> for JsEvent {
    fn from(event: &model::CalendarEvent) -> Self {
        JsEvent {
            id: event.id.0.clone(),
            title: event.title.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            start_hour: event.start_hour,
            duration: event.duration,
            color: event.color.clone(),
        }
    }
}

impl From<&Notice> for JsNotice {
    fn from(notice: &Notice) -> Self {
        JsNotice {
            message: notice.message.clone(),
            severity: notice.severity.as_str().to_string(),
        }
    }
}

impl From<KeyOutcome> for JsKeyOutcome {
    fn from(outcome: KeyOutcome) -> Self {
        match outcome {
            KeyOutcome::Handled(command) => JsKeyOutcome {
                outcome: "handled".to_string(),
                command: Some(command_name(command).to_string()),
                affected: None,
            },
            KeyOutcome::NeedsConfirmation(command, affected) => JsKeyOutcome {
                outcome: "needs_confirmation".to_string(),
                command: Some(command_name(command).to_string()),
                affected: Some(affected as u32),
            },
            KeyOutcome::Ignored => JsKeyOutcome {
                outcome: "ignored".to_string(),
                command: None,
                affected: None,
            },
        }
    }
}

impl<T: Clone> From<&HistoryManager<T>> for JsHistoryStatus {
    fn from(history: &HistoryManager<T>) -> Self {
        JsHistoryStatus {
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            undo_description: history.undo_description().map(str::to_string),
            redo_description: history.redo_description().map(str::to_string),
            last_recorded_at: history.last_recorded_at().map(|t| t.to_rfc3339()),
        }
    }
}

// ---- JS -> domain ----

impl From<JsKeyInput> for KeyInput {
    fn from(input: JsKeyInput) -> Self {
        KeyInput {
            key: input.key,
            ctrl: input.ctrl.unwrap_or(false),
        }
    }
}

impl From<JsEventEditInput> for EventEdit {
    fn from(input: JsEventEditInput) -> Self {
        EventEdit {
            title: input.title,
            duration: input.duration,
            color: input.color,
        }
    }
}

pub fn js_new_event_to_model(input: JsNewEventInput) -> napi::Result<NewEvent> {
    Ok(NewEvent {
        date: parse_date(&input.date)?,
        title: input.title,
        start_hour: input.start_hour,
        duration: input.duration,
        color: input.color,
    })
}
