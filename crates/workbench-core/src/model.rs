use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredEventId")]
pub struct EventId(pub String);

/// Older saves used millisecond timestamps as event ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEventId {
    Text(String),
    Number(serde_json::Number),
}

impl From<StoredEventId> for EventId {
    fn from(raw: StoredEventId) -> Self {
        match raw {
            StoredEventId::Text(s) => EventId(s),
            StoredEventId::Number(n) => EventId(n.to_string()),
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate `as_str()` and `from_str()` for a snake_case enum.
macro_rules! str_enum {
    ($T:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $T {
            pub fn as_str(&self) -> &str {
                match self { $( $T::$variant => $s, )+ }
            }
            pub fn from_str(s: &str) -> Option<$T> {
                match s { $( $s => Some($T::$variant), )+ _ => None }
            }
        }
        impl std::fmt::Display for $T {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Notification severity, mirrored by the UI toast styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

str_enum!(Severity {
    Info => "info",
    Success => "success",
    Warning => "warning",
    Error => "error",
});

pub const ROOT_PLACEHOLDER: &str = "New Root Node";
pub const CHILD_PLACEHOLDER: &str = "New Child Node";
pub const BLANK_PLACEHOLDER: &str = "Unnamed Node";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub parent_id: Option<NodeId>,
}

impl GraphNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Parent-to-child edge kept alongside `parent_id` for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

fn first_node_id() -> u64 {
    1
}

/// Persisted and snapshotted shape of the mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapState {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default = "first_node_id")]
    pub next_id: u64,
}

impl Default for MindMapState {
    fn default() -> Self {
        MindMapState {
            nodes: Vec::new(),
            connections: Vec::new(),
            next_id: first_node_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    pub start_hour: f64,
    pub duration: f64,
    pub color: String,
}

impl CalendarEvent {
    pub fn end_hour(&self) -> f64 {
        self.start_hour + self.duration
    }
}

/// Calendar history snapshot: the event list plus the week on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarState {
    pub events: Vec<CalendarEvent>,
    pub week_start: NaiveDate,
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mindmap_state_wire_shape() {
        let state = MindMapState {
            nodes: vec![GraphNode {
                id: NodeId(1),
                text: "Root".to_string(),
                x: 10.0,
                y: 20.0,
                parent_id: None,
            }],
            connections: vec![],
            next_id: 2,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["nextId"], 2);
        assert_eq!(json["nodes"][0]["id"], 1);
        assert!(json["nodes"][0]["parentId"].is_null());
    }

    #[test]
    fn test_mindmap_state_missing_fields_default() {
        let state: MindMapState = serde_json::from_str("{}").unwrap();
        assert!(state.nodes.is_empty());
        assert!(state.connections.is_empty());
        assert_eq!(state.next_id, 1);
    }

    #[test]
    fn test_calendar_event_wire_shape() {
        let json = r##"{"id":"e1","title":"Standup","date":"2024-03-05",
            "startHour":9.25,"duration":0.5,"color":"#4a90e2"}"##;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(event.end_hour(), 9.75);
    }

    #[test]
    fn test_numeric_event_id_accepted() {
        let json = r##"{"id":1709630000000,"title":"Old","date":"2024-03-05",
            "startHour":9,"duration":1,"color":"#4a90e2"}"##;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, EventId("1709630000000".to_string()));
        assert_eq!(serde_json::to_value(&event).unwrap()["id"], "1709630000000");
    }

    #[test]
    fn test_monday_of() {
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(monday_of(sunday), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(monday_of(monday), monday);
    }

    #[test]
    fn test_severity_str() {
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::from_str("error"), Some(Severity::Error));
        assert_eq!(Severity::from_str("loud"), None);
    }
}
