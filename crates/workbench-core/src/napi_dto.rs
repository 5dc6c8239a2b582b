// ---- Mind map DTO structs ----

#[napi(object)]
pub struct JsNode {
    pub id: u32,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub parent_id: Option<u32>,
}

#[napi(object)]
pub struct JsConnection {
    pub from: u32,
    pub to: u32,
}

#[napi(object)]
pub struct JsPosition {
    pub x: f64,
    pub y: f64,
}

#[napi(object)]
pub struct JsSearchHit {
    pub node_id: u32,
    pub text: String,
    pub score: f64,
    pub depth: u32,
}

#[napi(object)]
pub struct JsInteraction {
    pub selected: Option<u32>,
    pub mode: String, // "idle", "editing", "dragging"
    pub node: Option<u32>,
    pub draft: Option<String>,
}

// ---- Calendar DTO structs ----

#[napi(object)]
pub struct JsEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_hour: f64,
    pub duration: f64,
    pub color: String,
}

#[napi(object)]
pub struct JsNewEventInput {
    pub title: String,
    pub date: String,
    pub start_hour: f64,
    pub duration: f64,
    pub color: Option<String>,
}

#[napi(object)]
pub struct JsEventEditInput {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub color: Option<String>,
}

// ---- Shared DTO structs ----

#[napi(object)]
pub struct JsNotice {
    pub message: String,
    pub severity: String,
}

#[napi(object)]
pub struct JsKeyInput {
    pub key: String,
    pub ctrl: Option<bool>,
}

#[napi(object)]
pub struct JsKeyOutcome {
    pub outcome: String, // "handled", "needs_confirmation", "ignored"
    pub command: Option<String>,
    pub affected: Option<u32>,
}

#[napi(object)]
pub struct JsHistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
    pub last_recorded_at: Option<String>,
}
