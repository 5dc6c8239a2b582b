use crate::config::WorkbenchConfig;
use crate::error::WorkbenchError;
use crate::history::HistoryManager;
use crate::model::{EventId, NodeId};
use crate::napi_convert::*;
use crate::napi_dto::*;
use crate::notify::RecordingNotifier;
use crate::storage::FileStore;
use crate::workspace::{CalendarWorkspace, MindMapWorkspace};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

fn load_config(config_json: Option<String>) -> napi::Result<WorkbenchConfig> {
    match config_json {
        Some(json) => WorkbenchConfig::from_json(&json).map_err(napi::Error::from),
        None => Ok(WorkbenchConfig::default()),
    }
}

fn to_json(value: &serde_json::Value) -> napi::Result<String> {
    serde_json::to_string(value).map_err(|e| napi::Error::from_reason(e.to_string()))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ---- JsMindMap ----

#[napi]
pub struct JsMindMap {
    inner: MindMapWorkspace<FileStore, RecordingNotifier>,
}

#[napi]
impl JsMindMap {
    #[napi(factory)]
    pub fn open(dir: String, config_json: Option<String>) -> napi::Result<Self> {
        crate::init_tracing();
        let config = load_config(config_json)?;
        let store = FileStore::open(Path::new(&dir)).map_err(napi::Error::from)?;
        let inner = MindMapWorkspace::open(store, RecordingNotifier::new(), &config);
        info!(dir = %dir, "JsMindMap opened");
        Ok(JsMindMap { inner })
    }

    #[napi]
    pub fn nodes(&self) -> Vec<JsNode> {
        convert_vec(self.inner.nodes())
    }

    #[napi]
    pub fn connections(&self) -> Vec<JsConnection> {
        convert_vec(self.inner.connections())
    }

    #[napi]
    pub fn interaction(&self) -> JsInteraction {
        JsInteraction::from(self.inner.interaction())
    }

    #[napi]
    pub fn history_status(&self) -> JsHistoryStatus {
        JsHistoryStatus::from(self.inner.history())
    }

    #[napi]
    pub fn ancestors(&self, node_id: u32) -> Vec<u32> {
        self.inner
            .editor()
            .ancestors(NodeId(node_id as u64))
            .into_iter()
            .map(js_node_id)
            .collect()
    }

    #[napi]
    pub fn add_root_node(&mut self, position: Option<JsPosition>) -> Option<u32> {
        self.inner
            .add_root_node(position.map(|p| (p.x, p.y)))
            .map(js_node_id)
    }

    #[napi]
    pub fn add_child_node(&mut self, parent_id: u32) -> Option<u32> {
        self.inner
            .add_child_node(NodeId(parent_id as u64))
            .map(js_node_id)
    }

    #[napi]
    pub fn add_child_to_selection(&mut self) -> napi::Result<u32> {
        let id = self.inner.add_child_to_selection().map_err(napi::Error::from)?;
        Ok(js_node_id(id))
    }

    #[napi]
    pub fn removal_size(&self, node_id: u32) -> u32 {
        self.inner.removal_size(NodeId(node_id as u64)) as u32
    }

    #[napi]
    pub fn remove_node(&mut self, node_id: u32) -> Vec<u32> {
        self.inner
            .remove_node(NodeId(node_id as u64))
            .into_iter()
            .map(js_node_id)
            .collect()
    }

    #[napi]
    pub fn remove_selected(&mut self) -> napi::Result<Vec<u32>> {
        let removed = self.inner.remove_selected().map_err(napi::Error::from)?;
        Ok(removed.into_iter().map(js_node_id).collect())
    }

    #[napi]
    pub fn select(&mut self, node_id: u32) -> bool {
        self.inner.select(NodeId(node_id as u64))
    }

    #[napi]
    pub fn deselect(&mut self) {
        self.inner.deselect();
    }

    #[napi]
    pub fn begin_edit(&mut self, node_id: u32) -> bool {
        self.inner.begin_edit(NodeId(node_id as u64))
    }

    #[napi]
    pub fn update_draft(&mut self, text: String) -> bool {
        self.inner.update_draft(&text)
    }

    #[napi]
    pub fn commit_edit(&mut self) -> bool {
        self.inner.commit_edit()
    }

    #[napi]
    pub fn cancel_edit(&mut self) {
        self.inner.cancel_edit();
    }

    #[napi]
    pub fn begin_drag(&mut self, node_id: u32) -> bool {
        self.inner.begin_drag(NodeId(node_id as u64))
    }

    #[napi]
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        self.inner.drag_to(x, y)
    }

    #[napi]
    pub fn end_drag(&mut self) -> bool {
        self.inner.end_drag()
    }

    #[napi]
    pub fn cancel_drag(&mut self) {
        self.inner.cancel_drag();
    }

    #[napi]
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    #[napi]
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[napi]
    pub fn clear(&mut self) -> Option<u32> {
        self.inner.clear().map(js_node_id)
    }

    #[napi]
    pub fn search(&mut self, query: String) -> Vec<JsSearchHit> {
        debug!(query = %query, "search");
        convert_vec(&self.inner.search(&query))
    }

    #[napi]
    pub fn export_json(&self) -> napi::Result<String> {
        self.inner.export_json().map_err(napi::Error::from)
    }

    #[napi]
    pub fn import_json(&mut self, json: String) -> napi::Result<()> {
        self.inner.import_json(&json).map_err(napi::Error::from)
    }

    #[napi]
    pub fn handle_key(&mut self, input: JsKeyInput) -> JsKeyOutcome {
        JsKeyOutcome::from(self.inner.handle_key(&input.into()))
    }

    #[napi]
    pub fn drain_notices(&mut self) -> Vec<JsNotice> {
        convert_vec(&self.inner.notifier_mut().drain())
    }

    #[napi]
    pub fn has_pending_save(&self) -> bool {
        self.inner.has_pending_save()
    }

    #[napi]
    pub fn poll_save(&mut self) -> napi::Result<bool> {
        self.inner.poll_save(Instant::now()).map_err(napi::Error::from)
    }

    #[napi]
    pub fn flush(&mut self) -> napi::Result<bool> {
        self.inner.flush().map_err(napi::Error::from)
    }
}

// ---- JsCalendar ----

#[napi]
pub struct JsCalendar {
    inner: CalendarWorkspace<FileStore, RecordingNotifier>,
}

#[napi]
impl JsCalendar {
    #[napi(factory)]
    pub fn open(dir: String, config_json: Option<String>) -> napi::Result<Self> {
        crate::init_tracing();
        let config = load_config(config_json)?;
        let store = FileStore::open(Path::new(&dir)).map_err(napi::Error::from)?;
        let inner = CalendarWorkspace::open(store, RecordingNotifier::new(), &config, today());
        info!(dir = %dir, "JsCalendar opened");
        Ok(JsCalendar { inner })
    }

    #[napi]
    pub fn events(&self) -> Vec<JsEvent> {
        convert_vec(self.inner.events())
    }

    #[napi]
    pub fn events_in_week(&self) -> Vec<JsEvent> {
        self.inner
            .board()
            .events_in_week()
            .into_iter()
            .map(JsEvent::from)
            .collect()
    }

    #[napi]
    pub fn events_on(&self, date: String) -> napi::Result<Vec<JsEvent>> {
        let date = parse_date(&date)?;
        Ok(self
            .inner
            .board()
            .events_on(date)
            .into_iter()
            .map(JsEvent::from)
            .collect())
    }

    #[napi]
    pub fn week_start(&self) -> String {
        self.inner.week_start().format("%Y-%m-%d").to_string()
    }

    #[napi]
    pub fn history_status(&self) -> JsHistoryStatus {
        JsHistoryStatus::from(self.inner.history())
    }

    #[napi]
    pub fn add_event(&mut self, input: JsNewEventInput) -> napi::Result<String> {
        let input = js_new_event_to_model(input)?;
        let id = self.inner.add_event(input).map_err(napi::Error::from)?;
        Ok(id.0)
    }

    #[napi]
    pub fn move_event(&mut self, id: String, date: String, start_hour: f64) -> napi::Result<bool> {
        let date = parse_date(&date)?;
        Ok(self.inner.move_event(&EventId(id), date, start_hour))
    }

    #[napi]
    pub fn resize_event(&mut self, id: String, duration: f64) -> bool {
        self.inner.resize_event(&EventId(id), duration)
    }

    #[napi]
    pub fn edit_event(&mut self, id: String, edit: JsEventEditInput) -> napi::Result<bool> {
        self.inner
            .edit_event(&EventId(id), edit.into())
            .map_err(napi::Error::from)
    }

    #[napi]
    pub fn delete_event(&mut self, id: String) -> napi::Result<JsEvent> {
        match self.inner.delete_event(&EventId(id.clone())) {
            Some(removed) => Ok(JsEvent::from(&removed)),
            None => Err(WorkbenchError::EventNotFound(id).into()),
        }
    }

    #[napi]
    pub fn change_week(&mut self, days: i32) {
        self.inner.change_week(days as i64);
    }

    #[napi]
    pub fn go_to_today(&mut self) {
        self.inner.go_to_today(today());
    }

    /// Hours since the start of the grid, or null outside the grid.
    #[napi]
    pub fn current_time_offset(&self) -> Option<f64> {
        self.inner
            .current_time_offset(chrono::Local::now().naive_local())
    }

    #[napi]
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    #[napi]
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[napi]
    pub fn handle_key(&mut self, input: JsKeyInput) -> JsKeyOutcome {
        JsKeyOutcome::from(self.inner.handle_key(&input.into(), today()))
    }

    #[napi]
    pub fn drain_notices(&mut self) -> Vec<JsNotice> {
        convert_vec(&self.inner.notifier_mut().drain())
    }

    #[napi]
    pub fn has_pending_save(&self) -> bool {
        self.inner.has_pending_save()
    }

    #[napi]
    pub fn poll_save(&mut self) -> napi::Result<bool> {
        self.inner.poll_save(Instant::now()).map_err(napi::Error::from)
    }

    #[napi]
    pub fn flush(&mut self) -> napi::Result<bool> {
        self.inner.flush().map_err(napi::Error::from)
    }
}

// ---- JsHistory ----

/// Undo history for UI features whose state lives on the JS side. States
/// cross the boundary as JSON text.
#[napi]
pub struct JsHistory {
    inner: HistoryManager<serde_json::Value>,
}

#[napi]
impl JsHistory {
    #[napi(constructor)]
    pub fn new(capacity: Option<u32>) -> Self {
        crate::init_tracing();
        let inner = match capacity {
            Some(c) => HistoryManager::with_capacity(c as usize),
            None => HistoryManager::default(),
        };
        JsHistory { inner }
    }

    #[napi]
    pub fn add_state(&mut self, state_json: String, label: String) -> napi::Result<()> {
        let state: serde_json::Value = serde_json::from_str(&state_json)
            .map_err(|e| napi::Error::from(WorkbenchError::from(e)))?;
        self.inner.add_state(&state, &label);
        Ok(())
    }

    #[napi]
    pub fn undo(&mut self) -> napi::Result<Option<String>> {
        self.inner.undo().as_ref().map(to_json).transpose()
    }

    #[napi]
    pub fn redo(&mut self) -> napi::Result<Option<String>> {
        self.inner.redo().as_ref().map(to_json).transpose()
    }

    #[napi]
    pub fn begin_restore(&mut self) {
        self.inner.begin_restore();
    }

    #[napi]
    pub fn end_restore(&mut self) {
        self.inner.end_restore();
    }

    #[napi]
    pub fn status(&self) -> JsHistoryStatus {
        JsHistoryStatus::from(&self.inner)
    }

    #[napi]
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
