use super::KeyOutcome;
use crate::calendar::{CalendarBoard, EventEdit, NewEvent};
use crate::config::WorkbenchConfig;
use crate::error::Result;
use crate::history::HistoryManager;
use crate::interaction::{dispatch_calendar_key, Command, KeyInput};
use crate::model::*;
use crate::notify::Notifier;
use crate::storage::{self, KeyValueStore, WriteBehind};
use chrono::{NaiveDate, NaiveDateTime};
use std::time::Instant;
use tracing::{debug, info, warn};

/// `9.5` -> `9:30am`, `13.0` -> `1:00pm`.
pub fn format_hour(hour: f64) -> String {
    let total_minutes = (hour * 60.0).round() as i64;
    let h = total_minutes.div_euclid(60).rem_euclid(24);
    let m = total_minutes.rem_euclid(60);
    let suffix = if h < 12 { "am" } else { "pm" };
    let h12 = match h % 12 {
        0 => 12,
        n => n,
    };
    format!("{h12}:{m:02}{suffix}")
}

/// The calendar feature: event board, its undo history and debounced
/// persistence of the event list.
pub struct CalendarWorkspace<S, N> {
    board: CalendarBoard,
    history: HistoryManager<CalendarState>,
    store: S,
    notifier: N,
    key: String,
    writes: WriteBehind,
}

impl<S: KeyValueStore, N: Notifier> CalendarWorkspace<S, N> {
    pub fn open(store: S, mut notifier: N, config: &WorkbenchConfig, today: NaiveDate) -> Self {
        let events = match storage::load_json::<Vec<CalendarEvent>>(&store, &config.calendar_key) {
            Ok(events) => events.unwrap_or_default(),
            Err(e) => {
                warn!(key = %config.calendar_key, error = %e, "starting with an empty calendar");
                notifier.notify("Failed to load saved calendar events", Severity::Error);
                Vec::new()
            }
        };
        let board = CalendarBoard::with_events(events, today, config.display_window());

        let mut history = HistoryManager::with_capacity(config.calendar_history_capacity);
        history.add_state(&board.snapshot(), "Initial calendar state");

        info!(key = %config.calendar_key, events = board.events().len(), "calendar opened");
        CalendarWorkspace {
            board,
            history,
            store,
            notifier,
            key: config.calendar_key.clone(),
            writes: WriteBehind::new(config.save_debounce()),
        }
    }

    pub fn board(&self) -> &CalendarBoard {
        &self.board
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.board.events()
    }

    pub fn week_start(&self) -> NaiveDate {
        self.board.week_start()
    }

    pub fn history(&self) -> &HistoryManager<CalendarState> {
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

    fn commit(&mut self, label: &str) {
        self.history.add_state(&self.board.snapshot(), label);
        self.writes.schedule(Instant::now());
    }

    pub fn add_event(&mut self, input: NewEvent) -> Result<EventId> {
        let id = match self.board.add_event(input) {
            Ok(id) => id,
            Err(e) => {
                self.notifier.notify(&e.to_string(), Severity::Error);
                return Err(e);
            }
        };
        self.commit("Add calendar event");
        if let Some(event) = self.board.get(&id) {
            let message = format!("Event \"{}\" added successfully", event.title);
            self.notifier.notify(&message, Severity::Success);
        }
        info!(event = %id, "add_event");
        Ok(id)
    }

    pub fn move_event(&mut self, id: &EventId, date: NaiveDate, start_hour: f64) -> bool {
        if !self.board.move_event(id, date, start_hour) {
            debug!(event = %id, "move_event ignored");
            return false;
        }
        self.commit("Move event");
        if let Some(event) = self.board.get(id) {
            let message = format!("Event moved to {}", format_hour(event.start_hour));
            self.notifier.notify(&message, Severity::Success);
        }
        true
    }

    pub fn resize_event(&mut self, id: &EventId, duration: f64) -> bool {
        if !self.board.resize_event(id, duration) {
            return false;
        }
        self.commit("Resize event");
        true
    }

    pub fn edit_event(&mut self, id: &EventId, edit: EventEdit) -> Result<bool> {
        let edited = match self.board.edit_event(id, edit) {
            Ok(edited) => edited,
            Err(e) => {
                self.notifier.notify(&e.to_string(), Severity::Error);
                return Err(e);
            }
        };
        if edited {
            self.commit("Edit event");
            self.notifier.notify("Event updated successfully", Severity::Success);
        }
        Ok(edited)
    }

    pub fn delete_event(&mut self, id: &EventId) -> Option<CalendarEvent> {
        let Some(removed) = self.board.delete_event(id) else {
            self.notifier.notify("Event not found", Severity::Error);
            return None;
        };
        self.commit("Delete event");
        self.notifier
            .notify(&format!("\"{}\" deleted", removed.title), Severity::Info);
        info!(event = %id, "delete_event");
        Some(removed)
    }

    /// Week navigation is a view change: not recorded, not persisted.
    pub fn change_week(&mut self, days: i64) {
        self.board.change_week(days);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.board.go_to_today(today);
        self.notifier.notify("Showing current week", Severity::Info);
    }

    pub fn current_time_offset(&self, now: NaiveDateTime) -> Option<f64> {
        self.board.current_time_offset(now)
    }

    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            self.notifier.notify("Nothing to undo", Severity::Info);
            return false;
        };
        let label = self.history.redo_description().unwrap_or("Action").to_string();
        self.restore(state);
        self.notifier.notify(&format!("Undo: {label}"), Severity::Info);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            self.notifier.notify("Nothing to redo", Severity::Info);
            return false;
        };
        let label = self.history.current_description().unwrap_or("Action").to_string();
        self.restore(state);
        self.notifier.notify(&format!("Redo: {label}"), Severity::Info);
        true
    }

    fn restore(&mut self, state: CalendarState) {
        self.history.begin_restore();
        self.board.restore(state);
        self.commit("Restore");
        self.history.end_restore();
        info!(events = self.board.events().len(), "calendar restored");
    }

    pub fn handle_key(&mut self, key: &KeyInput, today: NaiveDate) -> KeyOutcome {
        let Some(command) = dispatch_calendar_key(key) else {
            return KeyOutcome::Ignored;
        };
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::PreviousWeek => self.change_week(-7),
            Command::NextWeek => self.change_week(7),
            Command::Today => self.go_to_today(today),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled(command)
    }

    pub fn has_pending_save(&self) -> bool {
        self.writes.is_pending()
    }

    pub fn poll_save(&mut self, now: Instant) -> Result<bool> {
        if !self.writes.take_due(now) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<bool> {
        if !self.writes.take_pending() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&mut self) -> Result<()> {
        debug!(key = %self.key, events = self.board.events().len(), "saving calendar");
        storage::save_json(&mut self.store, &self.key, &self.board.events())
    }
}
