use crate::error::{Result, WorkbenchError};
use crate::model::*;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;
use uuid::Uuid;

pub const SLOT_HOURS: f64 = 0.25;
pub const MIN_DURATION: f64 = 0.25;
pub const MAX_DURATION: f64 = 10.0;
pub const DEFAULT_COLOR: &str = "#4a90e2";

/// Hours of the day the calendar grid shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayWindow {
    pub start_hour: f64,
    pub end_hour: f64,
}

impl Default for DisplayWindow {
    fn default() -> Self {
        DisplayWindow {
            start_hour: 8.0,
            end_hour: 19.0,
        }
    }
}

impl DisplayWindow {
    /// Latest start that still leaves room for the shortest event.
    pub fn latest_start(&self) -> f64 {
        self.end_hour - SLOT_HOURS
    }

    pub fn clamp_start(&self, hour: f64) -> f64 {
        hour.clamp(self.start_hour, self.latest_start())
    }

    /// Shorten `duration` so an event starting at `start` ends inside the window.
    pub fn fit_duration(&self, start: f64, duration: f64) -> f64 {
        duration.min(self.end_hour - start)
    }

    pub fn contains(&self, hour: f64) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

fn snap_to_slot(hour: f64) -> f64 {
    (hour / SLOT_HOURS).round() * SLOT_HOURS
}

fn clamp_duration(duration: f64) -> f64 {
    duration.clamp(MIN_DURATION, MAX_DURATION)
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub start_hour: f64,
    pub duration: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventEdit {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub color: Option<String>,
}

/// The calendar's event list and the week currently on screen.
#[derive(Debug, Clone)]
pub struct CalendarBoard {
    events: Vec<CalendarEvent>,
    week_start: NaiveDate,
    window: DisplayWindow,
}

impl CalendarBoard {
    pub fn new(today: NaiveDate, window: DisplayWindow) -> Self {
        CalendarBoard {
            events: Vec::new(),
            week_start: monday_of(today),
            window,
        }
    }

    pub fn with_events(
        events: Vec<CalendarEvent>,
        today: NaiveDate,
        window: DisplayWindow,
    ) -> Self {
        let mut board = Self::new(today, window);
        board.events = events;
        board
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn window(&self) -> DisplayWindow {
        self.window
    }

    pub fn get(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    fn get_mut(&mut self, id: &EventId) -> Option<&mut CalendarEvent> {
        self.events.iter_mut().find(|e| &e.id == id)
    }

    pub fn snapshot(&self) -> CalendarState {
        CalendarState {
            events: self.events.clone(),
            week_start: self.week_start,
        }
    }

    pub fn restore(&mut self, state: CalendarState) {
        self.events = state.events;
        self.week_start = monday_of(state.week_start);
    }

    pub fn add_event(&mut self, input: NewEvent) -> Result<EventId> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(WorkbenchError::EmptyTitle);
        }
        let non_finite = [input.start_hour, input.duration]
            .into_iter()
            .find(|v| !v.is_finite());
        if let Some(bad) = non_finite {
            return Err(WorkbenchError::InvalidTime(bad));
        }

        let start_hour = self.window.clamp_start(snap_to_slot(input.start_hour));
        let duration = self
            .window
            .fit_duration(start_hour, clamp_duration(input.duration));
        let id = EventId(Uuid::new_v4().to_string());

        self.events.push(CalendarEvent {
            id: id.clone(),
            title: title.to_string(),
            date: input.date,
            start_hour,
            duration,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        });
        debug!(event = %id, date = %input.date, start = start_hour, "event added");
        Ok(id)
    }

    /// Move an event to `date` at `start_hour`. The start is clamped into the
    /// window and the duration shortened when the event would run past its end.
    pub fn move_event(&mut self, id: &EventId, date: NaiveDate, start_hour: f64) -> bool {
        if !start_hour.is_finite() {
            return false;
        }
        let window = self.window;
        let Some(event) = self.get_mut(id) else {
            return false;
        };
        event.date = date;
        event.start_hour = window.clamp_start(start_hour);
        event.duration = window.fit_duration(event.start_hour, event.duration);
        debug!(
            event = %id,
            date = %date,
            start = event.start_hour,
            duration = event.duration,
            "event moved"
        );
        true
    }

    pub fn resize_event(&mut self, id: &EventId, duration: f64) -> bool {
        if !duration.is_finite() {
            return false;
        }
        let window = self.window;
        let Some(event) = self.get_mut(id) else {
            return false;
        };
        event.duration = window.fit_duration(event.start_hour, clamp_duration(duration));
        debug!(event = %id, duration = event.duration, "event resized");
        true
    }

    /// Apply an edit. Returns `Ok(false)` for a stale id or a non-finite
    /// duration and rejects blank titles without touching the event.
    pub fn edit_event(&mut self, id: &EventId, edit: EventEdit) -> Result<bool> {
        if edit.duration.is_some_and(|d| !d.is_finite()) {
            return Ok(false);
        }
        let title = match &edit.title {
            Some(t) if t.trim().is_empty() => return Err(WorkbenchError::EmptyTitle),
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };

        let window = self.window;
        let Some(event) = self.get_mut(id) else {
            return Ok(false);
        };
        if let Some(title) = title {
            event.title = title;
        }
        if let Some(duration) = edit.duration {
            event.duration = window.fit_duration(event.start_hour, clamp_duration(duration));
        }
        if let Some(color) = edit.color {
            event.color = color;
        }
        Ok(true)
    }

    pub fn delete_event(&mut self, id: &EventId) -> Option<CalendarEvent> {
        let index = self.events.iter().position(|e| &e.id == id)?;
        Some(self.events.remove(index))
    }

    /// Events on `date`, earliest first.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> =
            self.events.iter().filter(|e| e.date == date).collect();
        events.sort_by(|a, b| a.start_hour.total_cmp(&b.start_hour));
        events
    }

    /// Events in the displayed Monday–Sunday week, ordered by day then start.
    pub fn events_in_week(&self) -> Vec<&CalendarEvent> {
        let end = self.week_start + Duration::days(7);
        let mut events: Vec<&CalendarEvent> = self
            .events
            .iter()
            .filter(|e| e.date >= self.week_start && e.date < end)
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.start_hour.total_cmp(&b.start_hour)));
        events
    }

    pub fn change_week(&mut self, days: i64) {
        self.week_start = monday_of(self.week_start + Duration::days(days));
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.week_start = monday_of(today);
    }

    /// Hours elapsed since the start of the window, or `None` outside it.
    /// Drives the current-time indicator refreshed once a minute.
    pub fn current_time_offset(&self, now: NaiveDateTime) -> Option<f64> {
        let hour = now.hour() as f64 + now.minute() as f64 / 60.0;
        if !self.window.contains(hour) {
            return None;
        }
        Some(hour - self.window.start_hour)
    }
}
