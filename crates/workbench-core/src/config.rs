use crate::calendar::DisplayWindow;
use crate::error::{Result, WorkbenchError};
use serde::Deserialize;
use std::time::Duration;

/// Settings shared by the mind-map and calendar workspaces.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Undo depth for the mind map. Default: 20.
    pub mindmap_history_capacity: usize,
    /// Undo depth for the calendar. Default: 30.
    pub calendar_history_capacity: usize,
    /// Quiet period before a debounced save. Default: 500 ms.
    pub save_debounce_ms: u64,
    /// First hour shown on the calendar grid. Default: 8.
    pub day_start_hour: f64,
    /// Hour the calendar grid ends. Default: 19.
    pub day_end_hour: f64,
    pub mindmap_key: String,
    pub calendar_key: String,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            mindmap_history_capacity: 20,
            calendar_history_capacity: 30,
            save_debounce_ms: 500,
            day_start_hour: 8.0,
            day_end_hour: 19.0,
            mindmap_key: "mindmap_state".to_string(),
            calendar_key: "calendarEvents".to_string(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WorkbenchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mindmap_history_capacity == 0 || self.calendar_history_capacity == 0 {
            return Err(WorkbenchError::InvalidConfig(
                "history capacity must be positive".to_string(),
            ));
        }
        if !(0.0..24.0).contains(&self.day_start_hour)
            || self.day_end_hour > 24.0
            || self.day_end_hour - self.day_start_hour < 0.25
        {
            return Err(WorkbenchError::InvalidConfig(format!(
                "invalid day window {}-{}",
                self.day_start_hour, self.day_end_hour
            )));
        }
        if self.mindmap_key.is_empty()
            || self.calendar_key.is_empty()
            || self.mindmap_key == self.calendar_key
        {
            return Err(WorkbenchError::InvalidConfig(
                "storage keys must be distinct and non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn display_window(&self) -> DisplayWindow {
        DisplayWindow {
            start_hour: self.day_start_hour,
            end_hour: self.day_end_hour,
        }
    }
}
