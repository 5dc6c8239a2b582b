use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error("No node is selected")]
    NothingSelected,

    #[error("Event title cannot be empty")]
    EmptyTitle,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Node id out of range: {0}")]
    NodeIdOutOfRange(u64),

    #[error("Invalid time value: {0}")]
    InvalidTime(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;

impl From<WorkbenchError> for napi::Error {
    fn from(e: WorkbenchError) -> Self {
        napi::Error::from_reason(e.to_string())
    }
}
