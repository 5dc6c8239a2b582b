pub mod calendar;
pub mod mindmap;

pub use calendar::CalendarWorkspace;
pub use mindmap::MindMapWorkspace;

use crate::interaction::Command;

/// Result of feeding a key press to a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key mapped to a command, which has been carried out.
    Handled(Command),
    /// The command would remove this many nodes; the shell must confirm and
    /// then call the removal itself.
    NeedsConfirmation(Command, usize),
    /// Not a shortcut here; the UI keeps the key.
    Ignored,
}
