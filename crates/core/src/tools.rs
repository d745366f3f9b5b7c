//! Assistant tool affordances exposed by the UI.
//!
//! Each tool maps to a canned natural-language command; the agent's own
//! language-understanding layer is the single interpreter of intent, so the
//! client never encodes tool semantics beyond the string. The email tool is
//! the one exception: it opens a local compose form and sends nothing.

/// The tools surfaced as buttons in the assistant UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantTool {
    Email,
    Screenshot,
    SystemStatus,
    Weather,
    News,
}

/// What triggering a tool does on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAction {
    /// Send this command string over the data channel for the agent to interpret.
    SendCommand(&'static str),
    /// Open the local email compose form; nothing goes on the wire.
    OpenEmailComposer,
}

impl AssistantTool {
    pub fn action(self) -> ToolAction {
        match self {
            AssistantTool::Email => ToolAction::OpenEmailComposer,
            AssistantTool::Screenshot => {
                ToolAction::SendCommand("Take a screenshot of my screen")
            }
            AssistantTool::SystemStatus => {
                ToolAction::SendCommand("Give me a quick system status report")
            }
            AssistantTool::Weather => ToolAction::SendCommand("What's the weather like right now?"),
            AssistantTool::News => ToolAction::SendCommand("Give me the latest news headlines"),
        }
    }
}
