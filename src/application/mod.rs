pub mod history;
pub mod workflow;

pub use history::{HistoryDisplay, HistoryPanel, RefreshTicket};
pub use workflow::{DownloadWorkflow, Effect, Ticket, WorkflowState};
