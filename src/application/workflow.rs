//! Link → formats → download state machine.
//!
//! The workflow never performs I/O. Each operation returns an [`Effect`]
//! describing the request the shell should run, stamped with a [`Ticket`].
//! Completions are fed back through [`DownloadWorkflow::resolution_finished`]
//! and [`DownloadWorkflow::download_finished`]; a completion whose ticket is
//! not the one currently awaited is dropped.

use crate::api::ApiError;
use crate::domain::{AppError, DownloadAck, Format, Operation, ResolvedFile, SourceLink};

/// Identifies one outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Everything needed to commit a download, kept so a failed attempt can be
/// retried without resolving again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    pub link: SourceLink,
    pub file: ResolvedFile,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Checking {
        link: SourceLink,
        ticket: Ticket,
    },
    AwaitingFormatChoice {
        link: SourceLink,
        file: ResolvedFile,
        selected: Option<Format>,
    },
    Downloading {
        pending: PendingDownload,
        ticket: Ticket,
    },
    Error {
        error: AppError,
        /// Present when a download failed; confirming again retries it.
        retry: Option<PendingDownload>,
    },
}

/// Request the shell must perform on behalf of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Resolve {
        ticket: Ticket,
        link: SourceLink,
    },
    Download {
        ticket: Ticket,
        link: SourceLink,
        format: Format,
    },
    RefreshHistory,
}

#[derive(Debug)]
pub struct DownloadWorkflow {
    input: String,
    state: WorkflowState,
    notice: Option<String>,
    next_ticket: u64,
}

impl Default for DownloadWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadWorkflow {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            state: WorkflowState::Idle,
            notice: None,
            next_ticket: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            WorkflowState::Checking { .. } | WorkflowState::Downloading { .. }
        )
    }

    pub fn error(&self) -> Option<&AppError> {
        match &self.state {
            WorkflowState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Success message from the last completed download.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn resolved_file(&self) -> Option<&ResolvedFile> {
        match &self.state {
            WorkflowState::AwaitingFormatChoice { file, .. } => Some(file),
            WorkflowState::Downloading { pending, .. } => Some(&pending.file),
            WorkflowState::Error {
                retry: Some(pending),
                ..
            } => Some(&pending.file),
            _ => None,
        }
    }

    pub fn selected_format(&self) -> Option<&Format> {
        match &self.state {
            WorkflowState::AwaitingFormatChoice { selected, .. } => selected.as_ref(),
            WorkflowState::Downloading { pending, .. } => Some(&pending.format),
            WorkflowState::Error {
                retry: Some(pending),
                ..
            } => Some(&pending.format),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading()
    }

    pub fn can_select(&self) -> bool {
        matches!(
            self.state,
            WorkflowState::AwaitingFormatChoice { .. }
                | WorkflowState::Error { retry: Some(_), .. }
        )
    }

    pub fn can_confirm(&self) -> bool {
        matches!(
            self.state,
            WorkflowState::AwaitingFormatChoice {
                selected: Some(_),
                ..
            } | WorkflowState::Error { retry: Some(_), .. }
        )
    }

    /// Replaces the link text. Any resolved file, selection or error belongs
    /// to the old text, so the workflow drops back to `Idle`; an in-flight
    /// request becomes stale.
    pub fn edit_link(&mut self, text: String) {
        if text == self.input {
            return;
        }
        self.input = text;
        self.notice = None;

        if !matches!(self.state, WorkflowState::Idle) {
            tracing::debug!("link edited, resetting workflow");
            self.state = WorkflowState::Idle;
        }
    }

    /// Validates the current input and, if it is usable, starts resolving it.
    pub fn submit(&mut self) -> Option<Effect> {
        if self.is_loading() {
            return None;
        }
        self.notice = None;

        match SourceLink::parse(&self.input) {
            Ok(link) => {
                let ticket = self.issue_ticket();
                tracing::info!(%link, "checking link");
                self.state = WorkflowState::Checking {
                    link: link.clone(),
                    ticket,
                };
                Some(Effect::Resolve { ticket, link })
            }
            Err(e) => {
                tracing::debug!("rejected link: {e}");
                self.state = WorkflowState::Error {
                    error: e.into(),
                    retry: None,
                };
                None
            }
        }
    }

    pub fn resolution_finished(&mut self, ticket: Ticket, result: Result<ResolvedFile, ApiError>) {
        let link = match &self.state {
            WorkflowState::Checking {
                link,
                ticket: current,
            } if *current == ticket => link.clone(),
            _ => {
                tracing::debug!(?ticket, "discarding stale resolution");
                return;
            }
        };

        self.state = match result {
            Ok(file) => {
                tracing::info!(title = %file.title, formats = file.formats().len(), "link resolved");
                WorkflowState::AwaitingFormatChoice {
                    link,
                    file,
                    selected: None,
                }
            }
            Err(e) => {
                tracing::warn!("resolution failed: {e}");
                WorkflowState::Error {
                    error: AppError::from_api(Operation::Resolve, &e),
                    retry: None,
                }
            }
        };
    }

    /// Picks a format. Returns false when the workflow is not choosing one or
    /// the format is not offered by the resolved file.
    pub fn select_format(&mut self, format: Format) -> bool {
        match &mut self.state {
            WorkflowState::AwaitingFormatChoice { file, selected, .. } if file.offers(&format) => {
                *selected = Some(format);
                true
            }
            WorkflowState::Error {
                retry: Some(pending),
                ..
            } if pending.file.offers(&format) => {
                pending.format = format;
                true
            }
            _ => false,
        }
    }

    /// Commits the selected format, or retries a failed download.
    pub fn confirm(&mut self) -> Option<Effect> {
        let pending = match &self.state {
            WorkflowState::AwaitingFormatChoice {
                link,
                file,
                selected: Some(format),
            } => PendingDownload {
                link: link.clone(),
                file: file.clone(),
                format: format.clone(),
            },
            WorkflowState::Error {
                retry: Some(pending),
                ..
            } => pending.clone(),
            _ => return None,
        };

        let ticket = self.issue_ticket();
        tracing::info!(link = %pending.link, format = %pending.format, "downloading");
        let effect = Effect::Download {
            ticket,
            link: pending.link.clone(),
            format: pending.format.clone(),
        };
        self.state = WorkflowState::Downloading { pending, ticket };
        Some(effect)
    }

    /// Returns `Some(Effect::RefreshHistory)` whenever the backend recorded a
    /// download, even if the user has moved on since.
    pub fn download_finished(
        &mut self,
        ticket: Ticket,
        result: Result<DownloadAck, ApiError>,
    ) -> Option<Effect> {
        let is_current = matches!(
            &self.state,
            WorkflowState::Downloading { ticket: current, .. } if *current == ticket
        );

        if !is_current {
            tracing::debug!(?ticket, "discarding stale download completion");
            return result.ok().map(|_| Effect::RefreshHistory);
        }

        let WorkflowState::Downloading { pending, .. } =
            std::mem::replace(&mut self.state, WorkflowState::Idle)
        else {
            return None;
        };

        match result {
            Ok(ack) => {
                tracing::info!(title = %pending.file.title, format = %pending.format, "download recorded");
                self.input.clear();
                self.notice = Some(ack.message.unwrap_or_else(|| {
                    format!("Saved {} as {}", pending.file.title, pending.format)
                }));
                Some(Effect::RefreshHistory)
            }
            Err(e) => {
                tracing::warn!("download failed: {e}");
                self.state = WorkflowState::Error {
                    error: AppError::from_api(Operation::Download, &e),
                    retry: Some(pending),
                };
                None
            }
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LinkError;

    const LINK: &str = "https://freepik.com/premium/abstract-gradient-12345";

    fn file(formats: &[&str]) -> ResolvedFile {
        ResolvedFile::new("Abstract Gradient".into(), None, formats.iter().copied()).unwrap()
    }

    fn fmt(name: &str) -> Format {
        Format::new(name).unwrap()
    }

    fn resolve_ticket(effect: Option<Effect>) -> Ticket {
        match effect {
            Some(Effect::Resolve { ticket, .. }) => ticket,
            other => panic!("expected resolve effect, got {other:?}"),
        }
    }

    fn download_ticket(effect: Option<Effect>) -> Ticket {
        match effect {
            Some(Effect::Download { ticket, .. }) => ticket,
            other => panic!("expected download effect, got {other:?}"),
        }
    }

    /// Workflow sitting in AwaitingFormatChoice for `LINK`.
    fn awaiting(formats: &[&str]) -> DownloadWorkflow {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(LINK.to_string());
        let ticket = resolve_ticket(wf.submit());
        wf.resolution_finished(ticket, Ok(file(formats)));
        wf
    }

    #[test]
    fn test_empty_input_never_requests() {
        for input in ["", "   ", "\t\n"] {
            let mut wf = DownloadWorkflow::new();
            wf.edit_link(input.to_string());
            assert_eq!(wf.submit(), None);
            assert_eq!(wf.error(), Some(&AppError::InvalidLink(LinkError::Empty)));
            assert_eq!(wf.error().unwrap().to_string(), "No link supplied");
        }
    }

    #[test]
    fn test_unsupported_link_rejected_locally() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link("https://example.com/not-supported".to_string());
        assert_eq!(wf.submit(), None);
        assert_eq!(wf.error().unwrap().to_string(), "Not a recognized link");
        assert!(!wf.is_loading());
    }

    #[test]
    fn test_submit_starts_checking() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(format!("  {LINK} "));
        match wf.submit() {
            Some(Effect::Resolve { link, .. }) => assert_eq!(link.as_str(), LINK),
            other => panic!("unexpected {other:?}"),
        }
        assert!(wf.is_loading());
        assert!(!wf.can_submit());
        // a second submit while loading is refused
        assert_eq!(wf.submit(), None);
    }

    #[test]
    fn test_resolution_offers_exact_formats_and_gates_confirm() {
        let mut wf = awaiting(&["PSD", "PNG"]);

        let offered: Vec<&str> = wf
            .resolved_file()
            .unwrap()
            .formats()
            .iter()
            .map(Format::as_str)
            .collect();
        assert_eq!(offered, vec!["PSD", "PNG"]);
        assert!(matches!(wf.state(), WorkflowState::AwaitingFormatChoice { .. }));
        assert!(!wf.can_confirm());
        assert_eq!(wf.confirm(), None);

        assert!(wf.select_format(fmt("PNG")));
        assert!(wf.can_confirm());
    }

    #[test]
    fn test_foreign_format_cannot_be_selected() {
        let mut wf = awaiting(&["PSD", "PNG"]);
        assert!(!wf.select_format(fmt("SVG")));
        assert_eq!(wf.selected_format(), None);
        assert!(!wf.can_confirm());
    }

    #[test]
    fn test_reselecting_stays_in_choice() {
        let mut wf = awaiting(&["PSD", "PNG"]);
        assert!(wf.select_format(fmt("PSD")));
        assert!(wf.select_format(fmt("PNG")));
        assert_eq!(wf.selected_format(), Some(&fmt("PNG")));
        assert!(matches!(wf.state(), WorkflowState::AwaitingFormatChoice { .. }));
    }

    #[test]
    fn test_select_before_resolution_is_refused() {
        let mut wf = DownloadWorkflow::new();
        assert!(!wf.select_format(fmt("PNG")));
        assert!(!wf.can_select());
        assert_eq!(wf.confirm(), None);
    }

    #[test]
    fn test_successful_download_clears_and_refreshes_once() {
        let mut wf = awaiting(&["PSD", "PNG"]);
        wf.select_format(fmt("PSD"));
        let effect = wf.confirm();
        match &effect {
            Some(Effect::Download { format, link, .. }) => {
                assert_eq!(format, &fmt("PSD"));
                assert_eq!(link.as_str(), LINK);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(wf.is_loading());
        assert!(!wf.can_confirm());
        let ticket = download_ticket(effect);

        let effect = wf.download_finished(ticket, Ok(DownloadAck::default()));
        assert_eq!(effect, Some(Effect::RefreshHistory));
        assert_eq!(wf.input(), "");
        assert_eq!(wf.selected_format(), None);
        assert_eq!(wf.resolved_file(), None);
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.notice(), Some("Saved Abstract Gradient as PSD"));

        // a duplicate completion must not trigger a second refresh via the current path
        assert_eq!(
            wf.download_finished(ticket, Err(ApiError::Connection("late".into()))),
            None
        );
        assert_eq!(wf.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_backend_notice_is_used() {
        let mut wf = awaiting(&["PNG"]);
        wf.select_format(fmt("PNG"));
        let ticket = download_ticket(wf.confirm());
        wf.download_finished(
            ticket,
            Ok(DownloadAck {
                message: Some("Ready in PNG".into()),
            }),
        );
        assert_eq!(wf.notice(), Some("Ready in PNG"));

        wf.edit_link("x".into());
        assert_eq!(wf.notice(), None);
    }

    #[test]
    fn test_failed_download_keeps_selection_for_retry() {
        let mut wf = awaiting(&["PSD", "PNG"]);
        wf.select_format(fmt("PNG"));
        let ticket = download_ticket(wf.confirm());

        let effect = wf.download_finished(
            ticket,
            Err(ApiError::Backend {
                status: 500,
                message: None,
            }),
        );
        assert_eq!(effect, None);
        assert_eq!(wf.error().unwrap().to_string(), "Download failed");
        assert_eq!(wf.selected_format(), Some(&fmt("PNG")));
        assert_eq!(wf.input(), LINK);
        assert!(wf.can_confirm());

        // switch format and retry
        assert!(wf.select_format(fmt("PSD")));
        match wf.confirm() {
            Some(Effect::Download { format, .. }) => assert_eq!(format, fmt("PSD")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_editing_while_choosing_resets() {
        let mut wf = awaiting(&["PSD", "PNG"]);
        wf.select_format(fmt("PSD"));

        wf.edit_link("https://freepik.com/premium/other-999".to_string());
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.selected_format(), None);
        assert_eq!(wf.resolved_file(), None);
        assert_eq!(wf.confirm(), None);

        // a fresh resolution is required
        assert!(matches!(wf.submit(), Some(Effect::Resolve { .. })));
    }

    #[test]
    fn test_edit_clears_error_and_resubmit() {
        let mut wf = DownloadWorkflow::new();
        wf.submit();
        assert!(wf.error().is_some());

        wf.edit_link(LINK.to_string());
        assert!(wf.error().is_none());
        assert!(matches!(wf.submit(), Some(Effect::Resolve { .. })));
    }

    #[test]
    fn test_resolution_error_verbatim_message() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(LINK.to_string());
        let ticket = resolve_ticket(wf.submit());
        wf.resolution_finished(
            ticket,
            Err(ApiError::Backend {
                status: 403,
                message: Some("file not public".into()),
            }),
        );
        assert_eq!(wf.error().unwrap().to_string(), "file not public");
        assert!(!wf.is_loading());
        assert!(!wf.can_confirm());
    }

    #[test]
    fn test_connection_error_differs_from_backend_error() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(LINK.to_string());
        let ticket = resolve_ticket(wf.submit());
        wf.resolution_finished(ticket, Err(ApiError::Connection("refused".into())));
        assert_eq!(wf.error(), Some(&AppError::Connection));

        let ticket = resolve_ticket(wf.submit());
        wf.resolution_finished(ticket, Err(ApiError::MissingFileInfo));
        assert_eq!(
            wf.error().unwrap().to_string(),
            "Could not retrieve file information"
        );
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(LINK.to_string());
        let old = resolve_ticket(wf.submit());

        wf.edit_link("https://flaticon.com/free-icon/cat_1".to_string());
        let new = resolve_ticket(wf.submit());
        assert_ne!(old, new);

        // the first request answers late
        wf.resolution_finished(old, Ok(file(&["GIF"])));
        assert!(matches!(wf.state(), WorkflowState::Checking { .. }));

        wf.resolution_finished(new, Ok(file(&["SVG", "PNG"])));
        let offered: Vec<&str> = wf
            .resolved_file()
            .unwrap()
            .formats()
            .iter()
            .map(Format::as_str)
            .collect();
        assert_eq!(offered, vec!["SVG", "PNG"]);
    }

    #[test]
    fn test_resolution_after_edit_is_discarded() {
        let mut wf = DownloadWorkflow::new();
        wf.edit_link(LINK.to_string());
        let ticket = resolve_ticket(wf.submit());
        wf.edit_link("https://freepik.com/other".to_string());

        wf.resolution_finished(ticket, Ok(file(&["PNG"])));
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.resolved_file(), None);
    }

    #[test]
    fn test_stale_download_refreshes_history_only() {
        let mut wf = awaiting(&["PNG"]);
        wf.select_format(fmt("PNG"));
        let ticket = download_ticket(wf.confirm());
        wf.edit_link("https://freepik.com/next".to_string());

        let effect = wf.download_finished(ticket, Ok(DownloadAck::default()));
        assert_eq!(effect, Some(Effect::RefreshHistory));
        assert_eq!(wf.input(), "https://freepik.com/next");
        assert_eq!(wf.notice(), None);
        assert_eq!(wf.state(), &WorkflowState::Idle);

        // stale failures are silent
        assert_eq!(
            wf.download_finished(ticket, Err(ApiError::Connection("x".into()))),
            None
        );
    }

    #[test]
    fn test_independent_instances() {
        let mut a = awaiting(&["PNG"]);
        let b = DownloadWorkflow::new();
        a.select_format(fmt("PNG"));
        assert!(a.can_confirm());
        assert!(!b.can_confirm());
        assert_eq!(b.input(), "");
    }
}
