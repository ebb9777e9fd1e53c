use crate::api::ApiError;
use crate::domain::DownloadRecord;

pub const EMPTY_TITLE: &str = "History is empty";
pub const EMPTY_HINT: &str = "Downloaded files will appear here";

/// Identifies one history fetch. Only the latest one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Last known download history. Fetch failures never replace it.
#[derive(Debug, Default)]
pub struct HistoryPanel {
    records: Vec<DownloadRecord>,
    loading: bool,
    loaded_once: bool,
    latest: u64,
}

/// What the history tab should show.
#[derive(Debug, PartialEq, Eq)]
pub enum HistoryDisplay<'a> {
    Loading,
    Empty { title: &'static str, hint: &'static str },
    Records(&'a [DownloadRecord]),
}

impl HistoryPanel {
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.latest += 1;
        self.loading = true;
        RefreshTicket(self.latest)
    }

    /// Applies a finished fetch. Results from superseded fetches are dropped
    /// and `loading` stays set until the latest one settles.
    pub fn apply(&mut self, ticket: RefreshTicket, result: Result<Vec<DownloadRecord>, ApiError>) {
        if ticket.0 != self.latest {
            tracing::debug!(?ticket, latest = self.latest, "discarding superseded history fetch");
            return;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "history loaded");
                self.records = records;
                self.loaded_once = true;
            }
            Err(e) => {
                tracing::warn!("history fetch failed, keeping {} cached records: {e}", self.records.len());
            }
        }
    }

    /// The fetch whose result will be applied, while one is in flight.
    pub fn pending(&self) -> Option<RefreshTicket> {
        self.loading.then_some(RefreshTicket(self.latest))
    }

    pub fn records(&self) -> &[DownloadRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn display(&self) -> HistoryDisplay<'_> {
        if self.records.is_empty() {
            if self.loading && !self.loaded_once {
                HistoryDisplay::Loading
            } else {
                HistoryDisplay::Empty {
                    title: EMPTY_TITLE,
                    hint: EMPTY_HINT,
                }
            }
        } else {
            HistoryDisplay::Records(&self.records)
        }
    }
}
