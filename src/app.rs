use iced::Task;

use crate::api::{ApiClient, ApiError};
use crate::application::{DownloadWorkflow, Effect, HistoryPanel, RefreshTicket, Ticket};
use crate::domain::{DownloadAck, DownloadRecord, ResolvedFile};
use crate::ui::{self, Tab, UiMessage};

pub struct GrabberApp {
    api_client: ApiClient,
    workflow: DownloadWorkflow,
    history: HistoryPanel,
    tab: Tab,
}

impl GrabberApp {
    pub fn new(api_client: ApiClient) -> Self {
        Self {
            api_client,
            workflow: DownloadWorkflow::new(),
            history: HistoryPanel::default(),
            tab: Tab::default(),
        }
    }

    pub fn workflow(&self) -> &DownloadWorkflow {
        &self.workflow
    }

    pub fn history(&self) -> &HistoryPanel {
        &self.history
    }

    /// Turns a workflow effect into the request that carries it out.
    fn run(&mut self, effect: Effect) -> Task<Message> {
        let client = self.api_client.clone();

        match effect {
            Effect::Resolve { ticket, link } => Task::perform(
                async move {
                    let hint = client.config().default_format.clone();
                    client.resolve(&link, &hint).await
                },
                move |result| Message::Resolved(ticket, result),
            ),
            Effect::Download {
                ticket,
                link,
                format,
            } => Task::perform(
                async move { client.download(&link, &format).await },
                move |result| Message::Downloaded(ticket, result),
            ),
            Effect::RefreshHistory => {
                let refresh = self.history.begin_refresh();
                Task::perform(
                    async move { client.list_history().await },
                    move |result| Message::HistoryLoaded(refresh, result),
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Ui(UiMessage),
    Resolved(Ticket, Result<ResolvedFile, ApiError>),
    Downloaded(Ticket, Result<DownloadAck, ApiError>),
    HistoryLoaded(RefreshTicket, Result<Vec<DownloadRecord>, ApiError>),
}

/// Builds the app around `api_client` and loads history once.
pub fn boot(api_client: ApiClient) -> (GrabberApp, Task<Message>) {
    let mut app = GrabberApp::new(api_client);
    tracing::info!(endpoint = %app.api_client.config().endpoint, "starting");
    let task = app.run(Effect::RefreshHistory);
    (app, task)
}

pub fn update(app: &mut GrabberApp, message: Message) -> Task<Message> {
    let effect = match message {
        Message::Ui(ui_msg) => match ui_msg {
            UiMessage::TabSelected(tab) => {
                app.tab = tab;
                None
            }
            UiMessage::LinkChanged(text) => {
                app.workflow.edit_link(text);
                None
            }
            UiMessage::SubmitPressed => app.workflow.submit(),
            UiMessage::FormatPicked(format) => {
                if !app.workflow.is_loading() {
                    app.workflow.select_format(format);
                }
                None
            }
            UiMessage::ConfirmPressed => app.workflow.confirm(),
            UiMessage::RefreshHistoryPressed => {
                (!app.history.is_loading()).then_some(Effect::RefreshHistory)
            }
        },
        Message::Resolved(ticket, result) => {
            app.workflow.resolution_finished(ticket, result);
            None
        }
        Message::Downloaded(ticket, result) => app.workflow.download_finished(ticket, result),
        Message::HistoryLoaded(refresh, result) => {
            app.history.apply(refresh, result);
            None
        }
    };

    match effect {
        Some(effect) => app.run(effect),
        None => Task::none(),
    }
}

pub fn view(app: &GrabberApp) -> iced::Element<'_, Message> {
    ui::view(app.tab, &app.workflow, &app.history).map(Message::Ui)
}
