mod download;
mod history;

use iced::{
    widget::{button, column, row, text, Space},
    Element, Length,
};

use crate::application::{DownloadWorkflow, HistoryPanel};
use crate::domain::Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Download,
    History,
}

#[derive(Debug, Clone)]
pub enum UiMessage {
    TabSelected(Tab),
    LinkChanged(String),
    SubmitPressed,
    FormatPicked(Format),
    ConfirmPressed,
    RefreshHistoryPressed,
}

pub fn view<'a>(
    tab: Tab,
    workflow: &'a DownloadWorkflow,
    history: &'a HistoryPanel,
) -> Element<'a, UiMessage> {
    let tabs = row![
        tab_button("Download", Tab::Download, tab),
        tab_button("History", Tab::History, tab),
    ]
    .spacing(10);

    let body = match tab {
        Tab::Download => download::view(workflow),
        Tab::History => history::view(history),
    };

    column![
        text("Asset Grabber").size(32),
        Space::new().height(Length::Fixed(10.0)),
        tabs,
        Space::new().height(Length::Fixed(10.0)),
        body,
    ]
    .padding(20)
    .spacing(10)
    .into()
}

fn tab_button(label: &str, tab: Tab, current: Tab) -> Element<'_, UiMessage> {
    let style = if tab == current {
        button::primary
    } else {
        button::secondary
    };

    button(text(label))
        .style(style)
        .on_press(UiMessage::TabSelected(tab))
        .padding([8, 16])
        .into()
}
