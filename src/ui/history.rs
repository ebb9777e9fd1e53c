use iced::{
    widget::{button, column, container, row, scrollable, text, Column},
    Element, Length,
};

use super::UiMessage;
use crate::application::{HistoryDisplay, HistoryPanel};
use crate::domain::DownloadRecord;

pub fn view(history: &HistoryPanel) -> Element<'_, UiMessage> {
    let refresh = button("Refresh")
        .on_press_maybe((!history.is_loading()).then_some(UiMessage::RefreshHistoryPressed))
        .padding([8, 16]);

    let body: Element<'_, UiMessage> = match history.display() {
        HistoryDisplay::Loading => text("Loading history...").size(14).into(),
        HistoryDisplay::Empty { title, hint } => container(
            column![text(title).size(18), text(hint).size(14)]
                .spacing(4)
                .align_x(iced::Alignment::Center),
        )
        .center_x(Length::Fill)
        .padding(40)
        .into(),
        HistoryDisplay::Records(records) => {
            scrollable(Column::with_children(records.iter().map(record_row)).spacing(12)).into()
        }
    };

    column![refresh, body].spacing(10).into()
}

fn record_row(record: &DownloadRecord) -> Element<'_, UiMessage> {
    let when = record
        .downloaded_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    row![
        column![
            text(&record.title).size(16),
            text(&record.url).size(12),
        ]
        .spacing(2)
        .width(Length::Fill),
        text(&record.format).size(14),
        text(when).size(12),
    ]
    .spacing(12)
    .into()
}
