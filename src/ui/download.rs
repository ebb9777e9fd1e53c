use iced::{
    widget::{button, column, text, text_input, Row, Space},
    Element, Length,
};

use super::UiMessage;
use crate::application::DownloadWorkflow;

pub fn view(workflow: &DownloadWorkflow) -> Element<'_, UiMessage> {
    let loading = workflow.is_loading();

    let submit = button(if loading { "Working..." } else { "Check link" })
        .on_press_maybe(workflow.can_submit().then_some(UiMessage::SubmitPressed))
        .padding([10, 20]);

    let mut input = text_input("Paste a freepik.com or flaticon.com link...", workflow.input())
        .on_input(UiMessage::LinkChanged)
        .padding(10);
    if workflow.can_submit() {
        input = input.on_submit(UiMessage::SubmitPressed);
    }

    let mut content = column![text("Link:").size(16), input, submit].spacing(10);

    if let Some(error) = workflow.error() {
        content = content.push(text(error.to_string()).size(14).style(text::danger));
    }

    if let Some(notice) = workflow.notice() {
        content = content.push(text(notice).size(14).style(text::success));
    }

    if let Some(file) = workflow.resolved_file() {
        let selected = workflow.selected_format();
        let selectable = workflow.can_select() && !loading;

        let formats = Row::with_children(file.formats().iter().map(|format| {
            let style = if selected == Some(format) {
                button::primary
            } else {
                button::secondary
            };
            button(text(format.to_string()))
                .style(style)
                .on_press_maybe(selectable.then(|| UiMessage::FormatPicked(format.clone())))
                .padding([10, 16])
                .into()
        }))
        .spacing(8);

        let label = match selected {
            Some(format) => format!("Download {format}"),
            None => "Download".to_string(),
        };
        let confirm = button(text(label))
            .on_press_maybe(
                (workflow.can_confirm() && !loading).then_some(UiMessage::ConfirmPressed),
            )
            .padding([10, 20]);

        content = content
            .push(Space::new().height(Length::Fixed(10.0)))
            .push(text(&file.title).size(20));
        if let Some(thumbnail) = &file.thumbnail {
            content = content.push(text(thumbnail).size(12));
        }
        content = content
            .push(text("Choose a format:").size(14))
            .push(formats)
            .push(confirm);
    }

    content.into()
}
