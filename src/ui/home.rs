/// Board list

use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use crate::state::data::{Board, UserIdentity};
use crate::Message;

use super::filled;

pub fn view<'a>(
    boards: &'a [Board],
    search: &'a str,
    user: Option<&'a UserIdentity>,
    remote_enabled: bool,
) -> Element<'a, Message> {
    let account: Element<'a, Message> = match (user, remote_enabled) {
        (Some(user), _) => row![
            text(format!("Signed in as {}", user.name())).size(14),
            button(text("Family")).on_press(Message::ShowFamily),
            button(text("Sign out"))
                .style(button::secondary)
                .on_press(Message::SignOut),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into(),
        (None, true) => button(text("Sign in")).on_press(Message::ShowAuth).into(),
        (None, false) => text("Offline mode: boards are kept on this computer").size(13).into(),
    };

    let header = row![
        text("PECS Boards").size(32),
        iced::widget::horizontal_space(),
        account,
    ]
    .align_y(Alignment::Center);

    let actions = row![
        text_input("Search boards", search)
            .on_input(Message::SearchChanged)
            .padding(8)
            .width(Length::Fixed(300.0)),
        button(text("+ New board")).on_press(Message::NewBoard),
        button(text("Import…")).on_press(Message::ImportBoard),
        button(text("Usage"))
            .style(button::secondary)
            .on_press(Message::ShowStats),
        button(text("Refresh"))
            .style(button::secondary)
            .on_press(Message::RefreshBoards),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let visible: Vec<&Board> = boards.iter().filter(|b| b.matches_query(search)).collect();

    let list: Element<'a, Message> = if visible.is_empty() {
        let hint = if boards.is_empty() {
            "No boards yet. Create one to get started."
        } else {
            "No boards match your search."
        };
        text(hint).into()
    } else {
        let entries = visible.into_iter().map(|board| -> Element<'a, Message> {
            let shared = if board.family_group_id.is_some() { " · shared" } else { "" };
            container(
                row![
                    column![
                        text(&board.title).size(18),
                        text(format!(
                            "{} cards · {} columns{shared}",
                            board.cards.len(),
                            board.grid_columns
                        ))
                        .size(12),
                    ]
                    .spacing(2)
                    .width(Length::Fill),
                    button(text("Open")).on_press(Message::OpenBoard(board.id.clone())),
                    button(text("Duplicate"))
                        .style(button::secondary)
                        .on_press(Message::DuplicateBoard(board.id.clone())),
                    button(text("Delete"))
                        .style(button::danger)
                        .on_press(Message::DeleteBoard(board.id.clone())),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
            .padding(12)
            .style(filled(&board.background_color, 8.0))
            .into()
        });
        scrollable(Column::with_children(entries).spacing(8)).into()
    };

    column![header, actions, list]
        .spacing(16)
        .padding(24)
        .into()
}
