/// Board editor screen: toolbar, layout settings, grid and card panel

use std::fmt;

use iced::widget::{
    button, column, container, pick_list, row, scrollable, slider, text, text_input, Column, Row,
};
use iced::{Alignment, Element, Length};

use crate::remote::FamilyGroup;
use crate::state::data::Board;
use crate::state::editor::BoardEditor;
use crate::Message;

use super::board_grid::{self, GridMode};
use super::card_form::{self, CardForm};
use super::{filled, Pictures, BACKGROUNDS, COLUMN_CHOICES, MAX_GAP};

/// Family sharing target in the settings bar
#[derive(Debug, Clone, PartialEq)]
pub struct ShareChoice {
    pub group_id: Option<String>,
    pub name: String,
}

impl ShareChoice {
    pub fn private() -> Self {
        Self {
            group_id: None,
            name: "Only me".to_string(),
        }
    }

    pub fn options(groups: &[FamilyGroup]) -> Vec<ShareChoice> {
        std::iter::once(Self::private())
            .chain(groups.iter().map(|g| ShareChoice {
                group_id: Some(g.id.clone()),
                name: g.name.clone(),
            }))
            .collect()
    }
}

impl fmt::Display for ShareChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn view<'a>(
    editor: &'a BoardEditor,
    mode: GridMode,
    pictures: &'a Pictures,
    card_form: Option<&'a CardForm>,
    copying: Option<&'a str>,
    boards: &'a [Board],
    groups: &'a [FamilyGroup],
) -> Element<'a, Message> {
    let board = editor.board();

    let mode_button = |label: &'static str, target: GridMode| {
        button(text(label).size(14))
            .style(if mode == target { button::primary } else { button::secondary })
            .on_press(Message::SetGridMode(target))
    };

    let toolbar = row![
        button(text("← Boards")).style(button::secondary).on_press(Message::ShowHome),
        text_input("Board title", &board.title)
            .on_input(Message::TitleChanged)
            .padding(8)
            .width(Length::Fixed(260.0)),
        button(text("Undo")).on_press_maybe(editor.can_undo().then_some(Message::Undo)),
        button(text("Redo")).on_press_maybe(editor.can_redo().then_some(Message::Redo)),
        mode_button("Edit", GridMode::Edit),
        mode_button("Arrange", GridMode::Arrange),
        mode_button("Use", GridMode::Present),
        button(text("Print view")).on_press(Message::ShowPrint),
        button(text("Export")).on_press(Message::ExportBoard),
        button(text("+ Add card")).on_press(Message::AddCard),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut swatches = Row::new().spacing(4);
    for color in BACKGROUNDS {
        let selected = board.background_color.eq_ignore_ascii_case(color);
        swatches = swatches.push(
            button(
                container(text(""))
                    .width(Length::Fixed(22.0))
                    .height(Length::Fixed(22.0))
                    .style(filled(color, 4.0)),
            )
            .padding(if selected { 3 } else { 1 })
            .style(if selected { button::primary } else { button::text })
            .on_press(Message::BackgroundSelected(color.to_string())),
        );
    }

    let mut settings = row![
        text("Columns").size(14),
        pick_list(&COLUMN_CHOICES[..], Some(board.grid_columns), Message::ColumnsSelected),
        text(format!("Gap {}px", board.grid_gap)).size(14),
        slider(0..=MAX_GAP, board.grid_gap.min(MAX_GAP), Message::GapChanged).width(Length::Fixed(140.0)),
        text("Background").size(14),
        swatches,
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    if !groups.is_empty() {
        let options = ShareChoice::options(groups);
        let selected = options
            .iter()
            .find(|o| o.group_id == board.family_group_id)
            .cloned();
        settings = settings.push(text("Share").size(14));
        settings = settings.push(pick_list(options, selected, |choice: ShareChoice| {
            Message::ShareBoard(choice.group_id)
        }));
    }

    let grid = scrollable(board_grid::view(board, mode, pictures)).height(Length::Fill);

    let side: Option<Element<'a, Message>> = match (copying, card_form) {
        _ if mode.is_read_only() => None,
        (Some(card_id), _) => Some(copy_panel(card_id, &board.id, boards)),
        (None, Some(form)) => Some(card_form::view(form, pictures)),
        (None, None) => None,
    };
    let main: Element<'a, Message> = match side {
        Some(side) => row![container(grid).width(Length::Fill), side]
            .spacing(16)
            .into(),
        None => grid.into(),
    };

    let history = text(format!(
        "{} cards · history {}/{}",
        board.cards.len(),
        editor.history().cursor().map(|c| c + 1).unwrap_or(0),
        editor.history().len()
    ))
    .size(12);

    column![toolbar, settings, main, history]
        .spacing(12)
        .padding(16)
        .into()
}

/// Boards a card can be copied into: every board except the open one
pub fn copy_targets<'a>(boards: &'a [Board], current: &str) -> Vec<&'a Board> {
    boards.iter().filter(|b| b.id != current).collect()
}

fn copy_panel<'a>(card_id: &'a str, current: &str, boards: &'a [Board]) -> Element<'a, Message> {
    let targets = copy_targets(boards, current);
    let list: Element<'a, Message> = if targets.is_empty() {
        text("No other boards available").size(13).into()
    } else {
        let entries = targets.into_iter().map(|board| -> Element<'a, Message> {
            button(
                column![
                    text(&board.title).size(15),
                    text(format!("{} cards", board.cards.len())).size(11),
                ]
                .spacing(2),
            )
            .width(Length::Fill)
            .style(button::secondary)
            .on_press(Message::CopyCardTo(card_id.to_string(), board.id.clone()))
            .into()
        });
        scrollable(Column::with_children(entries).spacing(6)).into()
    };

    container(
        column![
            text("Copy card to board").size(18),
            text("Select a destination board").size(12),
            list,
            button(text("Cancel"))
                .style(button::secondary)
                .on_press(Message::CancelCopyCard),
        ]
        .spacing(10),
    )
    .width(Length::Fixed(280.0))
    .padding(16)
    .style(filled("#ffffff", 10.0))
    .into()
}

/// Printable view: the grid alone, read-only
pub fn print_view<'a>(editor: &'a BoardEditor, pictures: &'a Pictures) -> Element<'a, Message> {
    let board = editor.board();
    column![
        row![
            button(text("← Back to editor"))
                .style(button::secondary)
                .on_press(Message::ShowEditor),
            text(&board.title).size(26),
        ]
        .spacing(16)
        .align_y(Alignment::Center),
        scrollable(board_grid::view(board, GridMode::Print, pictures)),
    ]
    .spacing(16)
    .padding(24)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_options_start_with_private() {
        let groups = vec![FamilyGroup {
            id: "g1".into(),
            name: "Smiths".into(),
            created_by: None,
            created_at: None,
            members: Vec::new(),
        }];
        let options = ShareChoice::options(&groups);
        assert_eq!(options[0], ShareChoice::private());
        assert_eq!(options[1].group_id.as_deref(), Some("g1"));
        assert_eq!(options[1].to_string(), "Smiths");
    }

    #[test]
    fn test_copy_targets_skip_open_board() {
        let boards = vec![Board::new("Open"), Board::new("Snacks"), Board::new("Park")];
        let targets: Vec<_> = copy_targets(&boards, &boards[0].id)
            .into_iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(targets, vec!["Snacks", "Park"]);
    }
}
