/// Usage statistics screen

use std::fmt;

use iced::widget::{button, column, container, pick_list, progress_bar, row, scrollable, text, Column, Row};
use iced::{Alignment, Element, Length};

use crate::state::data::Board;
use crate::state::stats::{BoardFilter, UsageStats, OTHER_CATEGORY};
use crate::Message;

use super::filled;

/// Entry in the board filter picker
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChoice {
    pub filter: BoardFilter,
    pub name: String,
}

impl FilterChoice {
    pub fn options(boards: &[Board]) -> Vec<FilterChoice> {
        std::iter::once(FilterChoice {
            filter: BoardFilter::All,
            name: "All boards".to_string(),
        })
        .chain(boards.iter().map(|b| FilterChoice {
            filter: BoardFilter::Board(b.id.clone()),
            name: b.title.clone(),
        }))
        .collect()
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn tile<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    container(column![text(label).size(13), text(value).size(30)].spacing(4))
        .width(Length::FillPortion(1))
        .padding(16)
        .style(filled("#ffffff", 10.0))
        .into()
}

pub fn view<'a>(stats: &UsageStats, filter: &BoardFilter, boards: &'a [Board]) -> Element<'a, Message> {
    let options = FilterChoice::options(boards);
    let selected = options.iter().find(|o| o.filter == *filter).cloned();

    let header = row![
        button(text("← Boards")).style(button::secondary).on_press(Message::ShowHome),
        text("Usage").size(30),
        iced::widget::horizontal_space(),
        pick_list(options, selected, |choice: FilterChoice| {
            Message::StatsFilterSelected(choice.filter)
        }),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let tiles = row![
        tile("Total taps", stats.total_taps.to_string()),
        tile("Cards", stats.card_count.to_string()),
        tile("Used this week", stats.recent_cards.to_string()),
        tile("Boards", stats.board_count.to_string()),
    ]
    .spacing(12);

    let top: Element<'a, Message> = if stats.top_cards.is_empty() {
        text("No usage yet. Tap cards in Use mode to start counting.").size(14).into()
    } else {
        let entries = stats.top_cards.iter().enumerate().map(|(rank, card)| -> Element<'a, Message> {
            let category = card.category.map_or(OTHER_CATEGORY, |c| c.label());
            row![
                text(format!("{}", rank + 1)).size(16).width(Length::Fixed(28.0)),
                column![text(card.label.clone()).size(15), text(category).size(11)].width(Length::Fill),
                text(format!("{} taps", card.usage_count)).size(14),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into()
        });
        Column::with_children(entries).spacing(8).into()
    };

    let categories: Element<'a, Message> = if stats.by_category.is_empty() {
        text("No category data available").size(14).into()
    } else {
        let entries = stats.by_category.iter().map(|usage| -> Element<'a, Message> {
            let percent = stats.percent_of_total(usage.taps);
            column![
                Row::new()
                    .push(text(usage.name).size(14).width(Length::Fill))
                    .push(text(format!("{} ({percent:.1}%)", usage.taps)).size(13)),
                progress_bar(0.0..=100.0, percent).height(Length::Fixed(8.0)),
            ]
            .spacing(4)
            .into()
        });
        Column::with_children(entries).spacing(10).into()
    };

    let panel = |title: &'a str, body: Element<'a, Message>| {
        container(column![text(title).size(20), body].spacing(12))
            .width(Length::Fill)
            .padding(16)
            .style(filled("#ffffff", 10.0))
    };

    scrollable(
        column![
            header,
            tiles,
            panel("Most used cards", top),
            panel("Usage by category", categories),
        ]
        .spacing(16)
        .padding(24),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_options_start_with_all() {
        let boards = vec![Board::new("Food")];
        let options = FilterChoice::options(&boards);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].filter, BoardFilter::All);
        assert_eq!(options[1].filter, BoardFilter::Board(boards[0].id.clone()));
        assert_eq!(options[1].to_string(), "Food");
    }
}
