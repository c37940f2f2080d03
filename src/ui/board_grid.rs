/// Card grid shared by the editor, presentation and printable views

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Frame, Path, Program, Stroke};
use iced::widget::{button, column, container, row, stack, text, Column, Image, Row};
use iced::{Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};

use crate::state::data::{Board, Card};
use crate::state::layout::GridLayout;
use crate::Message;

use super::{filled, text_on, PictureState, Pictures, GRID_WIDTH};

/// What the grid lets the user do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Per-card edit, copy, copy-to-board and delete buttons
    Edit,
    /// Drag cards to reorder them
    Arrange,
    /// Tap a card to use it
    Present,
    /// Static, for printing
    Print,
}

impl GridMode {
    /// Read-only modes omit every editing affordance
    pub fn is_read_only(self) -> bool {
        matches!(self, GridMode::Present | GridMode::Print)
    }
}

pub fn view<'a>(board: &'a Board, mode: GridMode, pictures: &'a Pictures) -> Element<'a, Message> {
    let layout = GridLayout::for_board(board, GRID_WIDTH);

    let grid: Element<'a, Message> = if board.cards.is_empty() {
        let hint = if mode.is_read_only() {
            "This board has no cards."
        } else {
            "No cards yet. Use \"Add card\" to create one."
        };
        container(text(hint).color(text_on(&board.background_color)))
            .width(Length::Fixed(GRID_WIDTH))
            .padding(24)
            .into()
    } else {
        let rows = board.cards.chunks(layout.columns as usize).map(|chunk| -> Element<'a, Message> {
            let tiles = chunk.iter().map(|card| tile(card, mode, layout.cell_size, pictures));
            Row::with_children(tiles).spacing(layout.gap).into()
        });
        let cards = Column::with_children(rows).spacing(layout.gap);

        if mode == GridMode::Arrange {
            let surface = ReorderSurface {
                layout,
                count: board.cards.len(),
            };
            stack![
                cards,
                iced::widget::canvas(surface)
                    .width(Length::Fixed(GRID_WIDTH))
                    .height(Length::Fixed(layout.height(board.cards.len()))),
            ]
            .into()
        } else {
            cards.into()
        }
    };

    container(grid)
        .padding(16)
        .style(filled(&board.background_color, 12.0))
        .into()
}

fn tile<'a>(card: &'a Card, mode: GridMode, size: f32, pictures: &'a Pictures) -> Element<'a, Message> {
    let picture_height = if mode == GridMode::Edit { size * 0.55 } else { size * 0.7 };
    let picture: Element<'a, Message> = match pictures.get(&card.image_url) {
        Some(PictureState::Ready(handle)) => Image::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(picture_height))
            .into(),
        Some(PictureState::Loading) => placeholder("…", picture_height),
        Some(PictureState::Failed(_)) => placeholder("⚠", picture_height),
        None if card.image_url.is_empty() => placeholder("", picture_height),
        None => placeholder("…", picture_height),
    };

    let label = text(&card.label)
        .size((size * 0.12).clamp(12.0, 22.0))
        .color(text_on(&card.background_color));

    let mut content = column![picture, label]
        .spacing(4)
        .align_x(Alignment::Center);

    if mode == GridMode::Edit {
        content = content.push(
            row![
                button(text("Edit").size(12)).on_press(Message::EditCard(card.id.clone())),
                button(text("Copy").size(12)).on_press(Message::DuplicateCard(card.id.clone())),
                button(text("Board…").size(12))
                    .style(button::secondary)
                    .on_press(Message::ChooseCopyTarget(card.id.clone())),
                button(text("✕").size(12))
                    .style(button::danger)
                    .on_press(Message::RemoveCard(card.id.clone())),
            ]
            .spacing(4),
        );
    }
    if mode == GridMode::Present {
        if let Some(count) = card.usage_count.filter(|c| *c > 0) {
            content = content.push(text(format!("used {count}×")).size(10));
        }
    }

    let boxed = container(content)
        .width(Length::Fixed(size))
        .height(Length::Fixed(size))
        .padding(6)
        .style(filled(&card.background_color, 10.0));

    if mode == GridMode::Present {
        button(boxed)
            .padding(0)
            .style(button::text)
            .on_press(Message::CardUsed(card.id.clone()))
            .into()
    } else {
        boxed.into()
    }
}

fn placeholder<'a>(glyph: &'a str, height: f32) -> Element<'a, Message> {
    container(text(glyph).size(28))
        .width(Length::Fill)
        .height(Length::Fixed(height))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(height))
        .into()
}

/// Drag-to-reorder overlay for arrange mode
#[derive(Debug, Clone, Copy)]
struct ReorderSurface {
    layout: GridLayout,
    count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct ReorderState {
    from: Option<usize>,
    over: Option<usize>,
}

impl ReorderSurface {
    fn index_under(&self, cursor: Cursor, bounds: Rectangle) -> Option<usize> {
        let pos = cursor.position_in(bounds)?;
        self.layout.index_at(pos.x, pos.y, self.count)
    }

    fn cell_rect(&self, index: usize) -> (Point, Size) {
        let cell = self.layout.cell(index);
        (Point::new(cell.x, cell.y), Size::new(cell.width, cell.height))
    }
}

impl Program<Message> for ReorderSurface {
    type State = ReorderState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        if let Some(over) = state.over.filter(|_| state.from.is_some()) {
            let (origin, size) = self.cell_rect(over);
            frame.fill_rectangle(origin, size, Color::from_rgba8(0x3b, 0x82, 0xf6, 0.15));
        }
        if let Some(from) = state.from {
            let (origin, size) = self.cell_rect(from);
            frame.stroke(
                &Path::rectangle(origin, size),
                Stroke::default()
                    .with_width(3.0)
                    .with_color(Color::from_rgb8(0x3b, 0x82, 0xf6)),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(index) = self.index_under(cursor, bounds) {
                    state.from = Some(index);
                    state.over = Some(index);
                    return (canvas::event::Status::Captured, None);
                }
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.from.is_some() {
                    state.over = self.index_under(cursor, bounds);
                    return (canvas::event::Status::Captured, None);
                }
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if let Some(from) = state.from.take() {
                    let to = self.index_under(cursor, bounds);
                    state.over = None;
                    if let Some(to) = to.filter(|to| *to != from) {
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::MoveCard(from, to)),
                        );
                    }
                    return (canvas::event::Status::Captured, None);
                }
            }
            _ => {}
        }
        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        if state.from.is_some() {
            mouse::Interaction::Grabbing
        } else if self.index_under(cursor, bounds).is_some() {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_modes() {
        assert!(GridMode::Print.is_read_only());
        assert!(GridMode::Present.is_read_only());
        assert!(!GridMode::Edit.is_read_only());
        assert!(!GridMode::Arrange.is_read_only());
    }

    #[test]
    fn test_reorder_cells_follow_layout() {
        let surface = ReorderSurface {
            layout: GridLayout::new(GRID_WIDTH, 4, 16.0),
            count: 6,
        };
        let (origin, size) = surface.cell_rect(5);
        assert_eq!(origin.y, surface.layout.cell_size + 16.0);
        assert_eq!(size.width, surface.layout.cell_size);
    }
}
