/// Card editing panel

use iced::widget::{button, column, container, row, text, text_input, Image, Row};
use iced::{Alignment, Element, Length};

use crate::state::data::{Card, CardCategory, DEFAULT_CARD_COLOR};
use crate::Message;

use super::{filled, PictureState, Pictures};

/// A card being created or edited. Changes stay here until saved.
#[derive(Debug, Clone)]
pub struct CardForm {
    pub card: Card,
    pub is_new: bool,
    /// A picture upload is in flight
    pub uploading: bool,
}

impl CardForm {
    pub fn create() -> Self {
        Self {
            card: Card::new("", ""),
            is_new: true,
            uploading: false,
        }
    }

    pub fn edit(card: Card) -> Self {
        Self {
            card,
            is_new: false,
            uploading: false,
        }
    }

    pub fn can_save(&self) -> bool {
        !self.card.label.trim().is_empty() && !self.uploading
    }

    /// Choose a category (or none) and adopt its color
    pub fn set_category(&mut self, category: Option<CardCategory>) {
        self.card.category = category;
        self.card.background_color = category
            .map(|c| c.color())
            .unwrap_or(DEFAULT_CARD_COLOR)
            .to_string();
    }
}

pub fn view<'a>(form: &'a CardForm, pictures: &'a Pictures) -> Element<'a, Message> {
    let title = if form.is_new { "New card" } else { "Edit card" };

    let preview: Element<'a, Message> = match pictures.get(&form.card.image_url) {
        Some(PictureState::Ready(handle)) => Image::new(handle.clone())
            .width(Length::Fixed(160.0))
            .height(Length::Fixed(160.0))
            .into(),
        Some(PictureState::Failed(reason)) => text(format!("Picture unavailable: {reason}")).size(12).into(),
        Some(PictureState::Loading) => text("Loading picture…").size(12).into(),
        None => text("No picture").size(12).into(),
    };

    let mut categories = Row::new().spacing(6);
    let none_selected = form.card.category.is_none();
    categories = categories.push(
        button(text("None").size(13))
            .style(if none_selected { button::primary } else { button::secondary })
            .on_press(Message::CardCategorySelected(None)),
    );
    for category in CardCategory::ALL {
        let selected = form.card.category == Some(category);
        categories = categories.push(
            button(text(category.label()).size(13))
                .style(if selected { button::primary } else { button::secondary })
                .on_press(Message::CardCategorySelected(Some(category))),
        );
    }

    let upload_label = if form.uploading { "Uploading…" } else { "Choose picture…" };
    let has_picture = !form.card.image_url.is_empty();

    let body = column![
        text(title).size(22),
        text_input("Label", &form.card.label)
            .on_input(Message::CardLabelChanged)
            .padding(8),
        text_input("Picture URL or path", &form.card.image_url)
            .on_input(Message::CardImageUrlChanged)
            .padding(8),
        row![
            button(text(upload_label)).on_press_maybe((!form.uploading).then_some(Message::ChooseCardImage)),
            button(text("Edit picture")).on_press_maybe(has_picture.then_some(Message::OpenTransform)),
        ]
        .spacing(8),
        container(preview).padding(4),
        text("Category").size(14),
        categories,
        row![
            text("Color").size(14),
            container(text(""))
                .width(Length::Fixed(28.0))
                .height(Length::Fixed(28.0))
                .style(filled(&form.card.background_color, 6.0)),
            text(&form.card.background_color).size(13),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
        row![
            button(text("Save card")).on_press_maybe(form.can_save().then_some(Message::SaveCard)),
            button(text("Cancel"))
                .style(button::secondary)
                .on_press(Message::CancelCard),
        ]
        .spacing(8),
    ]
    .spacing(12)
    .width(Length::Fixed(340.0));

    container(body)
        .padding(16)
        .style(filled("#ffffff", 12.0))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_required_to_save() {
        let mut form = CardForm::create();
        assert!(!form.can_save());
        form.card.label = "  Drink ".into();
        assert!(form.can_save());
        form.uploading = true;
        assert!(!form.can_save());
    }

    #[test]
    fn test_category_sets_color() {
        let mut form = CardForm::create();
        form.set_category(Some(CardCategory::Verb));
        assert_eq!(form.card.background_color, "#90EE90");
        form.set_category(None);
        assert_eq!(form.card.background_color, "#FFFFFF");
    }
}
