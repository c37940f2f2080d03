/// Card picture editor panel
///
/// Shows the live canvas with the pointer surface on top, plus zoom,
/// rotation and tone controls. Nothing reaches the card until Apply.

use iced::widget::{button, column, container, row, slider, stack, text, Image};
use iced::widget::image::Handle;
use iced::{Alignment, Element, Length};

use crate::render::{SourceState, TransformSession, CANVAS_SIZE};
use crate::state::edit::{MAX_SCALE, MAX_TONE, MIN_SCALE};
use crate::Message;

use super::canvas::TransformSurface;
use super::filled;

pub fn view<'a>(session: &'a TransformSession, frame: Option<&'a Handle>) -> Element<'a, Message> {
    let side = Length::Fixed(CANVAS_SIZE as f32);
    let params = session.params();

    let canvas_area: Element<'a, Message> = match session.source() {
        SourceState::Loading => container(text("Loading picture…"))
            .width(side)
            .height(side)
            .center_x(side)
            .center_y(side)
            .style(filled("#ffffff", 0.0))
            .into(),
        SourceState::Unavailable(reason) => container(
            column![
                text("Image unavailable").size(20),
                text(reason.as_str()).size(13),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        )
        .width(side)
        .height(side)
        .center_x(side)
        .center_y(side)
        .style(filled("#fff1f2", 0.0))
        .into(),
        SourceState::Ready(_) => {
            let picture: Element<'a, Message> = match frame {
                Some(handle) => Image::new(handle.clone()).width(side).height(side).into(),
                None => container(text("")).width(side).height(side).into(),
            };
            stack![
                picture,
                iced::widget::canvas(TransformSurface).width(side).height(side),
            ]
            .into()
        }
    };

    let controls = column![
        labeled(
            format!("Zoom {:.1}×", params.scale),
            slider(MIN_SCALE..=MAX_SCALE, params.scale, Message::ZoomChanged).step(0.1),
        ),
        labeled(
            format!("Brightness {:.0}%", params.brightness),
            slider(0.0..=MAX_TONE, params.brightness, Message::BrightnessChanged).step(1.0),
        ),
        labeled(
            format!("Contrast {:.0}%", params.contrast),
            slider(0.0..=MAX_TONE, params.contrast, Message::ContrastChanged).step(1.0),
        ),
        row![
            button(text("⟲ 90°")).on_press(Message::Rotate(-90.0)),
            button(text("⟳ 90°")).on_press(Message::Rotate(90.0)),
            button(text("Reset rotation"))
                .style(button::secondary)
                .on_press(Message::ResetRotation),
        ]
        .spacing(8),
        text(format!("Rotation {:.0}°", params.rotation)).size(13),
        button(text("Reset all"))
            .style(button::secondary)
            .on_press(Message::ResetTransform),
        text("Drag the picture to reposition it, scroll to zoom.").size(12),
    ]
    .spacing(12)
    .width(Length::Fixed(280.0));

    let actions = row![
        button(text("Apply")).on_press_maybe(session.can_commit().then_some(Message::ApplyTransform)),
        button(text("Cancel"))
            .style(button::secondary)
            .on_press(Message::CancelTransform),
    ]
    .spacing(8);

    let body = column![
        text("Edit picture").size(22),
        row![canvas_area, controls].spacing(24),
        actions,
    ]
    .spacing(16);

    container(body)
        .padding(20)
        .style(filled("#ffffff", 12.0))
        .into()
}

fn labeled<'a>(label: String, control: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    column![text(label).size(13), control.into()].spacing(4).into()
}
