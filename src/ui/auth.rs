/// Sign-in and sign-up form

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Element, Length};

use crate::Message;

use super::filled;

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub signing_up: bool,
    pub busy: bool,
    pub error: Option<String>,
}

impl AuthForm {
    pub fn can_submit(&self) -> bool {
        !self.busy && self.email.contains('@') && self.password.len() >= 6
    }

    /// Forget credentials after a finished attempt
    pub fn reset(&mut self) {
        *self = Self {
            signing_up: self.signing_up,
            ..Self::default()
        };
    }
}

pub fn view(form: &AuthForm) -> Element<'_, Message> {
    let (title, submit, switch) = if form.signing_up {
        ("Create an account", "Sign up", "Have an account? Sign in")
    } else {
        ("Sign in", "Sign in", "New here? Create an account")
    };

    let mut body = column![
        text(title).size(24),
        text_input("Email", &form.email)
            .on_input(Message::AuthEmailChanged)
            .padding(8),
        text_input("Password (6+ characters)", &form.password)
            .on_input(Message::AuthPasswordChanged)
            .on_submit(Message::SubmitAuth)
            .secure(true)
            .padding(8),
    ]
    .spacing(12)
    .width(Length::Fixed(360.0));

    if form.signing_up {
        body = body.push(
            text_input("Display name (optional)", &form.display_name)
                .on_input(Message::AuthNameChanged)
                .padding(8),
        );
    }
    if let Some(error) = &form.error {
        body = body.push(text(error.as_str()).size(13).color(iced::Color::from_rgb8(0xdc, 0x26, 0x26)));
    }

    body = body.push(
        row![
            button(text(if form.busy { "Please wait…" } else { submit }))
                .on_press_maybe(form.can_submit().then_some(Message::SubmitAuth)),
            button(text(switch))
                .style(button::text)
                .on_press(Message::ToggleAuthMode),
        ]
        .spacing(8),
    );
    body = body.push(
        button(text("Continue offline"))
            .style(button::secondary)
            .on_press(Message::ShowHome),
    );

    container(container(body).padding(24).style(filled("#ffffff", 12.0)))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
