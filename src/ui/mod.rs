/// Desktop views
///
/// Each module renders one screen (or panel) from borrowed application
/// state and emits `crate::Message`s; all state changes happen in
/// `main.rs`.

pub mod auth;
pub mod board_grid;
pub mod canvas;
pub mod card_form;
pub mod editor;
pub mod family;
pub mod home;
pub mod image_editor;
pub mod stats;

use std::collections::HashMap;

use iced::widget::{container, image::Handle};
use iced::{Background, Border, Color, Theme};

use crate::color;

/// Loaded card pictures, keyed by picture reference
pub type Pictures = HashMap<String, PictureState>;

#[derive(Debug, Clone)]
pub enum PictureState {
    Loading,
    Ready(Handle),
    Failed(String),
}

/// Board background settings offered in the editor
pub const BACKGROUNDS: [&str; 7] = [
    "#f3f4f6", "#ffffff", "#fff1f2", "#f0f9ff", "#f0fdf4", "#faf5ff", "#1f2937",
];

/// Column counts offered in the editor
pub const COLUMN_CHOICES: [u32; 6] = [2, 3, 4, 5, 6, 8];

/// Largest gap offered in the editor
pub const MAX_GAP: u32 = 40;

/// Width of the card grid in logical pixels
pub const GRID_WIDTH: f32 = 880.0;

/// Filled, rounded box in a stored `#rrggbb` color
pub fn filled(hex: &str, radius: f32) -> impl Fn(&Theme) -> container::Style {
    let fill = color::to_iced(hex);
    move |_theme| container::Style {
        background: Some(Background::Color(fill)),
        border: Border {
            color: Color::from_rgb8(0xe5, 0xe7, 0xeb),
            width: 1.0,
            radius: radius.into(),
        },
        ..container::Style::default()
    }
}

/// Text color readable on top of `hex`
pub fn text_on(hex: &str) -> Color {
    match color::parse_hex(hex) {
        Some(rgb) if color::luminance(rgb) < 0.5 => Color::WHITE,
        _ => Color::from_rgb8(0x1f, 0x29, 0x37),
    }
}
