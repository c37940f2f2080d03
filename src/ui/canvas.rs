use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Frame, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::render::CANVAS_SIZE;
use crate::Message;

/// Pointer surface laid over the picture editor's canvas.
///
/// Drawing of the picture itself happens in the raster pipeline; this
/// program only outlines the crop square and turns mouse input into
/// pan and zoom messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformSurface;

/// Whether the left button went down inside the surface
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub pressed: bool,
}

impl TransformSurface {
    /// Map a position inside `bounds` to output canvas pixels
    fn to_canvas(position: Point, bounds: Rectangle) -> (f32, f32) {
        let sx = CANVAS_SIZE as f32 / bounds.width.max(1.0);
        let sy = CANVAS_SIZE as f32 / bounds.height.max(1.0);
        (position.x * sx, position.y * sy)
    }
}

impl Program<Message> for TransformSurface {
    type State = PointerState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let outline = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.stroke(
            &outline,
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb8(0xd1, 0xd5, 0xdb)),
        );
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
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_none() {
                    return (canvas::event::Status::Ignored, None);
                }
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y * 0.1,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                };
                return (
                    canvas::event::Status::Captured,
                    Some(Message::Zoom(zoom_delta as f64)),
                );
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    state.pressed = true;
                    let (x, y) = Self::to_canvas(pos, bounds);
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::PointerDown(x, y)),
                    );
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.pressed {
                    state.pressed = false;
                    return (canvas::event::Status::Captured, Some(Message::PointerUp));
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorLeft) => {
                if state.pressed {
                    state.pressed = false;
                    return (canvas::event::Status::Captured, Some(Message::PointerUp));
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.pressed {
                    match cursor.position_in(bounds) {
                        Some(pos) => {
                            let (x, y) = Self::to_canvas(pos, bounds);
                            return (
                                canvas::event::Status::Captured,
                                Some(Message::PointerMoved(x, y)),
                            );
                        }
                        // dragged off the surface
                        None => {
                            state.pressed = false;
                            return (canvas::event::Status::Captured, Some(Message::PointerUp));
                        }
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        if state.pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
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
    fn test_to_canvas_scales_to_output_pixels() {
        let bounds = Rectangle::new(Point::new(10.0, 10.0), iced::Size::new(250.0, 250.0));
        let (x, y) = TransformSurface::to_canvas(Point::new(125.0, 50.0), bounds);
        assert_eq!((x, y), (250.0, 100.0));
    }
}
