/// One picture editing session
///
/// Ties together the decoded source, the live parameters, pointer drag
/// tracking and redraw coalescing. Closing the editor simply drops the
/// session; nothing reaches the board until `commit` succeeds.

use image::{DynamicImage, RgbaImage};

use crate::state::edit::{DragState, TransformParams};

use super::pipeline::{self, RenderPipeline};
use super::scheduler::RedrawScheduler;
use super::TransformError;

/// Where the source picture is in its lifecycle
#[derive(Debug, Clone)]
pub enum SourceState {
    /// Still being fetched or decoded
    Loading,
    Ready(RenderPipeline),
    /// The picture could not be loaded; commit is disabled
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct TransformSession {
    source: SourceState,
    params: TransformParams,
    drag: DragState,
    scheduler: RedrawScheduler,
    frame: Option<RgbaImage>,
}

impl Default for TransformSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformSession {
    /// Start a session with fresh parameters; the source is loading
    pub fn new() -> Self {
        Self {
            source: SourceState::Loading,
            params: TransformParams::default(),
            drag: DragState::default(),
            scheduler: RedrawScheduler::new(),
            frame: None,
        }
    }

    /// Session over an already decoded picture
    pub fn with_source(source: &DynamicImage) -> Self {
        let mut session = Self::new();
        session.source_loaded(Ok(source));
        session
    }

    /// Finish loading: either ready to draw or unavailable
    pub fn source_loaded(&mut self, result: Result<&DynamicImage, String>) {
        match result {
            Ok(image) => {
                log::debug!("🖼️  Picture ready: {}x{}", image.width(), image.height());
                self.source = SourceState::Ready(RenderPipeline::new(image, self.params));
                self.scheduler.request();
            }
            Err(reason) => {
                log::warn!("⚠️  Picture unavailable: {reason}");
                self.source = SourceState::Unavailable(reason);
                self.frame = None;
                self.scheduler.cancel();
            }
        }
    }

    pub fn source(&self) -> &SourceState {
        &self.source
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    /// Change the parameters; the canvas is redrawn on the next frame.
    /// Before the source is ready the change is only remembered.
    pub fn update_params<F>(&mut self, change: F)
    where
        F: FnOnce(&mut TransformParams),
    {
        let before = self.params;
        change(&mut self.params);
        if self.params != before {
            self.request_redraw();
        }
    }

    pub fn pointer_down(&mut self, position: (f64, f64)) {
        self.drag.begin(position, &self.params);
    }

    pub fn pointer_moved(&mut self, position: (f64, f64)) {
        if self.drag.update(position, &mut self.params) {
            self.request_redraw();
        }
    }

    fn request_redraw(&mut self) {
        if matches!(self.source, SourceState::Ready(_)) {
            self.scheduler.request();
        }
    }

    /// Pointer released or left the canvas
    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Display frame callback: redraw if anything changed since the last
    /// frame. Returns `true` if the canvas was redrawn.
    pub fn on_frame(&mut self) -> bool {
        let SourceState::Ready(pipeline) = &mut self.source else {
            return false;
        };
        if !self.scheduler.take_frame() {
            return false;
        }
        pipeline.update_params(self.params);
        self.frame = Some(pipeline.render());
        true
    }

    /// Whether the next display frame has anything to draw
    pub fn needs_redraw(&self) -> bool {
        matches!(self.source, SourceState::Ready(_)) && self.scheduler.is_pending()
    }

    pub fn redraw_count(&self) -> u64 {
        self.scheduler.redraw_count()
    }

    /// The most recently drawn canvas
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    pub fn can_commit(&self) -> bool {
        matches!(self.source, SourceState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.source {
            SourceState::Unavailable(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Bake the current parameters into a JPEG `data:` URL
    pub fn commit(&self) -> Result<String, TransformError> {
        let SourceState::Ready(pipeline) = &self.source else {
            return Err(TransformError::ImageUnavailable);
        };

        // render from the live parameters, not a possibly stale frame
        let mut pipeline = pipeline.clone();
        pipeline.update_params(self.params);
        let canvas = pipeline.render();
        pipeline::encode_data_url(&canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn source() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([10, 120, 200, 255])))
    }

    #[test]
    fn test_loading_session_cannot_commit() {
        let mut session = TransformSession::new();
        assert!(!session.can_commit());
        assert!(!session.on_frame());
        assert!(matches!(session.commit(), Err(TransformError::ImageUnavailable)));
    }

    #[test]
    fn test_unavailable_source_reports_reason() {
        let mut session = TransformSession::new();
        session.source_loaded(Err("404 Not Found".into()));

        assert!(!session.can_commit());
        assert_eq!(session.unavailable_reason(), Some("404 Not Found"));
        assert!(session.frame().is_none());
        assert!(matches!(session.commit(), Err(TransformError::ImageUnavailable)));
    }

    #[test]
    fn test_unavailable_source_never_asks_for_frames() {
        let mut session = TransformSession::new();
        session.source_loaded(Err("404".into()));
        session.update_params(|p| p.set_brightness(150.0));
        session.update_params(|p| p.rotate_by(90.0));
        session.pointer_down((0.0, 0.0));
        session.pointer_moved((40.0, 0.0));

        assert!(!session.needs_redraw());
        for _ in 0..100 {
            assert!(!session.on_frame());
        }
        assert!(!session.needs_redraw());
        assert_eq!(session.redraw_count(), 0);
    }

    #[test]
    fn test_changes_while_loading_draw_once_ready() {
        let mut session = TransformSession::new();
        session.update_params(|p| p.set_contrast(140.0));
        assert!(!session.needs_redraw());

        session.source_loaded(Ok(&source()));
        assert!(session.needs_redraw());
        assert!(session.on_frame());
        assert_eq!(session.params().contrast, 140.0);
        assert!(!session.needs_redraw());
    }

    #[test]
    fn test_first_frame_draws_loaded_source() {
        let mut session = TransformSession::with_source(&source());
        assert!(session.needs_redraw());
        assert!(session.on_frame());
        assert_eq!(session.frame().map(|f| f.width()), Some(pipeline::CANVAS_SIZE));
        assert!(!session.on_frame());
    }

    #[test]
    fn test_slider_burst_redraws_once_per_frame() {
        let mut session = TransformSession::with_source(&source());
        session.on_frame();

        for step in 0..50 {
            session.update_params(|p| p.set_brightness(100.0 + step as f64));
        }
        assert!(session.on_frame());
        assert!(!session.on_frame());
        assert_eq!(session.redraw_count(), 2);
    }

    #[test]
    fn test_unchanged_params_do_not_schedule() {
        let mut session = TransformSession::with_source(&source());
        session.on_frame();
        session.update_params(|p| p.set_scale(1.0));
        assert!(!session.needs_redraw());
    }

    #[test]
    fn test_drag_pans_through_session() {
        let mut session = TransformSession::with_source(&source());
        session.update_params(|p| p.set_scale(2.0));

        session.pointer_down((10.0, 10.0));
        session.pointer_moved((30.0, 10.0));
        assert_eq!(session.params().pan_x, 10.0);
        session.pointer_up();
        session.pointer_moved((90.0, 10.0));
        assert_eq!(session.params().pan_x, 10.0);
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_commit_uses_latest_params() {
        let mut session = TransformSession::with_source(&source());
        session.on_frame();
        session.update_params(|p| p.rotate_by(90.0));

        let url = session.commit().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
