/// Transform parameters for the card picture editor
///
/// This struct stores the framing (pan, zoom, rotation) and tone
/// (brightness, contrast) adjustments of one editing session.
/// The parameters never outlive the session: committing bakes them
/// into a new picture and reopening starts again from defaults.

use serde::{Deserialize, Serialize};

/// Zoom range offered by the editor controls
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;
/// Tone slider range, in percent (100 = unchanged)
pub const MAX_TONE: f64 = 200.0;

/// All transform parameters for a card picture
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    // ========== Framing ==========

    /// Uniform zoom factor (1.0 = natural size)
    pub scale: f64,

    /// Rotation in degrees, clockwise on screen
    /// - The controls step by 90, but any value renders
    pub rotation: f64,

    /// Horizontal pan in image pixels (unscaled, unrotated)
    pub pan_x: f64,

    /// Vertical pan in image pixels (unscaled, unrotated)
    pub pan_y: f64,

    // ========== Tone ==========

    /// Brightness in percent (0.0 to 200.0)
    /// - 100.0 = no adjustment
    pub brightness: f64,

    /// Contrast in percent (0.0 to 200.0)
    /// - 100.0 = no adjustment
    pub contrast: f64,
}

impl Default for TransformParams {
    /// Create default parameters (identity transform)
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            brightness: 100.0,
            contrast: 100.0,
        }
    }
}

impl TransformParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this represents an untouched picture (all values at default)
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rotation in radians
    pub fn radians(&self) -> f64 {
        self.rotation.to_radians()
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.rotation += degrees;
    }

    pub fn reset_rotation(&mut self) {
        self.rotation = 0.0;
    }

    /// Set the zoom factor, clamped to the editor range
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_scale(self.scale + delta);
    }

    pub fn set_brightness(&mut self, percent: f64) {
        self.brightness = percent.clamp(0.0, MAX_TONE);
    }

    pub fn set_contrast(&mut self, percent: f64) {
        self.contrast = percent.clamp(0.0, MAX_TONE);
    }
}

/// Pointer drag tracking for panning the picture
///
/// Screen motion is divided by the live scale so the picture follows
/// the pointer 1:1 regardless of zoom.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    anchor: Option<DragAnchor>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    pointer: (f64, f64),
    pan: (f64, f64),
}

impl DragState {
    /// Pointer pressed: remember where and what the pan was
    pub fn begin(&mut self, pointer: (f64, f64), params: &TransformParams) {
        self.anchor = Some(DragAnchor {
            pointer,
            pan: (params.pan_x, params.pan_y),
        });
    }

    /// Pointer moved: update the pan if a drag is in progress.
    /// Returns `true` if the parameters changed.
    pub fn update(&self, pointer: (f64, f64), params: &mut TransformParams) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        let scale = if params.scale > 0.0 { params.scale } else { 1.0 };
        params.pan_x = anchor.pan.0 + (pointer.0 - anchor.pointer.0) / scale;
        params.pan_y = anchor.pan.1 + (pointer.1 - anchor.pointer.1) / scale;
        true
    }

    /// Pointer released or left the canvas
    pub fn end(&mut self) {
        self.anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}
