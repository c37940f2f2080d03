/// CPU render pipeline for the card picture editor
///
/// This module rasterizes a source picture through one 2D affine
/// (center, rotate, scale, pan) and the tone filter onto a square,
/// opaque white canvas:
/// - `canvas_transform` builds the forward matrix with cgmath
/// - `RenderPipeline::render` inverse-maps every canvas pixel into the
///   source and samples it bilinearly
///
/// Every render starts from a blank canvas, so nothing carries over
/// from one redraw to the next.

use cgmath::{Matrix3, SquareMatrix, Vector3};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::color::ToneFilter;
use crate::media::data_url;
use crate::state::edit::TransformParams;

use super::TransformError;

/// Side length of the square output canvas, in pixels
pub const CANVAS_SIZE: u32 = 500;

/// JPEG quality used when baking the canvas into a card picture
pub const COMMIT_QUALITY: u8 = 90;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Forward transform from source pixel coordinates to canvas coordinates
///
/// Composition (applied right to left):
/// 1. center the source on the origin
/// 2. pan, in source pixels
/// 3. uniform scale
/// 4. rotate (degrees, clockwise on screen since y points down)
/// 5. move the origin to the canvas center
pub fn canvas_transform(
    params: &TransformParams,
    canvas_size: u32,
    source_width: u32,
    source_height: u32,
) -> Matrix3<f64> {
    let half_canvas = canvas_size as f64 / 2.0;
    let (sin, cos) = params.radians().sin_cos();
    let s = params.scale;

    translation(half_canvas, half_canvas)
        * rotation(sin, cos)
        * scaling(s)
        * translation(params.pan_x, params.pan_y)
        * translation(-(source_width as f64) / 2.0, -(source_height as f64) / 2.0)
}

// cgmath matrices are column-major: each group of three is one column
fn translation(x: f64, y: f64) -> Matrix3<f64> {
    Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, x, y, 1.0)
}

fn rotation(sin: f64, cos: f64) -> Matrix3<f64> {
    Matrix3::new(cos, sin, 0.0, -sin, cos, 0.0, 0.0, 0.0, 1.0)
}

fn scaling(s: f64) -> Matrix3<f64> {
    Matrix3::new(s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 1.0)
}

/// Rasterizes one source picture with the current parameters
#[derive(Clone)]
pub struct RenderPipeline {
    source: RgbaImage,
    params: TransformParams,
    pub canvas_size: u32,
}

// Manual Debug implementation (pixel buffers are too large to print)
impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("source_width", &self.source.width())
            .field("source_height", &self.source.height())
            .field("canvas_size", &self.canvas_size)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    /// Create a pipeline for a decoded source picture
    pub fn new(source: &DynamicImage, params: TransformParams) -> Self {
        Self::with_canvas_size(source, params, CANVAS_SIZE)
    }

    pub fn with_canvas_size(source: &DynamicImage, params: TransformParams, canvas_size: u32) -> Self {
        Self {
            source: source.to_rgba8(),
            params,
            canvas_size: canvas_size.max(1),
        }
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    /// Replace the parameters used by the next render
    pub fn update_params(&mut self, params: TransformParams) {
        self.params = params;
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    /// Draw the source onto a fresh white canvas
    pub fn render(&self) -> RgbaImage {
        let size = self.canvas_size;
        let mut canvas = RgbaImage::from_pixel(size, size, WHITE);

        let (width, height) = self.source.dimensions();
        if width == 0 || height == 0 || self.params.scale <= 0.0 {
            return canvas;
        }

        let forward = canvas_transform(&self.params, size, width, height);
        let Some(inverse) = forward.invert() else {
            // Degenerate transform (e.g. non-finite parameters): leave it blank
            return canvas;
        };

        let tone = ToneFilter::from_percent(self.params.brightness, self.params.contrast);

        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            let p = inverse * Vector3::new(x as f64 + 0.5, y as f64 + 0.5, 1.0);
            let Some((rgb, alpha)) = self.sample(p.x, p.y) else {
                continue;
            };

            let filtered = tone.apply(rgb);
            let mut out = [0u8; 4];
            for c in 0..3 {
                // composite over the white background
                let v = filtered[c] * alpha + (1.0 - alpha);
                out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            }
            out[3] = 255;
            *pixel = Rgba(out);
        }

        canvas
    }

    /// Bilinear sample at source coordinates (pixel centers at i + 0.5).
    /// Returns straight (unpremultiplied) RGB and coverage, or `None`
    /// if the point is fully outside the picture.
    fn sample(&self, u: f64, v: f64) -> Option<([f32; 3], f32)> {
        if !u.is_finite() || !v.is_finite() {
            return None;
        }
        let (width, height) = self.source.dimensions();
        let fx = u - 0.5;
        let fy = v - 0.5;
        if fx <= -1.0 || fy <= -1.0 || fx >= width as f64 || fy >= height as f64 {
            return None;
        }

        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = (fx - x0) as f32;
        let ty = (fy - y0) as f32;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let taps = [
            (x0, y0, (1.0 - tx) * (1.0 - ty)),
            (x0 + 1, y0, tx * (1.0 - ty)),
            (x0, y0 + 1, (1.0 - tx) * ty),
            (x0 + 1, y0 + 1, tx * ty),
        ];

        let mut alpha = 0.0f32;
        let mut rgb = [0.0f32; 3];
        for (sx, sy, weight) in taps {
            if weight <= 0.0 || sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
                continue;
            }
            let Rgba([r, g, b, a]) = *self.source.get_pixel(sx as u32, sy as u32);
            let a = a as f32 / 255.0 * weight;
            alpha += a;
            rgb[0] += r as f32 / 255.0 * a;
            rgb[1] += g as f32 / 255.0 * a;
            rgb[2] += b as f32 / 255.0 * a;
        }

        if alpha <= 0.0 {
            return None;
        }
        let alpha = alpha.min(1.0);
        Some(([rgb[0] / alpha, rgb[1] / alpha, rgb[2] / alpha], alpha))
    }
}

/// Encode a rendered canvas as JPEG bytes
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)?;
    Ok(bytes)
}

/// Bake a rendered canvas into a self-contained card picture
pub fn encode_data_url(canvas: &RgbaImage) -> Result<String, TransformError> {
    let bytes = encode_jpeg(canvas, COMMIT_QUALITY)?;
    Ok(data_url::encode("image/jpeg", &bytes))
}
