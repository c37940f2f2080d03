/// Color utilities
///
/// This module handles:
/// - The brightness/contrast tone filter applied to card pictures
/// - Parsing `#rrggbb` colors stored on boards and cards

/// Brightness and contrast as linear multipliers (1.0 = unchanged)
///
/// Matches the CSS `brightness()` then `contrast()` filter chain:
/// brightness scales each channel, contrast scales the distance
/// from mid-grey. Results are clamped to the displayable range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneFilter {
    pub brightness: f32,
    pub contrast: f32,
}

impl ToneFilter {
    /// Build from percentages (100 = unchanged)
    pub fn from_percent(brightness: f64, contrast: f64) -> Self {
        Self {
            brightness: (brightness / 100.0).max(0.0) as f32,
            contrast: (contrast / 100.0).max(0.0) as f32,
        }
    }

    pub fn is_identity(&self) -> bool {
        const EPSILON: f32 = 0.0001;
        (self.brightness - 1.0).abs() < EPSILON && (self.contrast - 1.0).abs() < EPSILON
    }

    /// Apply to one channel value in 0.0..=1.0
    pub fn apply_channel(&self, value: f32) -> f32 {
        let bright = (value * self.brightness).clamp(0.0, 1.0);
        ((bright - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0)
    }

    /// Apply to an RGB triple in 0.0..=1.0 (alpha is never filtered)
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.is_identity() {
            return rgb;
        }
        [
            self.apply_channel(rgb[0]),
            self.apply_channel(rgb[1]),
            self.apply_channel(rgb[2]),
        ]
    }
}

impl Default for ToneFilter {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional)
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 16 + v;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Format as lowercase `#rrggbb`
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Convert a stored color to an iced color, falling back to white
pub fn to_iced(color: &str) -> iced::Color {
    let [r, g, b] = parse_hex(color).unwrap_or([255, 255, 255]);
    iced::Color::from_rgb8(r, g, b)
}

/// Perceived luminance in 0.0..=1.0, used to pick readable text
pub fn luminance(rgb: [u8; 3]) -> f32 {
    (0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_filter_detection() {
        assert!(ToneFilter::from_percent(100.0, 100.0).is_identity());
        assert!(!ToneFilter::from_percent(150.0, 100.0).is_identity());
    }

    #[test]
    fn test_identity_leaves_values() {
        let filter = ToneFilter::default();
        assert_eq!(filter.apply([0.2, 0.5, 0.9]), [0.2, 0.5, 0.9]);
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let filter = ToneFilter::from_percent(200.0, 100.0);
        assert_eq!(filter.apply_channel(0.25), 0.5);
        assert_eq!(filter.apply_channel(0.8), 1.0);

        let dark = ToneFilter::from_percent(0.0, 100.0);
        assert_eq!(dark.apply_channel(0.7), 0.0);
    }

    #[test]
    fn test_contrast_pivots_on_mid_grey() {
        let flat = ToneFilter::from_percent(100.0, 0.0);
        assert_eq!(flat.apply_channel(0.1), 0.5);
        assert_eq!(flat.apply_channel(0.9), 0.5);

        let punchy = ToneFilter::from_percent(100.0, 200.0);
        assert_eq!(punchy.apply_channel(0.5), 0.5);
        assert_eq!(punchy.apply_channel(0.75), 1.0);
        assert_eq!(punchy.apply_channel(0.25), 0.0);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FFD700"), Some([255, 215, 0]));
        assert_eq!(parse_hex("90ee90"), Some([144, 238, 144]));
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(to_hex([31, 41, 55]), "#1f2937");
    }

    #[test]
    fn test_luminance_orders_dark_and_light() {
        assert!(luminance([31, 41, 55]) < 0.5);
        assert!(luminance([255, 255, 255]) > 0.9);
    }
}
