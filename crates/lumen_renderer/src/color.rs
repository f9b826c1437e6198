//! Color correction: exposure, tone mapping and sRGB transfer.

use lumen_core::ImageParameters;
use lumen_math::Color;

/// Select per channel: `low` where `value < threshold`, else `high`.
#[inline]
fn select_below(value: Color, threshold: f32, low: Color, high: Color) -> Color {
    Color::select(value.cmplt(Color::splat(threshold)), low, high)
}

/// Encode linear RGB as sRGB. Input is clamped to [0, 1] first.
pub fn linear_to_srgb(rgb: Color) -> Color {
    let rgb = rgb.clamp(Color::ZERO, Color::ONE);
    select_below(
        rgb,
        0.0031308,
        rgb * 12.92,
        rgb.powf(1.0 / 2.4) * 1.055 - Color::splat(0.055),
    )
}

/// Decode sRGB to linear RGB. Input is clamped to [0, 1] first.
pub fn srgb_to_linear(rgb: Color) -> Color {
    let rgb = rgb.clamp(Color::ZERO, Color::ONE);
    select_below(
        rgb,
        0.04045,
        rgb / 12.92,
        ((rgb + Color::splat(0.055)) / 1.055).powf(2.4),
    )
}

/// ACES filmic curve fit (Narkowicz), HDR to [0, 1].
pub fn aces_film(x: Color) -> Color {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(Color::ZERO, Color::ONE)
}

/// Apply exposure, tone mapping and sRGB encoding as enabled in `params`.
///
/// Does nothing when `color_correct` is off.
pub fn post_process(color: Color, params: &ImageParameters) -> Color {
    if !params.color_correct {
        return color;
    }

    let mut color = color;
    if params.use_exposure {
        color *= params.exposure;
    }
    if params.use_tone_mapping {
        color = aces_film(color);
    }
    if params.use_srgb {
        color = linear_to_srgb(color);
    }
    color
}

/// Background color in the linear working space.
///
/// The background is authored in sRGB when sRGB output is enabled, so it is
/// decoded first and `post_process` encodes it back.
pub fn background_to_linear(background: Color, params: &ImageParameters) -> Color {
    if params.color_correct && params.use_srgb {
        srgb_to_linear(background)
    } else {
        background
    }
}

/// Clamp a value to [0, 1] and scale to a byte.
#[inline]
pub fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Color, b: Color) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(linear_to_srgb(Color::ZERO), Color::ZERO);
        assert!(approx(linear_to_srgb(Color::ONE), Color::ONE));
        assert!(approx(srgb_to_linear(Color::ONE), Color::ONE));
    }

    #[test]
    fn test_srgb_known_values() {
        // Mid grey: linear 0.2140 is sRGB 0.5
        assert!(approx(linear_to_srgb(Color::splat(0.214_041)), Color::splat(0.5)));
        // Linear segment near black
        assert!(approx(linear_to_srgb(Color::splat(0.001)), Color::splat(0.012_92)));
        assert!(approx(srgb_to_linear(Color::splat(0.02)), Color::splat(0.02 / 12.92)));
    }

    #[test]
    fn test_srgb_round_trip() {
        for v in [0.0, 0.01, 0.1, 0.35, 0.6, 0.9, 1.0] {
            let c = Color::splat(v);
            assert!(approx(linear_to_srgb(srgb_to_linear(c)), c), "value {}", v);
        }
    }

    #[test]
    fn test_srgb_clamps() {
        assert!(approx(linear_to_srgb(Color::new(-1.0, 2.0, 0.5)), linear_to_srgb(Color::new(0.0, 1.0, 0.5))));
    }

    #[test]
    fn test_aces_range() {
        assert_eq!(aces_film(Color::ZERO), Color::ZERO);
        assert_eq!(aces_film(Color::splat(1000.0)), Color::ONE);

        let mid = aces_film(Color::splat(0.5));
        assert!(mid.x > 0.0 && mid.x < 1.0);
        // Monotonic
        assert!(aces_film(Color::splat(0.6)).x > mid.x);
    }

    #[test]
    fn test_post_process_switches() {
        let color = Color::new(0.3, 0.6, 2.0);
        let off = ImageParameters {
            color_correct: false,
            ..Default::default()
        };
        assert_eq!(post_process(color, &off), color);

        let exposure_only = ImageParameters {
            use_tone_mapping: false,
            use_srgb: false,
            exposure: 2.0,
            ..Default::default()
        };
        assert!(approx(post_process(color, &exposure_only), color * 2.0));
    }

    #[test]
    fn test_background_round_trip_is_neutral() {
        let params = ImageParameters {
            use_tone_mapping: false,
            ..Default::default()
        };
        let background = Color::new(0.2, 0.4, 0.8);
        let out = post_process(background_to_linear(background, &params), &params);
        assert!(approx(out, background));
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::new(0.0, 1.0, 2.0)), [0, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(0.5)), [128, 128, 128]);
    }
}
