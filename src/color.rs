use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Dashboard colours
// ---------------------------------------------------------------------------

pub const BACKGROUND: Color32 = Color32::from_rgb(0xF4, 0xF6, 0xF8);
pub const CARD: Color32 = Color32::WHITE;
pub const TITLE: Color32 = Color32::from_rgb(0x2E, 0x2E, 0x2E);
pub const PLANNED: Color32 = Color32::from_rgb(0xB0, 0xB7, 0xC3);
pub const HIRED: Color32 = Color32::from_rgb(0x5B, 0x7D, 0xB1);

// ---------------------------------------------------------------------------
// Funnel shading
// ---------------------------------------------------------------------------

/// `n` shades of `base`, from the base colour itself towards a pale tint,
/// keeping hue and saturation.
pub fn funnel_shades(base: Color32, n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let rgb = Srgb::new(
        base.r() as f32 / 255.0,
        base.g() as f32 / 255.0,
        base.b() as f32 / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    let palest = 0.85_f32.max(hsl.lightness);

    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
            let lightness = hsl.lightness + (palest - hsl.lightness) * t;
            let shade: Srgb = Hsl::new(hsl.hue, hsl.saturation, lightness).into_color();
            Color32::from_rgb(
                (shade.red.clamp(0.0, 1.0) * 255.0).round() as u8,
                (shade.green.clamp(0.0, 1.0) * 255.0).round() as u8,
                (shade.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
            )
        })
        .collect()
}
