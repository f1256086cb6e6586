//! Color presets and gradient strings.

use crate::options::NormalizedOptions;
use crate::options::StyleName;
use ratatui::style::Color;
use std::str::FromStr;

const DEFAULT: &[&str] = &["#6366f1", "#8b5cf6"];
const NEON: &[&str] = &["#00ff00", "#00ffff"];
const RAINBOW: &[&str] = &[
    "#ff0000", "#ff7f00", "#ffff00", "#00ff00", "#0000ff", "#8b00ff",
];
const FIRE: &[&str] = &["#ff4500", "#ff8c00", "#ffd700"];
const OCEAN: &[&str] = &["#00bfff", "#1e90ff", "#4169e1"];
const PURPLE: &[&str] = &["#9400d3", "#8a2be2", "#9370db"];
const GREEN: &[&str] = &["#00ff7f", "#00fa9a", "#7cfc00"];
const PINK: &[&str] = &["#ff1493", "#ff69b4", "#ffb6c1"];

impl StyleName {
    /// The preset's colors, top to bottom.
    pub fn colors(self) -> &'static [&'static str] {
        match self {
            StyleName::Default => DEFAULT,
            StyleName::Neon => NEON,
            StyleName::Rainbow => RAINBOW,
            StyleName::Fire => FIRE,
            StyleName::Ocean => OCEAN,
            StyleName::Purple => PURPLE,
            StyleName::Green => GREEN,
            StyleName::Pink => PINK,
        }
    }
}

/// Looks a preset up by name; unknown names get the default preset.
pub fn colors_for_name(name: &str) -> &'static [&'static str] {
    match StyleName::from_str(name) {
        Ok(style) => style.colors(),
        Err(err) => {
            tracing::warn!(%err, "falling back to the default caret style");
            StyleName::Default.colors()
        }
    }
}

/// The colors the caret and its trail use.
///
/// An explicit color override wins verbatim. Otherwise the named preset is used.
pub fn resolve_colors(options: &NormalizedOptions) -> Vec<String> {
    match &options.color {
        Some(color) => {
            let colors = color.to_vec();
            if colors.is_empty() {
                // An empty list would leave nothing to paint with.
                return to_owned(options.style.colors());
            }
            colors
        }
        None => to_owned(options.style.colors()),
    }
}

/// A single color stays as-is; several become a top-to-bottom linear gradient.
pub fn gradient(colors: &[String]) -> String {
    match colors {
        [] => String::new(),
        [only] => only.clone(),
        many => format!("linear-gradient(180deg, {})", many.join(", ")),
    }
}

/// Parses `#rrggbb`, `#rgb` or a named color.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 3 {
            let mut rgb = [0u8; 3];
            for (slot, ch) in rgb.iter_mut().zip(hex.chars()) {
                let v = ch.to_digit(16)? as u8;
                *slot = v * 17;
            }
            return Some(Color::Rgb(rgb[0], rgb[1], rgb[2]));
        }
    }
    Color::from_str(s).ok()
}

/// Mixes two colors; non-RGB colors snap to whichever end `t` is closer to.
pub fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (a, b) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => Color::Rgb(
            mix(r1, r2, t),
            mix(g1, g2, t),
            mix(b1, b2, t),
        ),
        _ => {
            if t < 0.5 {
                a
            } else {
                b
            }
        }
    }
}

/// Samples a top-to-bottom gradient over `colors` at `t` in `0..=1`.
pub fn sample_gradient(colors: &[Color], t: f64) -> Option<Color> {
    match colors {
        [] => None,
        [only] => Some(*only),
        many => {
            let span = (many.len() - 1) as f64;
            let pos = t.clamp(0.0, 1.0) * span;
            let i = (pos.floor() as usize).min(many.len() - 2);
            Some(lerp_color(many[i], many[i + 1], pos - i as f64))
        }
    }
}

fn mix(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn to_owned(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| (*c).to_string()).collect()
}
