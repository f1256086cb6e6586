use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SIZE: f64 = 2.0;
pub const DEFAULT_ANIMATION_DURATION_MS: f64 = 150.0;
pub const DEFAULT_TRAIL_LENGTH: usize = 10;
pub const DEFAULT_TRAIL_OPACITY: f64 = 0.5;
pub const DEFAULT_TRAIL_WIDTH: f64 = 2.0;

/// One of the built-in color presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StyleName {
    #[default]
    Default,
    Neon,
    Rainbow,
    Fire,
    Ocean,
    Purple,
    Green,
    Pink,
}

impl StyleName {
    pub const ALL: [StyleName; 8] = [
        StyleName::Default,
        StyleName::Neon,
        StyleName::Rainbow,
        StyleName::Fire,
        StyleName::Ocean,
        StyleName::Purple,
        StyleName::Green,
        StyleName::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleName::Default => "default",
            StyleName::Neon => "neon",
            StyleName::Rainbow => "rainbow",
            StyleName::Fire => "fire",
            StyleName::Ocean => "ocean",
            StyleName::Purple => "purple",
            StyleName::Green => "green",
            StyleName::Pink => "pink",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown caret style `{0}`")]
pub struct UnknownStyle(pub String);

impl FromStr for StyleName {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// A color override: a single color or an ordered list (top to bottom).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ColorOption {
    Single(String),
    List(Vec<String>),
}

impl ColorOption {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ColorOption::Single(c) => vec![c.clone()],
            ColorOption::List(list) => list.clone(),
        }
    }
}

impl From<&str> for ColorOption {
    fn from(value: &str) -> Self {
        ColorOption::Single(value.to_string())
    }
}

impl From<String> for ColorOption {
    fn from(value: String) -> Self {
        ColorOption::Single(value)
    }
}

impl From<Vec<String>> for ColorOption {
    fn from(value: Vec<String>) -> Self {
        ColorOption::List(value)
    }
}

impl From<Vec<&str>> for ColorOption {
    fn from(value: Vec<&str>) -> Self {
        ColorOption::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Caller-facing options. Every field is optional; see [`NormalizedOptions`] for defaults.
///
/// Also used as the partial input of `update_options`: only the fields that are `Some` change.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CaretOptions {
    pub color: Option<ColorOption>,
    /// Caret thickness in pixels (cells' eighths in the terminal host).
    pub size: Option<f64>,
    /// Caret transition duration in milliseconds.
    pub animation_duration: Option<f64>,
    pub trail_length: Option<usize>,
    pub trail_opacity: Option<f64>,
    pub trail_width: Option<f64>,
    pub style: Option<StyleName>,
}

impl CaretOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: impl Into<ColorOption>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_animation_duration(mut self, ms: f64) -> Self {
        self.animation_duration = Some(ms);
        self
    }

    pub fn with_trail_length(mut self, len: usize) -> Self {
        self.trail_length = Some(len);
        self
    }

    pub fn with_trail_opacity(mut self, opacity: f64) -> Self {
        self.trail_opacity = Some(opacity);
        self
    }

    pub fn with_trail_width(mut self, width: f64) -> Self {
        self.trail_width = Some(width);
        self
    }

    pub fn with_style(mut self, style: StyleName) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the style by name. Unknown names select [`StyleName::Default`].
    pub fn with_style_name(mut self, name: &str) -> Self {
        let style = name.parse().unwrap_or_else(|err: UnknownStyle| {
            tracing::warn!(%err, "falling back to the default caret style");
            StyleName::Default
        });
        self.style = Some(style);
        self
    }
}

/// Options with every default filled in. Only `color` stays optional.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedOptions {
    pub color: Option<ColorOption>,
    pub size: f64,
    pub animation_duration: f64,
    pub trail_length: usize,
    pub trail_opacity: f64,
    pub trail_width: f64,
    pub style: StyleName,
}

impl Default for NormalizedOptions {
    fn default() -> Self {
        Self::normalize(&CaretOptions::default())
    }
}

impl NormalizedOptions {
    pub fn normalize(options: &CaretOptions) -> Self {
        Self {
            color: options.color.clone(),
            size: positive_or(options.size, DEFAULT_SIZE),
            animation_duration: positive_or(
                options.animation_duration,
                DEFAULT_ANIMATION_DURATION_MS,
            ),
            trail_length: options
                .trail_length
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_TRAIL_LENGTH),
            trail_opacity: positive_or(options.trail_opacity, DEFAULT_TRAIL_OPACITY).min(1.0),
            trail_width: positive_or(options.trail_width, DEFAULT_TRAIL_WIDTH),
            style: options.style.unwrap_or_default(),
        }
    }

    /// Applies the fields present in `partial`, leaving the others as they are.
    pub fn merge(&mut self, partial: &CaretOptions) {
        if let Some(color) = &partial.color {
            self.color = Some(color.clone());
        }
        if let Some(size) = valid(partial.size) {
            self.size = size;
        }
        if let Some(ms) = valid(partial.animation_duration) {
            self.animation_duration = ms;
        }
        if let Some(len) = partial.trail_length.filter(|&n| n > 0) {
            self.trail_length = len;
        }
        if let Some(opacity) = valid(partial.trail_opacity) {
            self.trail_opacity = opacity.min(1.0);
        }
        if let Some(width) = valid(partial.trail_width) {
            self.trail_width = width;
        }
        if let Some(style) = partial.style {
            self.style = style;
        }
    }

    pub fn transition(&self) -> Duration {
        millis(self.animation_duration)
    }

    /// Particles spawned per burst.
    pub fn burst_count(&self) -> usize {
        self.trail_length.clamp(3, 8)
    }

    /// Upper bound on live particles.
    pub fn particle_cap(&self) -> usize {
        self.trail_length.saturating_mul(10)
    }

    /// How long one burst keeps the frame loop alive.
    pub fn burst_window(&self) -> Duration {
        millis((self.animation_duration * 2.0).clamp(150.0, 400.0))
    }
}

fn millis(ms: f64) -> Duration {
    Duration::from_micros((ms * 1000.0).round() as u64)
}

fn valid(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite() && *v > 0.0)
}

fn positive_or(v: Option<f64>, default: f64) -> f64 {
    valid(v).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_defaults_but_keeps_color_optional() {
        let n = NormalizedOptions::normalize(&CaretOptions::default());
        assert_eq!(n.color, None);
        assert_eq!(n.size, 2.0);
        assert_eq!(n.animation_duration, 150.0);
        assert_eq!(n.trail_length, 10);
        assert_eq!(n.trail_opacity, 0.5);
        assert_eq!(n.trail_width, 2.0);
        assert_eq!(n.style, StyleName::Default);
    }

    #[test]
    fn zero_and_nan_count_as_absent() {
        let n = NormalizedOptions::normalize(
            &CaretOptions::new()
                .with_size(0.0)
                .with_animation_duration(f64::NAN)
                .with_trail_length(0)
                .with_trail_opacity(3.0),
        );
        assert_eq!(n.size, 2.0);
        assert_eq!(n.animation_duration, 150.0);
        assert_eq!(n.trail_length, 10);
        assert_eq!(n.trail_opacity, 1.0);
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let mut n = NormalizedOptions::normalize(&CaretOptions::new().with_size(4.0));
        n.merge(&CaretOptions::new().with_style(StyleName::Fire));
        assert_eq!(n.size, 4.0);
        assert_eq!(n.style, StyleName::Fire);
    }

    #[test]
    fn burst_window_is_clamped() {
        let mut n = NormalizedOptions::default();
        assert_eq!(n.burst_window(), Duration::from_millis(300));
        n.animation_duration = 10.0;
        assert_eq!(n.burst_window(), Duration::from_millis(150));
        n.animation_duration = 1000.0;
        assert_eq!(n.burst_window(), Duration::from_millis(400));
    }

    #[test]
    fn parsing_an_unknown_style_reports_the_name() {
        let err = "plaid".parse::<StyleName>().unwrap_err();
        assert_eq!(err, UnknownStyle("plaid".to_string()));
        assert_eq!(err.to_string(), "unknown caret style `plaid`");
        assert_eq!("fire".parse::<StyleName>(), Ok(StyleName::Fire));
    }

    #[test]
    fn unknown_style_name_selects_default() {
        let o = CaretOptions::new().with_style_name("plaid");
        assert_eq!(o.style, Some(StyleName::Default));
        let o = CaretOptions::new().with_style_name("ocean");
        assert_eq!(o.style, Some(StyleName::Ocean));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_config() {
        let o: CaretOptions = serde_json::from_str(
            r##"{"style":"neon","trailLength":4,"color":["#fff","#000"]}"##,
        )
        .unwrap();
        assert_eq!(o.style, Some(StyleName::Neon));
        assert_eq!(o.trail_length, Some(4));
        assert_eq!(o.color, Some(ColorOption::from(vec!["#fff", "#000"])));
    }
}
