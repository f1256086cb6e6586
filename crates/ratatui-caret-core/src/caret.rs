use crate::geometry::BoxRect;
use crate::geometry::CaretPosition;
use std::time::Duration;
use std::time::Instant;

/// Where a caret transition is in its timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    from: CaretPosition,
    to: CaretPosition,
    started: Instant,
    duration: Duration,
}

impl Motion {
    fn position_at(&self, now: Instant) -> CaretPosition {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.from.lerp(self.to, ease_out(t))
    }

    fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// What a host needs to draw the caret this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CaretVisual {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Colors top to bottom.
    pub colors: Vec<String>,
    /// CSS-style background: a color or a `linear-gradient(...)`.
    pub background: String,
    /// Glow color (first color of the palette).
    pub glow: String,
}

/// The decorative caret: position, transition timing, visibility and paint.
///
/// Moves are interpolated with `ease-out` timing from wherever the caret is currently drawn, so a
/// move issued mid-transition starts from the in-flight position. Both axes move together.
#[derive(Clone, Debug)]
pub struct VisualCaret {
    visible: bool,
    removed: bool,
    placed: Option<Motion>,
    transition_enabled: bool,
    duration: Duration,
    width: f64,
    height: f64,
    colors: Vec<String>,
    background: String,
}

impl VisualCaret {
    pub fn new(colors: Vec<String>, width: f64, duration: Duration) -> Self {
        let mut caret = Self {
            visible: false,
            removed: false,
            placed: None,
            transition_enabled: true,
            duration,
            width,
            height: 0.0,
            colors: Vec::new(),
            background: String::new(),
        };
        caret.apply_style(colors, width, duration);
        caret
    }

    pub fn show(&mut self) {
        if !self.removed {
            self.visible = true;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.removed
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Snap subsequent moves until [`Self::enable_transition`] is called.
    pub fn disable_transition(&mut self) {
        self.transition_enabled = false;
    }

    pub fn enable_transition(&mut self) {
        self.transition_enabled = true;
    }

    pub fn transition_enabled(&self) -> bool {
        self.transition_enabled
    }

    pub fn move_to(&mut self, to: CaretPosition, now: Instant) {
        let from = self.rendered_position(now).unwrap_or(to);
        let duration = if self.transition_enabled {
            self.duration
        } else {
            Duration::ZERO
        };
        self.placed = Some(Motion {
            from,
            to,
            started: now,
            duration,
        });
    }

    pub fn apply_style(&mut self, colors: Vec<String>, thickness: f64, duration: Duration) {
        self.background = crate::style::gradient(&colors);
        self.colors = colors;
        self.width = thickness;
        self.duration = duration;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    pub fn target(&self) -> Option<CaretPosition> {
        self.placed.map(|m| m.to)
    }

    /// Where the caret is drawn at `now`, ignoring visibility.
    pub fn rendered_position(&self, now: Instant) -> Option<CaretPosition> {
        self.placed.map(|m| m.position_at(now))
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.placed.is_some_and(|m| !m.finished(now))
    }

    /// The drawn box, or `None` while hidden, removed, never placed, or without area.
    pub fn bounding_rect(&self, now: Instant) -> Option<BoxRect> {
        if !self.is_visible() {
            return None;
        }
        let pos = self.rendered_position(now)?;
        let rect = BoxRect::new(pos.x, pos.y, self.width, self.height);
        rect.has_area().then_some(rect)
    }

    pub fn visual(&self, now: Instant) -> Option<CaretVisual> {
        let rect = self.bounding_rect(now)?;
        Some(CaretVisual {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            colors: self.colors.clone(),
            background: self.background.clone(),
            glow: self.colors.first().cloned().unwrap_or_default(),
        })
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remove(&mut self) {
        self.visible = false;
        self.removed = true;
        self.placed = None;
    }
}

/// CSS `ease-out`, i.e. `cubic-bezier(0, 0, 0.58, 1)`.
pub fn ease_out(t: f64) -> f64 {
    cubic_bezier(0.0, 0.0, 0.58, 1.0, t)
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let curve = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    // x(s) is monotonic on [0, 1], so bisection finds the parameter for progress `t`.
    let (mut lo, mut hi) = (0.0f64, 1.0f64);
    let mut s = t;
    for _ in 0..32 {
        let x = curve(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    curve(y1, y2, s)
}
