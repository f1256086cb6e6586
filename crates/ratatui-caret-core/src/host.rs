//! The seams between the engine and the environment hosting the edited text.
//!
//! The engine never talks to a concrete UI toolkit. It reads fields through [`TrackedField`],
//! measures text through a [`MirrorSurface`](crate::mirror::MirrorSurface), draws particles
//! through an [`OverlayCanvas`], and asks the [`Host`] for viewport metrics and the time.

use crate::geometry::BoxRect;
use crate::geometry::Insets;
use crate::geometry::ScrollOffset;
use crate::mirror::MirrorSurface;
use std::time::Instant;

/// Stable identity of a tracked field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line plain text input.
    SingleLine,
    /// Multi-line plain text area.
    MultiLine,
    /// Rich editable region that exposes selection geometry directly.
    Rich,
}

impl FieldKind {
    pub fn is_plain_text(self) -> bool {
        matches!(self, FieldKind::SingleLine | FieldKind::MultiLine)
    }
}

/// How the field's own caret is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NativeCaret {
    #[default]
    Auto,
    Transparent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Wrap, collapse nothing (treated like `PreWrap` by the cell mirror).
    Normal,
    /// Never wrap; newlines are kept.
    Pre,
    /// Wrap at word boundaries; newlines are kept.
    #[default]
    PreWrap,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
}

/// The subset of a field's computed style that affects where glyphs land.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    /// `None` means "normal", i.e. `font_size * 1.2`.
    pub line_height: Option<f64>,
    pub letter_spacing: f64,
    pub text_indent: f64,
    pub tab_size: usize,
    pub padding: Insets,
    pub border: Insets,
    pub white_space: WhiteSpace,
    pub text_transform: TextTransform,
}

impl Default for TextStyle {
    /// Terminal cell metrics: one cell per glyph, one row per line.
    fn default() -> Self {
        Self {
            font_size: 1.0,
            line_height: Some(1.0),
            letter_spacing: 0.0,
            text_indent: 0.0,
            tab_size: 4,
            padding: Insets::default(),
            border: Insets::default(),
            white_space: WhiteSpace::default(),
            text_transform: TextTransform::default(),
        }
    }
}

impl TextStyle {
    pub fn resolved_line_height(&self) -> f64 {
        self.line_height
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(self.font_size * 1.2)
    }
}

/// An editable surface being observed. The engine only borrows it.
pub trait TrackedField {
    fn id(&self) -> FieldId;

    fn kind(&self) -> FieldKind;

    fn value(&self) -> &str;

    /// Cursor offset in chars, or `None` when the field refuses to report one.
    fn selection_start(&self) -> Option<usize>;

    /// The field's own content scroll.
    fn scroll_offset(&self) -> ScrollOffset {
        ScrollOffset::default()
    }

    /// The field's border box in viewport coordinates.
    fn bounding_rect(&self) -> BoxRect;

    fn text_style(&self) -> TextStyle;

    /// Viewport-space rects of the current selection range.
    ///
    /// `None` means there is no range at all; `Some(vec![])` means a range with no geometry.
    fn selection_rects(&self) -> Option<Vec<BoxRect>> {
        None
    }

    fn set_native_caret(&mut self, caret: NativeCaret);
}

/// A full-viewport drawing surface for the particle trail.
pub trait OverlayCanvas {
    /// Resizes the backing store to `width × height × pixel_ratio` and scales drawing to match.
    fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64);

    fn clear(&mut self);

    fn set_alpha(&mut self, alpha: f64);

    /// Fills a circle given in viewport coordinates.
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str);

    /// Removes the surface from the host. Called once on teardown.
    fn detach(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        }
    }
}

/// The environment the fields live in.
pub trait Host {
    type Mirror: MirrorSurface;
    type Canvas: OverlayCanvas;

    fn create_mirror(&mut self) -> Self::Mirror;

    /// `None` when no drawable surface can be obtained.
    fn create_canvas(&mut self) -> Option<Self::Canvas>;

    fn viewport(&self) -> ViewportMetrics;

    fn page_scroll(&self) -> ScrollOffset;

    /// The field that currently has input focus, if the host knows.
    fn active_field(&self) -> Option<FieldId>;

    fn now(&self) -> Instant;
}
