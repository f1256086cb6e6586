//! Test doubles for the host seams.

use crate::cell_mirror::CellMirror;
use crate::geometry::BoxRect;
use crate::geometry::ScrollOffset;
use crate::host::FieldId;
use crate::host::FieldKind;
use crate::host::Host;
use crate::host::NativeCaret;
use crate::host::OverlayCanvas;
use crate::host::TextStyle;
use crate::host::TrackedField;
use crate::host::ViewportMetrics;
use std::time::Duration;
use std::time::Instant;

#[derive(Clone, Debug)]
pub(crate) struct FakeField {
    pub id: FieldId,
    pub kind: FieldKind,
    pub value: String,
    pub cursor: Option<usize>,
    pub rect: BoxRect,
    pub scroll: ScrollOffset,
    pub rects: Option<Vec<BoxRect>>,
    pub style: TextStyle,
    pub native: NativeCaret,
}

impl FakeField {
    /// A field with the cursor at the end of `value`.
    pub fn text(kind: FieldKind, value: &str) -> Self {
        Self {
            id: FieldId(1),
            kind,
            value: value.to_string(),
            cursor: Some(value.chars().count()),
            rect: BoxRect::new(0.0, 0.0, 40.0, 1.0),
            scroll: ScrollOffset::default(),
            rects: None,
            style: TextStyle::default(),
            native: NativeCaret::Auto,
        }
    }
}

impl TrackedField for FakeField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn selection_start(&self) -> Option<usize> {
        self.cursor
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn bounding_rect(&self) -> BoxRect {
        self.rect
    }

    fn text_style(&self) -> TextStyle {
        self.style.clone()
    }

    fn selection_rects(&self) -> Option<Vec<BoxRect>> {
        self.rects.clone()
    }

    fn set_native_caret(&mut self, caret: NativeCaret) {
        self.native = caret;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawOp {
    Clear,
    Alpha(f64),
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        alpha: f64,
        color: String,
    },
}

/// Records every drawing call in order.
#[derive(Clone, Debug)]
pub(crate) struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
    pub alpha: f64,
    pub size: (f64, f64, f64),
    pub detached: bool,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            alpha: 1.0,
            size: (0.0, 0.0, 1.0),
            detached: false,
        }
    }
}

impl RecordingCanvas {
    pub fn circles(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .count()
    }
}

impl OverlayCanvas for RecordingCanvas {
    fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        self.size = (width, height, pixel_ratio);
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str) {
        self.ops.push(DrawOp::Circle {
            x: cx,
            y: cy,
            radius,
            alpha: self.alpha,
            color: color.to_string(),
        });
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}

/// A host with a hand-cranked clock.
#[derive(Clone, Debug)]
pub(crate) struct FakeHost {
    pub now: Instant,
    pub scroll: ScrollOffset,
    pub viewport: ViewportMetrics,
    pub active: Option<FieldId>,
    pub canvas_available: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            scroll: ScrollOffset::default(),
            viewport: ViewportMetrics {
                width: 80.0,
                height: 24.0,
                pixel_ratio: 2.0,
            },
            active: None,
            canvas_available: true,
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Host for FakeHost {
    type Mirror = CellMirror;
    type Canvas = RecordingCanvas;

    fn create_mirror(&mut self) -> CellMirror {
        CellMirror::new()
    }

    fn create_canvas(&mut self) -> Option<RecordingCanvas> {
        self.canvas_available.then(RecordingCanvas::default)
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    fn page_scroll(&self) -> ScrollOffset {
        self.scroll
    }

    fn active_field(&self) -> Option<FieldId> {
        self.active
    }

    fn now(&self) -> Instant {
        self.now
    }
}
