//! The measurement mirror: an invisible copy of a field's text layout.
//!
//! Plain text fields cannot say where their caret is. The mirror is styled like the field, fed the
//! text before the cursor, a one-character marker and the text after it, and the marker's box is
//! read back. Content is cleared right after every measurement.

use crate::geometry::BoxRect;
use crate::geometry::ScrollOffset;
use crate::host::FieldKind;
use crate::host::Host;
use crate::host::TextStyle;
use crate::host::TrackedField;
use crate::host::WhiteSpace;

/// Placed between the before/after spans and measured.
pub const MARKER: &str = "|";

/// Everything the mirror copies from the field before a measurement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MirrorLayout {
    /// The field's border box in page coordinates.
    pub frame: BoxRect,
    pub style: TextStyle,
}

/// The host's off-screen measuring element.
pub trait MirrorSurface {
    fn apply_layout(&mut self, layout: &MirrorLayout);

    /// Replaces the content with consecutive inline spans.
    fn set_spans(&mut self, spans: &[&str]);

    /// Page-space box of the span at `index`, if it was laid out.
    fn span_rect(&self, index: usize) -> Option<BoxRect>;

    fn clear(&mut self);

    fn detach(&mut self) {}
}

/// Owns a host mirror and keeps it in step with the tracked field.
#[derive(Debug)]
pub struct Mirror<M> {
    surface: M,
    layout: MirrorLayout,
}

impl<M: MirrorSurface> Mirror<M> {
    pub fn create<H>(host: &mut H) -> Self
    where
        H: Host<Mirror = M>,
    {
        Self {
            surface: host.create_mirror(),
            layout: MirrorLayout::default(),
        }
    }

    pub fn from_surface(surface: M) -> Self {
        Self {
            surface,
            layout: MirrorLayout::default(),
        }
    }

    pub fn layout(&self) -> &MirrorLayout {
        &self.layout
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    /// Copies the field's current box and text style. Styles can change between queries, so this
    /// runs before every measurement.
    pub fn sync<F: TrackedField + ?Sized>(&mut self, field: &F, page_scroll: ScrollOffset) {
        let mut style = field.text_style();
        style.white_space = match field.kind() {
            FieldKind::SingleLine => WhiteSpace::Pre,
            FieldKind::MultiLine => WhiteSpace::PreWrap,
            FieldKind::Rich => style.white_space,
        };
        self.layout = MirrorLayout {
            frame: field.bounding_rect().translate(page_scroll.x, page_scroll.y),
            style,
        };
        self.surface.apply_layout(&self.layout);
    }

    /// Lays out `before`, the marker and `after`, returns the marker's page-space box and
    /// leaves the mirror empty.
    pub fn measure_marker(&mut self, before: &str, after: &str) -> Option<BoxRect> {
        self.surface.clear();
        self.surface.set_spans(&[before, MARKER, after]);
        let rect = self.surface.span_rect(1);
        self.surface.clear();
        tracing::trace!(?rect, before_len = before.len(), "measured caret marker");
        rect
    }

    pub fn detach(&mut self) {
        self.surface.clear();
        self.surface.detach();
    }
}
