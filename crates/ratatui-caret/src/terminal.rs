//! The terminal host: one viewport, measured in cells.

use ratatui::layout::Rect;
use ratatui_caret_core::cell_mirror::CellMirror;
use ratatui_caret_core::geometry::BoxRect;
use ratatui_caret_core::geometry::ScrollOffset;
use ratatui_caret_core::host::FieldId;
use ratatui_caret_core::host::Host;
use ratatui_caret_core::host::ViewportMetrics;
use ratatui_caret_core::render::BufferCanvas;
use std::time::Duration;
use std::time::Instant;

/// Where the host reads the time from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    /// A clock that only moves when told to. Useful in tests and for recording frames.
    Manual(Instant),
}

impl Clock {
    pub fn manual() -> Self {
        Self::Manual(Instant::now())
    }

    pub fn now(&self) -> Instant {
        match self {
            Clock::System => Instant::now(),
            Clock::Manual(at) => *at,
        }
    }

    /// Moves a manual clock forward. The system clock ignores this.
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Manual(at) = self {
            *at += by;
        }
    }
}

#[derive(Clone, Debug)]
pub struct TerminalHostOptions {
    /// Particle dots per cell along each axis.
    pub pixel_ratio: f64,
    pub clock: Clock,
}

impl Default for TerminalHostOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            clock: Clock::System,
        }
    }
}

/// A [`Host`] backed by a ratatui viewport.
///
/// Viewport coordinates are cells relative to `area`'s top-left corner. The page scroll models a
/// scrolled document drawn into the viewport; fields report their boxes in viewport coordinates.
#[derive(Clone, Debug)]
pub struct TerminalHost {
    area: Rect,
    page_scroll: ScrollOffset,
    active: Option<FieldId>,
    options: TerminalHostOptions,
}

impl TerminalHost {
    pub fn new(area: Rect) -> Self {
        Self::with_options(area, TerminalHostOptions::default())
    }

    pub fn with_options(area: Rect, options: TerminalHostOptions) -> Self {
        Self {
            area,
            page_scroll: ScrollOffset::default(),
            active: None,
            options,
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Returns whether the area changed; callers send a `Resize` event when it did.
    pub fn set_area(&mut self, area: Rect) -> bool {
        let changed = self.area != area;
        self.area = area;
        changed
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.options.pixel_ratio = ratio;
    }

    pub fn set_page_scroll(&mut self, scroll: ScrollOffset) {
        self.page_scroll = scroll;
    }

    pub fn set_active_field(&mut self, field: Option<FieldId>) {
        self.active = field;
    }

    pub fn clock(&self) -> &Clock {
        &self.options.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.options.clock
    }

    /// Converts an on-screen rect into viewport coordinates.
    pub fn to_viewport(&self, rect: Rect) -> BoxRect {
        BoxRect::new(
            rect.x as f64 - self.area.x as f64,
            rect.y as f64 - self.area.y as f64,
            rect.width as f64,
            rect.height as f64,
        )
    }
}

impl Host for TerminalHost {
    type Mirror = CellMirror;
    type Canvas = BufferCanvas;

    fn create_mirror(&mut self) -> CellMirror {
        CellMirror::new()
    }

    fn create_canvas(&mut self) -> Option<BufferCanvas> {
        Some(BufferCanvas::new())
    }

    fn viewport(&self) -> ViewportMetrics {
        ViewportMetrics {
            width: self.area.width as f64,
            height: self.area.height as f64,
            pixel_ratio: self.options.pixel_ratio,
        }
    }

    fn page_scroll(&self) -> ScrollOffset {
        self.page_scroll
    }

    fn active_field(&self) -> Option<FieldId> {
        self.active
    }

    fn now(&self) -> Instant {
        self.options.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_follows_the_area() {
        let mut host = TerminalHost::new(Rect::new(2, 1, 40, 10));
        assert_eq!(host.viewport().width, 40.0);
        assert_eq!(host.viewport().pixel_ratio, 2.0);
        assert!(!host.set_area(Rect::new(2, 1, 40, 10)));
        assert!(host.set_area(Rect::new(0, 0, 80, 24)));
        assert_eq!(host.viewport().height, 24.0);
    }

    #[test]
    fn to_viewport_subtracts_the_area_origin() {
        let host = TerminalHost::new(Rect::new(2, 1, 40, 10));
        assert_eq!(
            host.to_viewport(Rect::new(5, 3, 10, 1)),
            BoxRect::new(3.0, 2.0, 10.0, 1.0)
        );
    }

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let mut clock = Clock::manual();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), t0 + Duration::from_millis(16));
    }
}
