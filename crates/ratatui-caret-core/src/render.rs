use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::caret::CaretVisual;
use crate::controller::CaretTrail;
use crate::geometry::ScrollOffset;
use crate::host::Host;
use crate::host::OverlayCanvas;
use crate::style::lerp_color;
use crate::style::parse_color;
use crate::style::sample_gradient;

/// Left partial blocks, one to eight eighths of a cell wide.
const CARET_GLYPHS: [&str; 8] = ["▏", "▎", "▍", "▌", "▋", "▊", "▉", "█"];

/// Dots fainter than this are not painted.
const MIN_VISIBLE_ALPHA: f64 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Dot {
    color: Color,
    alpha: f64,
}

/// An [`OverlayCanvas`] backed by a grid of sub-cell dots.
///
/// Each terminal cell holds `density × density` dots, where `density` is the rounded pixel ratio.
/// Circles are rasterized into the grid with source-over blending; [`BufferCanvas::paint`] then
/// picks the strongest dot of every cell and draws a glyph sized by its alpha.
#[derive(Clone, Debug)]
pub struct BufferCanvas {
    cols: usize,
    rows: usize,
    density: usize,
    dots: Vec<Option<Dot>>,
    alpha: f64,
    attached: bool,
}

impl Default for BufferCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferCanvas {
    pub fn new() -> Self {
        Self {
            cols: 0,
            rows: 0,
            density: 1,
            dots: Vec::new(),
            alpha: 1.0,
            attached: true,
        }
    }

    /// Dots per cell along each axis.
    pub fn density(&self) -> usize {
        self.density
    }

    /// Grid size in dots.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_blank(&self) -> bool {
        self.dots.iter().all(Option::is_none)
    }

    /// Alpha of the dot at grid position `(x, y)`.
    pub fn dot_alpha(&self, x: usize, y: usize) -> f64 {
        if x >= self.cols || y >= self.rows {
            return 0.0;
        }
        self.dots[y * self.cols + x].map_or(0.0, |d| d.alpha)
    }

    /// Paints the grid into `buf`. The viewport's origin is `area`'s top-left cell.
    pub fn paint(&self, area: Rect, buf: &mut Buffer) {
        if !self.attached || self.dots.is_empty() {
            return;
        }
        let d = self.density;
        for row in 0..area.height {
            for col in 0..area.width {
                let Some(dot) = self.strongest(col as usize * d, row as usize * d) else {
                    continue;
                };
                if dot.alpha < MIN_VISIBLE_ALPHA {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(dot_glyph(dot.alpha));
                    cell.set_fg(dot.color);
                }
            }
        }
    }

    fn strongest(&self, x0: usize, y0: usize) -> Option<Dot> {
        let mut best: Option<Dot> = None;
        for y in y0..(y0 + self.density).min(self.rows) {
            for x in x0..(x0 + self.density).min(self.cols) {
                if let Some(dot) = self.dots[y * self.cols + x] {
                    if best.is_none_or(|b| dot.alpha > b.alpha) {
                        best = Some(dot);
                    }
                }
            }
        }
        best
    }

    fn blend(&mut self, index: usize, color: Color) {
        let a = self.alpha;
        self.dots[index] = Some(match self.dots[index] {
            None => Dot { color, alpha: a },
            Some(under) => {
                let alpha = a + under.alpha * (1.0 - a);
                Dot {
                    color: lerp_color(under.color, color, a / alpha),
                    alpha,
                }
            }
        });
    }
}

impl OverlayCanvas for BufferCanvas {
    fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        let density = if pixel_ratio.is_finite() && pixel_ratio >= 1.0 {
            pixel_ratio.round() as usize
        } else {
            1
        };
        let cells = |v: f64| if v.is_finite() { v.max(0.0).ceil() as usize } else { 0 };
        self.density = density;
        self.cols = cells(width) * density;
        self.rows = cells(height) * density;
        self.dots = vec![None; self.cols * self.rows];
        tracing::trace!(cols = self.cols, rows = self.rows, density, "overlay canvas resized");
    }

    fn clear(&mut self) {
        self.dots.fill(None);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str) {
        if !self.attached || self.alpha <= 0.0 || !(cx.is_finite() && cy.is_finite()) {
            return;
        }
        let Some(color) = parse_color(color) else {
            tracing::trace!(color, "skipping particle with an unparsable color");
            return;
        };
        let d = self.density as f64;
        let (x, y) = (cx * d, cy * d);
        // Anything smaller than a dot still covers the dot it sits in.
        let r = if radius.is_finite() { (radius * d).max(0.5) } else { 0.5 };

        let span = |lo: f64, hi: f64, max: usize| {
            let lo = lo.floor().clamp(0.0, max as f64) as usize;
            let hi = hi.ceil().clamp(0.0, max as f64) as usize;
            lo..hi
        };
        for j in span(y - r, y + r, self.rows) {
            for i in span(x - r, x + r, self.cols) {
                let dx = i as f64 + 0.5 - x;
                let dy = j as f64 + 0.5 - y;
                if dx * dx + dy * dy <= r * r {
                    self.blend(j * self.cols + i, color);
                }
            }
        }
    }

    fn detach(&mut self) {
        self.attached = false;
        self.dots.clear();
    }
}

fn dot_glyph(alpha: f64) -> &'static str {
    if alpha < 0.2 {
        "·"
    } else if alpha < 0.45 {
        "•"
    } else {
        "●"
    }
}

/// The partial block for a caret `thickness` eighths of a cell wide.
pub fn caret_glyph(thickness: f64) -> &'static str {
    let eighths = if thickness.is_finite() {
        thickness.round().clamp(1.0, 8.0) as usize
    } else {
        1
    };
    CARET_GLYPHS[eighths - 1]
}

/// Draws the caret as a column of partial blocks colored top to bottom along its gradient.
///
/// Cells that already hold text keep their glyph and get the caret color as background instead.
pub fn render_caret(visual: &CaretVisual, page_scroll: ScrollOffset, area: Rect, buf: &mut Buffer) {
    let left = (visual.left - page_scroll.x).floor();
    let top = (visual.top - page_scroll.y).floor();
    if !(left.is_finite() && top.is_finite()) || left < 0.0 || left >= area.width as f64 {
        return;
    }
    let rows = visual.height.ceil().max(1.0) as usize;
    let colors: Vec<Color> = visual.colors.iter().filter_map(|c| parse_color(c)).collect();
    let glyph = caret_glyph(visual.width);

    for i in 0..rows {
        let y = top + i as f64;
        if y < 0.0 || y >= area.height as f64 {
            continue;
        }
        let t = if rows > 1 {
            i as f64 / (rows - 1) as f64
        } else {
            0.0
        };
        let color = sample_gradient(&colors, t).unwrap_or(Color::Reset);
        let Some(cell) = buf.cell_mut((area.x + left as u16, area.y + y as u16)) else {
            continue;
        };
        if cell.symbol().trim().is_empty() {
            cell.set_symbol(glyph);
            cell.set_fg(color);
        } else {
            cell.set_bg(color);
        }
    }
}

/// Paints a controller's particle canvas and then its caret.
pub fn render_overlay<H>(trail: &CaretTrail<H>, host: &H, area: Rect, buf: &mut Buffer)
where
    H: Host<Canvas = BufferCanvas>,
{
    if trail.is_destroyed() {
        return;
    }
    trail.canvas().paint(area, buf);
    if let Some(visual) = trail.caret_visual(host.now()) {
        render_caret(&visual, host.page_scroll(), area, buf);
    }
}
