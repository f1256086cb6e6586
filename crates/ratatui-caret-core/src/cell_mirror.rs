use crate::geometry::BoxRect;
use crate::host::TextTransform;
use crate::host::WhiteSpace;
use crate::mirror::MirrorLayout;
use crate::mirror::MirrorSurface;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glyph {
    span: usize,
    /// Index of the source char within its span, before any text transform.
    source: usize,
    ch: char,
    row: usize,
    col: f64,
    width: f64,
    advance: f64,
}

/// A character placed by [`CellMirror`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub span: usize,
    /// Char index in the span's original text. A transform can map one char to several glyphs.
    pub source: usize,
    pub ch: char,
    pub rect: BoxRect,
}

/// A [`MirrorSurface`] that lays text out on a character-cell grid.
///
/// Glyph widths come from `unicode-width` and are scaled by the font size. Explicit newlines
/// always break; when the layout's white-space mode wraps, lines break at the last whitespace
/// that fits, or mid-word when a single word is wider than the content box.
#[derive(Clone, Debug, Default)]
pub struct CellMirror {
    layout: MirrorLayout,
    glyphs: Vec<Glyph>,
    attached: bool,
}

impl CellMirror {
    pub fn new() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn layout(&self) -> &MirrorLayout {
        &self.layout
    }

    /// Every laid-out character with its page-space box, in text order.
    pub fn glyphs(&self) -> impl Iterator<Item = PlacedGlyph> + '_ {
        self.glyphs.iter().map(|g| PlacedGlyph {
            span: g.span,
            source: g.source,
            ch: g.ch,
            rect: self.glyph_rect(g),
        })
    }

    fn glyph_rect(&self, glyph: &Glyph) -> BoxRect {
        let style = &self.layout.style;
        let line_height = style.resolved_line_height();
        let content = self
            .layout
            .frame
            .inset(style.border.add(style.padding));
        BoxRect::new(
            content.left + glyph.col,
            content.top + glyph.row as f64 * line_height,
            glyph.width,
            line_height,
        )
    }

    fn lay_out(&mut self, spans: &[&str]) {
        let style = &self.layout.style;
        let content = self
            .layout
            .frame
            .inset(style.border.add(style.padding));
        let wraps = style.white_space != WhiteSpace::Pre && content.width > 0.0;
        let tab_size = style.tab_size.max(1) as f64 * style.font_size;

        let mut glyphs: Vec<Glyph> = Vec::new();
        let mut row = 0usize;
        let mut col = style.text_indent;
        let mut line_start = 0usize;
        let mut last_break: Option<usize> = None;

        for (span, text) in spans.iter().enumerate() {
            for (source, ch) in transformed(text, style.text_transform) {
                if ch == '\n' {
                    glyphs.push(Glyph {
                        span,
                        source,
                        ch,
                        row,
                        col,
                        width: 0.0,
                        advance: 0.0,
                    });
                    row += 1;
                    col = 0.0;
                    line_start = glyphs.len();
                    last_break = None;
                    continue;
                }

                let (width, advance) = if ch == '\t' {
                    let next_stop = ((col / tab_size).floor() + 1.0) * tab_size;
                    let w = next_stop - col;
                    (w, w)
                } else {
                    let w = UnicodeWidthChar::width(ch).unwrap_or(0) as f64 * style.font_size;
                    if w > 0.0 {
                        (w, w + style.letter_spacing)
                    } else {
                        (0.0, 0.0)
                    }
                };

                let is_space = ch.is_whitespace();
                // Whitespace hangs past the edge instead of wrapping.
                if wraps && !is_space && width > 0.0 && col + width > content.width {
                    let has_room_to_break = glyphs.len() > line_start;
                    if let Some(split) = last_break.filter(|&i| i > line_start) {
                        row += 1;
                        col = 0.0;
                        for g in &mut glyphs[split..] {
                            g.row = row;
                            g.col = col;
                            col += g.advance;
                        }
                        line_start = split;
                    } else if has_room_to_break {
                        row += 1;
                        col = 0.0;
                        line_start = glyphs.len();
                    }
                    last_break = None;
                }

                glyphs.push(Glyph {
                    span,
                    source,
                    ch,
                    row,
                    col,
                    width,
                    advance,
                });
                col += advance;
                if is_space {
                    last_break = Some(glyphs.len());
                }
            }
        }

        self.glyphs = glyphs;
    }
}

impl MirrorSurface for CellMirror {
    fn apply_layout(&mut self, layout: &MirrorLayout) {
        self.layout = layout.clone();
    }

    fn set_spans(&mut self, spans: &[&str]) {
        self.lay_out(spans);
    }

    fn span_rect(&self, index: usize) -> Option<BoxRect> {
        let glyph = self.glyphs.iter().find(|g| g.span == index)?;
        Some(self.glyph_rect(glyph))
    }

    fn clear(&mut self) {
        self.glyphs.clear();
    }

    fn detach(&mut self) {
        self.glyphs.clear();
        self.attached = false;
    }
}

/// The chars to lay out, each tagged with the index of the source char it came from.
fn transformed(text: &str, transform: TextTransform) -> Vec<(usize, char)> {
    let mut out = Vec::with_capacity(text.len());
    for (i, ch) in text.chars().enumerate() {
        match transform {
            TextTransform::None => out.push((i, ch)),
            TextTransform::Uppercase => out.extend(ch.to_uppercase().map(|c| (i, c))),
            TextTransform::Lowercase => out.extend(ch.to_lowercase().map(|c| (i, c))),
        }
    }
    out
}
