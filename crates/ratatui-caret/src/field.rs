//! Editable fields the caret overlay can follow.
//!
//! [`TextField`] is a plain text input (single or multi-line) whose caret is found through the
//! measurement mirror. [`RichField`] is a rich region that reports its selection geometry directly.
//! Both lay out and draw text on the same cell grid the engine measures against, so the overlay
//! caret lines up with the drawn glyphs.

use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui_caret_core::cell_mirror::CellMirror;
use ratatui_caret_core::geometry::BoxRect;
use ratatui_caret_core::geometry::ScrollOffset;
use ratatui_caret_core::host::FieldId;
use ratatui_caret_core::host::FieldKind;
use ratatui_caret_core::host::NativeCaret;
use ratatui_caret_core::host::TextStyle;
use ratatui_caret_core::host::TrackedField;
use ratatui_caret_core::host::WhiteSpace;
use ratatui_caret_core::mirror::MARKER;
use ratatui_caret_core::mirror::MirrorLayout;
use ratatui_caret_core::mirror::MirrorSurface;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldAction {
    None,
    /// The cursor or selection moved.
    Moved,
    /// The text changed.
    Changed,
}

#[derive(Clone, Debug)]
pub struct TextField {
    id: FieldId,
    kind: FieldKind,
    value: String,
    cursor: usize, // char index
    rect: BoxRect,
    scroll: ScrollOffset,
    style: TextStyle,
    native: NativeCaret,
}

impl TextField {
    pub fn single_line(id: FieldId) -> Self {
        Self::with_kind(id, FieldKind::SingleLine)
    }

    pub fn multi_line(id: FieldId) -> Self {
        Self::with_kind(id, FieldKind::MultiLine)
    }

    fn with_kind(id: FieldId, kind: FieldKind) -> Self {
        Self {
            id,
            kind,
            value: String::new(),
            cursor: 0,
            rect: BoxRect::default(),
            scroll: ScrollOffset::default(),
            style: TextStyle::default(),
            native: NativeCaret::Auto,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Replaces the text and puts the cursor at its end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = normalize_newlines(&value.into());
        self.value = if self.kind == FieldKind::SingleLine {
            value.replace('\n', " ")
        } else {
            value
        };
        self.cursor = self.char_len();
        self.ensure_cursor_visible();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.char_len());
        self.ensure_cursor_visible();
    }

    /// Sets the field's box in viewport cells.
    pub fn set_rect(&mut self, rect: BoxRect) {
        self.rect = rect;
        self.ensure_cursor_visible();
    }

    pub fn rect(&self) -> BoxRect {
        self.rect
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = ScrollOffset::new(scroll.x.max(0.0), scroll.y.max(0.0));
    }

    pub fn native_caret(&self) -> NativeCaret {
        self.native
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Applies an input event. Mouse coordinates are taken as viewport cells.
    pub fn input(&mut self, event: &InputEvent) -> FieldAction {
        let action = match event {
            InputEvent::Paste(s) => {
                self.insert_str(s);
                FieldAction::Changed
            }
            InputEvent::Key(key) if key.kind == KeyKind::Press => self.handle_key(key),
            InputEvent::MouseDown(m) => {
                if self.click(m.x as f64, m.y as f64) {
                    FieldAction::Moved
                } else {
                    FieldAction::None
                }
            }
            _ => FieldAction::None,
        };
        if action != FieldAction::None {
            self.ensure_cursor_visible();
        }
        action
    }

    /// Moves the cursor to the character nearest to a viewport point inside the field.
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        if !contains(self.rect, x, y) {
            return false;
        }
        self.cursor = self.index_at(x + self.scroll.x, y + self.scroll.y);
        true
    }

    fn handle_key(&mut self, key: &KeyEvent) -> FieldAction {
        match &key.code {
            KeyCode::Char(c) => {
                if key.modifiers.ctrl || key.modifiers.alt {
                    return FieldAction::None;
                }
                self.insert_char(*c);
                FieldAction::Changed
            }
            KeyCode::Enter => {
                if self.kind == FieldKind::SingleLine {
                    return FieldAction::None;
                }
                self.insert_char('\n');
                FieldAction::Changed
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return FieldAction::None;
                }
                self.remove_char(self.cursor - 1);
                self.cursor -= 1;
                FieldAction::Changed
            }
            KeyCode::Delete => {
                if self.cursor >= self.char_len() {
                    return FieldAction::None;
                }
                self.remove_char(self.cursor);
                FieldAction::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                FieldAction::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                FieldAction::Moved
            }
            KeyCode::Up => self.move_vertically(-1.0),
            KeyCode::Down => self.move_vertically(1.0),
            KeyCode::Home => {
                self.cursor = self.line_start(self.cursor);
                FieldAction::Moved
            }
            KeyCode::End => {
                self.cursor = self.line_end(self.cursor);
                FieldAction::Moved
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => FieldAction::None,
        }
    }

    fn move_vertically(&mut self, rows: f64) -> FieldAction {
        if self.kind == FieldKind::SingleLine {
            return FieldAction::None;
        }
        let Some(caret) = self.caret_box() else {
            return FieldAction::None;
        };
        let y = caret.top + rows * caret.height + caret.height / 2.0;
        let content = self.content_box();
        if y < content.top {
            return FieldAction::None;
        }
        let next = self.index_at(caret.left, y);
        if next == self.cursor {
            return FieldAction::None;
        }
        self.cursor = next;
        FieldAction::Moved
    }

    fn insert_char(&mut self, ch: char) {
        let idx = byte_index_from_char_index(&self.value, self.cursor);
        self.value.insert(idx, ch);
        self.cursor += 1;
    }

    fn insert_str(&mut self, s: &str) {
        let s = normalize_newlines(s);
        let s = if self.kind == FieldKind::SingleLine {
            s.replace('\n', " ")
        } else {
            s
        };
        let idx = byte_index_from_char_index(&self.value, self.cursor);
        self.value.insert_str(idx, &s);
        self.cursor += s.chars().count();
    }

    fn remove_char(&mut self, at: usize) {
        let start = byte_index_from_char_index(&self.value, at);
        let end = byte_index_from_char_index(&self.value, at + 1);
        self.value.replace_range(start..end, "");
    }

    fn line_start(&self, cursor: usize) -> usize {
        self.value
            .chars()
            .take(cursor)
            .collect::<Vec<_>>()
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1)
    }

    fn line_end(&self, cursor: usize) -> usize {
        self.value
            .chars()
            .skip(cursor)
            .position(|c| c == '\n')
            .map_or(self.char_len(), |i| cursor + i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn content_box(&self) -> BoxRect {
        self.rect.inset(self.style.border.add(self.style.padding))
    }

    fn lay_out(&self, spans: &[&str]) -> CellMirror {
        let mut style = self.style.clone();
        style.white_space = if self.kind == FieldKind::SingleLine {
            WhiteSpace::Pre
        } else {
            WhiteSpace::PreWrap
        };
        let mut mirror = CellMirror::new();
        mirror.apply_layout(&MirrorLayout {
            frame: self.rect,
            style,
        });
        mirror.set_spans(spans);
        mirror
    }

    /// The caret's box before scrolling.
    fn caret_box(&self) -> Option<BoxRect> {
        let split = byte_index_from_char_index(&self.value, self.cursor);
        let (before, after) = self.value.split_at(split);
        self.lay_out(&[before, MARKER, after]).span_rect(1)
    }

    /// Char index nearest to a point in unscrolled layout coordinates.
    fn index_at(&self, x: f64, y: f64) -> usize {
        let layout = self.lay_out(&[&self.value]);
        let mut first_top: Option<f64> = None;
        let mut row_end: Option<usize> = None;
        for g in layout.glyphs() {
            first_top.get_or_insert(g.rect.top);
            if y < g.rect.top || y >= g.rect.bottom() {
                continue;
            }
            if g.ch == '\n' || x < g.rect.left + g.rect.width / 2.0 {
                return g.source.min(self.char_len());
            }
            row_end = Some(g.source + 1);
        }
        match (row_end, first_top) {
            (Some(end), _) => end.min(self.char_len()),
            (None, Some(top)) if y < top => 0,
            _ => self.char_len(),
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let Some(caret) = self.caret_box() else {
            return;
        };
        let content = self.content_box();
        if content.width > 0.0 {
            let x = caret.left - self.scroll.x;
            if x < content.left {
                self.scroll.x = caret.left - content.left;
            } else if x + 1.0 > content.right() {
                self.scroll.x = caret.left + 1.0 - content.right();
            }
        }
        if content.height > 0.0 {
            let y = caret.top - self.scroll.y;
            if y < content.top {
                self.scroll.y = caret.top - content.top;
            } else if y + caret.height > content.bottom() {
                self.scroll.y = caret.top + caret.height - content.bottom();
            }
        }
        self.scroll.x = self.scroll.x.max(0.0);
        self.scroll.y = self.scroll.y.max(0.0);
    }

    /// Draws the text. `area` is the host viewport.
    pub fn render(&self, area: Rect, buf: &mut Buffer, style: Style) {
        let content = self.content_box();
        let layout = self.lay_out(&[&self.value]);
        for g in layout.glyphs() {
            let rect = g.rect.translate(-self.scroll.x, -self.scroll.y);
            put_glyph(area, buf, content, rect, g.ch, style);
        }
    }

    /// Terminal cursor position for when the native caret is shown.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        let caret = self.caret_box()?.translate(-self.scroll.x, -self.scroll.y);
        let content = self.content_box();
        if !contains(content, caret.left, caret.top) {
            return None;
        }
        Some((area.x + caret.left as u16, area.y + caret.top as u16))
    }
}

impl TrackedField for TextField {
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
        Some(self.cursor)
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

    fn set_native_caret(&mut self, caret: NativeCaret) {
        self.native = caret;
    }
}

/// A position in a [`RichField`]: line index and char column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPos {
    pub line: usize,
    pub col: usize,
}

impl TextPos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: TextPos,
    pub focus: TextPos,
}

impl Selection {
    pub fn collapsed(at: TextPos) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn ordered(&self) -> (TextPos, TextPos) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

/// A rich editable region. Lines never wrap; the selection is reported as one rect per line.
#[derive(Clone, Debug)]
pub struct RichField {
    id: FieldId,
    lines: Vec<String>,
    selection: Option<Selection>,
    rect: BoxRect,
    style: TextStyle,
    native: NativeCaret,
}

impl RichField {
    pub fn new(id: FieldId) -> Self {
        Self {
            id,
            lines: vec![String::new()],
            selection: None,
            rect: BoxRect::default(),
            style: TextStyle::default(),
            native: NativeCaret::Auto,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Replaces the content and drops the selection.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = normalize_newlines(&text.into());
        self.lines = text.split('\n').map(str::to_string).collect();
        self.selection = None;
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn set_rect(&mut self, rect: BoxRect) {
        self.rect = rect;
    }

    pub fn rect(&self) -> BoxRect {
        self.rect
    }

    pub fn native_caret(&self) -> NativeCaret {
        self.native
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn select(&mut self, anchor: TextPos, focus: TextPos) {
        self.selection = Some(Selection {
            anchor: self.clamp(anchor),
            focus: self.clamp(focus),
        });
    }

    pub fn select_all(&mut self) {
        let last = self.lines.len() - 1;
        let end = TextPos::new(last, char_len(&self.lines[last]));
        self.select(TextPos::default(), end);
    }

    pub fn place_cursor(&mut self, at: TextPos) {
        let at = self.clamp(at);
        self.selection = Some(Selection::collapsed(at));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Applies an input event. Mouse coordinates are taken as viewport cells.
    pub fn input(&mut self, event: &InputEvent) -> FieldAction {
        match event {
            InputEvent::Paste(s) => {
                for ch in normalize_newlines(s).chars() {
                    self.insert(ch);
                }
                FieldAction::Changed
            }
            InputEvent::Key(key) if key.kind == KeyKind::Press => self.handle_key(key),
            InputEvent::MouseDown(m) => self.click(m.x as f64, m.y as f64),
            _ => FieldAction::None,
        }
    }

    fn click(&mut self, x: f64, y: f64) -> FieldAction {
        let content = self.content_box();
        if !contains(self.rect, x, y) {
            return FieldAction::None;
        }
        let line_height = self.style.resolved_line_height();
        let line = ((y - content.top) / line_height).floor().max(0.0) as usize;
        let line = line.min(self.lines.len() - 1);
        let col = col_at(&self.lines[line], x - content.left, self.style.tab_size);
        self.place_cursor(TextPos::new(line, col));
        FieldAction::Moved
    }

    fn handle_key(&mut self, key: &KeyEvent) -> FieldAction {
        let focus = self.focus();
        match &key.code {
            KeyCode::Char('a') if key.modifiers.ctrl => {
                self.select_all();
                FieldAction::Moved
            }
            KeyCode::Char(c) => {
                if key.modifiers.ctrl || key.modifiers.alt {
                    return FieldAction::None;
                }
                self.insert(*c);
                FieldAction::Changed
            }
            KeyCode::Enter => {
                self.insert('\n');
                FieldAction::Changed
            }
            KeyCode::Backspace => {
                if self.delete_selection() {
                    return FieldAction::Changed;
                }
                let Some(prev) = self.step_back(focus) else {
                    return FieldAction::None;
                };
                self.delete_range(prev, focus);
                FieldAction::Changed
            }
            KeyCode::Delete => {
                if self.delete_selection() {
                    return FieldAction::Changed;
                }
                let Some(next) = self.step_forward(focus) else {
                    return FieldAction::None;
                };
                self.delete_range(focus, next);
                FieldAction::Changed
            }
            KeyCode::Left => {
                let to = self.step_back(focus).unwrap_or(focus);
                self.move_focus(to, key.modifiers.shift)
            }
            KeyCode::Right => {
                let to = self.step_forward(focus).unwrap_or(focus);
                self.move_focus(to, key.modifiers.shift)
            }
            KeyCode::Up => {
                let to = TextPos::new(focus.line.saturating_sub(1), focus.col);
                self.move_focus(to, key.modifiers.shift)
            }
            KeyCode::Down => {
                let to = TextPos::new(focus.line + 1, focus.col);
                self.move_focus(to, key.modifiers.shift)
            }
            KeyCode::Home => self.move_focus(TextPos::new(focus.line, 0), key.modifiers.shift),
            KeyCode::End => {
                let end = char_len(&self.lines[focus.line]);
                self.move_focus(TextPos::new(focus.line, end), key.modifiers.shift)
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => FieldAction::None,
        }
    }

    fn focus(&self) -> TextPos {
        self.selection
            .map(|s| self.clamp(s.focus))
            .unwrap_or_else(|| self.end())
    }

    fn end(&self) -> TextPos {
        let last = self.lines.len() - 1;
        TextPos::new(last, char_len(&self.lines[last]))
    }

    fn clamp(&self, pos: TextPos) -> TextPos {
        let line = pos.line.min(self.lines.len() - 1);
        TextPos::new(line, pos.col.min(char_len(&self.lines[line])))
    }

    fn move_focus(&mut self, to: TextPos, extend: bool) -> FieldAction {
        let to = self.clamp(to);
        let anchor = match self.selection {
            Some(s) if extend => s.anchor,
            _ => to,
        };
        self.select(anchor, to);
        FieldAction::Moved
    }

    fn step_back(&self, pos: TextPos) -> Option<TextPos> {
        if pos.col > 0 {
            Some(TextPos::new(pos.line, pos.col - 1))
        } else if pos.line > 0 {
            Some(TextPos::new(pos.line - 1, char_len(&self.lines[pos.line - 1])))
        } else {
            None
        }
    }

    fn step_forward(&self, pos: TextPos) -> Option<TextPos> {
        if pos.col < char_len(&self.lines[pos.line]) {
            Some(TextPos::new(pos.line, pos.col + 1))
        } else if pos.line + 1 < self.lines.len() {
            Some(TextPos::new(pos.line + 1, 0))
        } else {
            None
        }
    }

    fn insert(&mut self, ch: char) {
        self.delete_selection();
        let at = self.focus();
        let line = &mut self.lines[at.line];
        let idx = byte_index_from_char_index(line, at.col);
        if ch == '\n' {
            let tail = line[idx..].to_string();
            line.truncate(idx);
            self.lines.insert(at.line + 1, tail);
            self.place_cursor(TextPos::new(at.line + 1, 0));
        } else {
            line.insert(idx, ch);
            self.place_cursor(TextPos::new(at.line, at.col + 1));
        }
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection {
            Some(s) if !s.is_collapsed() => {
                let (start, end) = s.ordered();
                self.delete_range(start, end);
                true
            }
            _ => false,
        }
    }

    fn delete_range(&mut self, start: TextPos, end: TextPos) {
        let start = self.clamp(start);
        let end = self.clamp(end);
        let tail = {
            let line = &self.lines[end.line];
            line[byte_index_from_char_index(line, end.col)..].to_string()
        };
        let cut = byte_index_from_char_index(&self.lines[start.line], start.col);
        let head = &mut self.lines[start.line];
        head.truncate(cut);
        head.push_str(&tail);
        self.lines.drain(start.line + 1..=end.line);
        self.place_cursor(start);
    }

    fn content_box(&self) -> BoxRect {
        self.rect.inset(self.style.border.add(self.style.padding))
    }

    /// Draws the lines, highlighting a non-collapsed selection. `area` is the host viewport.
    pub fn render(&self, area: Rect, buf: &mut Buffer, style: Style) {
        let content = self.content_box();
        let line_height = self.style.resolved_line_height();
        let selected = self
            .selection
            .filter(|s| !s.is_collapsed())
            .map(|s| s.ordered());
        for (row, line) in self.lines.iter().enumerate() {
            let top = content.top + row as f64 * line_height;
            let mut x = content.left;
            for (col, ch) in line.chars().enumerate() {
                let w = cell_width(ch, self.style.tab_size);
                let pos = TextPos::new(row, col);
                let st = match selected {
                    Some((start, end)) if pos >= start && pos < end => {
                        style.add_modifier(Modifier::REVERSED)
                    }
                    _ => style,
                };
                put_glyph(area, buf, content, BoxRect::new(x, top, w, line_height), ch, st);
                x += w;
            }
        }
    }
}

impl TrackedField for RichField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Rich
    }

    fn value(&self) -> &str {
        // Rich regions are located through their selection rects, never through the mirror.
        ""
    }

    fn selection_start(&self) -> Option<usize> {
        None
    }

    fn bounding_rect(&self) -> BoxRect {
        self.rect
    }

    fn text_style(&self) -> TextStyle {
        self.style.clone()
    }

    /// One rect per selected line; a collapsed selection yields a zero-width rect at the cursor.
    /// An empty region has no geometry at all.
    fn selection_rects(&self) -> Option<Vec<BoxRect>> {
        let selection = self.selection?;
        if self.lines.iter().all(String::is_empty) {
            return Some(Vec::new());
        }
        let (start, end) = selection.ordered();
        let (start, end) = (self.clamp(start), self.clamp(end));
        let content = self.content_box();
        let line_height = self.style.resolved_line_height();
        let tab = self.style.tab_size;

        let rects = (start.line..=end.line)
            .map(|line| {
                let text = &self.lines[line];
                let from = if line == start.line { start.col } else { 0 };
                let to = if line == end.line { end.col } else { char_len(text) };
                let left = prefix_width(text, from, tab);
                BoxRect::new(
                    content.left + left,
                    content.top + line as f64 * line_height,
                    prefix_width(text, to, tab) - left,
                    line_height,
                )
            })
            .collect();
        Some(rects)
    }

    fn set_native_caret(&mut self, caret: NativeCaret) {
        self.native = caret;
    }
}

fn put_glyph(area: Rect, buf: &mut Buffer, clip: BoxRect, rect: BoxRect, ch: char, style: Style) {
    if ch == '\n' || rect.width <= 0.0 {
        return;
    }
    if rect.left < clip.left
        || rect.right() > clip.right()
        || rect.top < clip.top
        || rect.top >= clip.bottom()
    {
        return;
    }
    let x = area.x as f64 + rect.left;
    let y = area.y as f64 + rect.top;
    if x < 0.0 || y < 0.0 || x >= area.right() as f64 || y >= area.bottom() as f64 {
        return;
    }
    let (x, y) = (x as u16, y as u16);
    let mut tmp = [0u8; 4];
    let symbol: &str = if ch == '\t' {
        " "
    } else {
        ch.encode_utf8(&mut tmp)
    };
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_style(style);
        cell.set_symbol(symbol);
    }
    if UnicodeWidthChar::width(ch).unwrap_or(0) == 2 {
        if let Some(cell) = buf.cell_mut((x + 1, y)) {
            cell.set_style(style);
            cell.set_symbol("");
        }
    }
}

fn contains(rect: BoxRect, x: f64, y: f64) -> bool {
    x >= rect.left && x < rect.right() && y >= rect.top && y < rect.bottom()
}

fn cell_width(ch: char, tab_size: usize) -> f64 {
    if ch == '\t' {
        tab_size as f64
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(0) as f64
    }
}

fn prefix_width(line: &str, cols: usize, tab_size: usize) -> f64 {
    line.chars().take(cols).map(|c| cell_width(c, tab_size)).sum()
}

fn col_at(line: &str, x: f64, tab_size: usize) -> usize {
    let mut cols = 0.0;
    for (i, ch) in line.chars().enumerate() {
        let w = cell_width(ch, tab_size);
        if x < cols + w / 2.0 {
            return i;
        }
        cols += w;
    }
    char_len(line)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn byte_index_from_char_index(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    match s.char_indices().nth(char_idx) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;
    use crate::input::MouseDown;
    use ratatui_caret_core::host::TextTransform;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn typing_edits_at_the_cursor() {
        let mut f = TextField::single_line(FieldId(1)).with_value("ac");
        f.set_cursor(1);
        assert_eq!(f.input(&key(KeyCode::Char('b'))), FieldAction::Changed);
        assert_eq!(f.value(), "abc");
        assert_eq!(f.cursor(), 2);
        f.input(&key(KeyCode::Backspace));
        f.input(&key(KeyCode::Delete));
        assert_eq!(f.value(), "a");
        assert_eq!(f.input(&key(KeyCode::Enter)), FieldAction::None);
        let ctrl = KeyEvent::new(KeyCode::Char('x')).with_modifiers(KeyModifiers {
            ctrl: true,
            ..KeyModifiers::none()
        });
        assert_eq!(f.input(&InputEvent::Key(ctrl)), FieldAction::None);
    }

    #[test]
    fn released_keys_do_not_edit() {
        let mut f = TextField::single_line(FieldId(1));
        let release = InputEvent::Key(KeyEvent::new(KeyCode::Char('a')).released());
        assert_eq!(f.input(&release), FieldAction::None);
        assert!(f.is_empty());
    }

    #[test]
    fn single_line_paste_flattens_newlines() {
        let mut f = TextField::single_line(FieldId(1));
        f.input(&InputEvent::Paste("a\r\nb".into()));
        assert_eq!(f.value(), "a b");
        assert_eq!(f.cursor(), 3);
    }

    #[test]
    fn single_line_scrolls_to_keep_the_cursor_visible() {
        let mut f = TextField::single_line(FieldId(1));
        f.set_rect(BoxRect::new(0.0, 0.0, 5.0, 1.0));
        f.set_value("abcdefghij");
        assert_eq!(f.scroll().x, 6.0);
        f.input(&key(KeyCode::Home));
        assert_eq!(f.scroll().x, 0.0);
    }

    #[test]
    fn multi_line_moves_between_wrapped_rows() {
        let mut f = TextField::multi_line(FieldId(1));
        f.set_rect(BoxRect::new(0.0, 0.0, 6.0, 4.0));
        f.set_value("aaaa bbbb");
        assert_eq!(f.cursor(), 9);
        f.input(&key(KeyCode::Up));
        assert_eq!(f.cursor(), 4);
        f.input(&key(KeyCode::Down));
        assert_eq!(f.cursor(), 9);
    }

    #[test]
    fn home_and_end_stay_on_the_logical_line() {
        let mut f = TextField::multi_line(FieldId(1)).with_value("ab\ncd");
        f.set_rect(BoxRect::new(0.0, 0.0, 10.0, 3.0));
        f.set_cursor(4);
        f.input(&key(KeyCode::Home));
        assert_eq!(f.cursor(), 3);
        f.input(&key(KeyCode::End));
        assert_eq!(f.cursor(), 5);
        f.set_cursor(1);
        f.input(&key(KeyCode::End));
        assert_eq!(f.cursor(), 2);
    }

    #[test]
    fn click_places_the_cursor() {
        let mut f = TextField::multi_line(FieldId(1)).with_value("hello\nworld");
        f.set_rect(BoxRect::new(2.0, 1.0, 10.0, 3.0));
        let click = InputEvent::MouseDown(MouseDown { x: 4, y: 2 });
        assert_eq!(f.input(&click), FieldAction::Moved);
        assert_eq!(f.cursor(), 8);

        let outside = InputEvent::MouseDown(MouseDown { x: 30, y: 2 });
        assert_eq!(f.input(&outside), FieldAction::None);
    }

    #[test]
    fn click_after_an_expanded_char_lands_on_the_source_index() {
        let style = TextStyle {
            text_transform: TextTransform::Uppercase,
            ..TextStyle::default()
        };
        let mut f = TextField::single_line(FieldId(1))
            .with_style(style)
            .with_value("ßx");
        f.set_rect(BoxRect::new(0.0, 0.0, 10.0, 1.0));
        // "SSX": the third cell is the `x`.
        let click = InputEvent::MouseDown(MouseDown { x: 2, y: 0 });
        assert_eq!(f.input(&click), FieldAction::Moved);
        assert_eq!(f.cursor(), 1);
        f.input(&InputEvent::MouseDown(MouseDown { x: 5, y: 0 }));
        assert_eq!(f.cursor(), 2);
        f.input(&InputEvent::MouseDown(MouseDown { x: 0, y: 0 }));
        assert_eq!(f.cursor(), 0);
    }

    #[test]
    fn render_draws_scrolled_text_inside_the_box() {
        let mut f = TextField::single_line(FieldId(1));
        f.set_rect(BoxRect::new(1.0, 0.0, 4.0, 1.0));
        f.set_value("abcdef");
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        f.render(Rect::new(0, 0, 6, 1), &mut buf, Style::default());
        assert_eq!(row(&buf, 0), " def  ");
        assert_eq!(f.cursor_position(Rect::new(0, 0, 6, 1)), Some((4, 0)));
    }

    #[test]
    fn tracked_field_reports_cursor_and_style() {
        let mut f = TextField::single_line(FieldId(7)).with_value("xy");
        assert_eq!(f.selection_start(), Some(2));
        assert_eq!(f.kind(), FieldKind::SingleLine);
        f.set_native_caret(NativeCaret::Transparent);
        assert_eq!(f.native_caret(), NativeCaret::Transparent);
    }

    fn rich() -> RichField {
        let mut f = RichField::new(FieldId(2)).with_text("one\ntwo\nthree");
        f.set_rect(BoxRect::new(1.0, 1.0, 20.0, 5.0));
        f
    }

    #[test]
    fn rich_selection_rects_cover_each_line() {
        let mut f = rich();
        assert_eq!(f.selection_rects(), None);

        f.select(TextPos::new(0, 1), TextPos::new(2, 2));
        let rects = f.selection_rects().unwrap();
        assert_eq!(
            rects,
            vec![
                BoxRect::new(2.0, 1.0, 2.0, 1.0),
                BoxRect::new(1.0, 2.0, 3.0, 1.0),
                BoxRect::new(1.0, 3.0, 2.0, 1.0),
            ]
        );

        f.place_cursor(TextPos::new(1, 2));
        assert_eq!(
            f.selection_rects(),
            Some(vec![BoxRect::new(3.0, 2.0, 0.0, 1.0)])
        );
    }

    #[test]
    fn empty_rich_region_has_no_geometry() {
        let mut f = RichField::new(FieldId(2));
        f.place_cursor(TextPos::default());
        assert_eq!(f.selection_rects(), Some(Vec::new()));
    }

    #[test]
    fn rich_typing_replaces_the_selection() {
        let mut f = rich();
        f.select(TextPos::new(0, 1), TextPos::new(1, 1));
        f.input(&key(KeyCode::Char('X')));
        assert_eq!(f.text(), "oXwo\nthree");
        assert_eq!(f.selection(), Some(Selection::collapsed(TextPos::new(0, 2))));

        f.input(&key(KeyCode::Enter));
        assert_eq!(f.lines(), ["oX", "wo", "three"]);
        f.input(&key(KeyCode::Backspace));
        assert_eq!(f.text(), "oXwo\nthree");
    }

    #[test]
    fn rich_shift_arrows_extend_and_ctrl_a_selects_all() {
        let mut f = rich();
        f.place_cursor(TextPos::new(1, 0));
        let shift_right = KeyEvent::new(KeyCode::Right).with_modifiers(KeyModifiers {
            shift: true,
            ..KeyModifiers::none()
        });
        f.input(&InputEvent::Key(shift_right.clone()));
        f.input(&InputEvent::Key(shift_right));
        assert_eq!(
            f.selection(),
            Some(Selection {
                anchor: TextPos::new(1, 0),
                focus: TextPos::new(1, 2)
            })
        );

        let ctrl_a = KeyEvent::new(KeyCode::Char('a')).with_modifiers(KeyModifiers {
            ctrl: true,
            ..KeyModifiers::none()
        });
        f.input(&InputEvent::Key(ctrl_a));
        assert_eq!(f.selection().map(|s| s.ordered().1), Some(TextPos::new(2, 5)));
    }

    #[test]
    fn rich_click_and_render() {
        let mut f = rich();
        f.input(&InputEvent::MouseDown(MouseDown { x: 3, y: 3 }));
        assert_eq!(f.selection(), Some(Selection::collapsed(TextPos::new(2, 2))));

        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 4));
        f.render(Rect::new(0, 0, 8, 4), &mut buf, Style::default());
        assert_eq!(row(&buf, 1), " one    ");
        assert_eq!(row(&buf, 3), " three  ");
    }
}
