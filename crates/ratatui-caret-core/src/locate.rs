//! Where is the caret? Plain text fields are measured through the mirror; rich regions report
//! their selection geometry directly.

use crate::geometry::CaretPosition;
use crate::geometry::ScrollOffset;
use crate::host::TrackedField;
use crate::mirror::Mirror;
use crate::mirror::MirrorSurface;

/// Computes the caret's page-space position, or `None` when there is no caret to show.
pub fn locate<F, M>(
    field: &F,
    mirror: &mut Mirror<M>,
    page_scroll: ScrollOffset,
) -> Option<CaretPosition>
where
    F: TrackedField + ?Sized,
    M: MirrorSurface,
{
    if field.kind().is_plain_text() {
        locate_in_text(field, mirror, page_scroll)
    } else {
        Some(locate_in_rich(field, page_scroll))
    }
}

/// Mirror measurement for single- and multi-line plain text fields.
pub fn locate_in_text<F, M>(
    field: &F,
    mirror: &mut Mirror<M>,
    page_scroll: ScrollOffset,
) -> Option<CaretPosition>
where
    F: TrackedField + ?Sized,
    M: MirrorSurface,
{
    let offset = field.selection_start()?;
    mirror.sync(field, page_scroll);

    let value = field.value();
    let split = byte_index_from_char_index(value, offset);
    let (before, after) = value.split_at(split);
    let marker = mirror.measure_marker(before, after)?;

    let scroll = field.scroll_offset();
    Some(CaretPosition::new(marker.left - scroll.x, marker.top - scroll.y))
}

/// Rich regions: the end of the selection is the origin of its last rect. Without a range, or
/// when the range has no geometry (an empty region), the field's own origin is used.
pub fn locate_in_rich<F>(field: &F, page_scroll: ScrollOffset) -> CaretPosition
where
    F: TrackedField + ?Sized,
{
    let rect = field
        .selection_rects()
        .and_then(|rects| rects.last().copied())
        .unwrap_or_else(|| field.bounding_rect());
    rect.origin().offset(page_scroll.x, page_scroll.y)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_mirror::CellMirror;
    use crate::geometry::BoxRect;
    use crate::host::FieldKind;
    use crate::testing::FakeField;

    fn mirror() -> Mirror<CellMirror> {
        Mirror::from_surface(CellMirror::new())
    }

    #[test]
    fn unreadable_cursor_means_no_caret() {
        let mut field = FakeField::text(FieldKind::SingleLine, "hello");
        field.cursor = None;
        assert_eq!(locate(&field, &mut mirror(), ScrollOffset::default()), None);
    }

    #[test]
    fn x_never_decreases_as_the_cursor_advances() {
        let text = "The quick brown fox jumps over the lazy dog";
        let mut field = FakeField::text(FieldKind::SingleLine, text);
        field.rect = BoxRect::new(2.0, 3.0, 10.0, 1.0);
        let mut m = mirror();
        let mut last = f64::NEG_INFINITY;
        for k in 0..=text.chars().count() {
            field.cursor = Some(k);
            let p = locate(&field, &mut m, ScrollOffset::default()).unwrap();
            assert!(p.x >= last, "offset {k}: {} < {last}", p.x);
            assert_eq!(p.y, 3.0);
            last = p.x;
        }
    }

    #[test]
    fn field_and_page_scroll_are_applied() {
        let mut field = FakeField::text(FieldKind::SingleLine, "abcdefghij");
        field.rect = BoxRect::new(0.0, 0.0, 5.0, 1.0);
        field.cursor = Some(8);
        field.scroll = ScrollOffset::new(4.0, 0.0);
        let p = locate(&field, &mut mirror(), ScrollOffset::new(0.0, 10.0)).unwrap();
        assert_eq!(p, CaretPosition::new(4.0, 10.0));
    }

    #[test]
    fn cursor_past_the_end_is_clamped() {
        let mut field = FakeField::text(FieldKind::SingleLine, "ab");
        field.cursor = Some(99);
        let p = locate(&field, &mut mirror(), ScrollOffset::default()).unwrap();
        assert_eq!(p.x, 2.0);
    }

    #[test]
    fn multi_line_fields_wrap() {
        let mut field = FakeField::text(FieldKind::MultiLine, "aaaa bbbb");
        field.rect = BoxRect::new(0.0, 0.0, 6.0, 3.0);
        field.cursor = Some(9);
        let p = locate(&field, &mut mirror(), ScrollOffset::default()).unwrap();
        assert_eq!(p, CaretPosition::new(4.0, 1.0));

        let mut single = FakeField::text(FieldKind::SingleLine, "aaaa bbbb");
        single.rect = field.rect;
        single.cursor = Some(9);
        let p = locate(&single, &mut mirror(), ScrollOffset::default()).unwrap();
        assert_eq!(p, CaretPosition::new(9.0, 0.0));
    }

    #[test]
    fn rich_regions_use_the_last_selection_rect() {
        let mut field = FakeField::text(FieldKind::Rich, "");
        field.rect = BoxRect::new(1.0, 1.0, 20.0, 4.0);
        field.rects = Some(vec![
            BoxRect::new(3.0, 1.0, 10.0, 1.0),
            BoxRect::new(1.0, 2.0, 4.0, 1.0),
        ]);
        let p = locate(&field, &mut mirror(), ScrollOffset::new(0.0, 5.0)).unwrap();
        assert_eq!(p, CaretPosition::new(1.0, 7.0));
    }

    #[test]
    fn rich_regions_fall_back_to_their_origin() {
        let mut field = FakeField::text(FieldKind::Rich, "");
        field.rect = BoxRect::new(6.0, 2.0, 20.0, 4.0);
        field.rects = None;
        let p = locate(&field, &mut mirror(), ScrollOffset::default()).unwrap();
        assert_eq!(p, CaretPosition::new(6.0, 2.0));

        field.rects = Some(Vec::new());
        let p = locate(&field, &mut mirror(), ScrollOffset::default()).unwrap();
        assert_eq!(p, CaretPosition::new(6.0, 2.0));
    }
}
