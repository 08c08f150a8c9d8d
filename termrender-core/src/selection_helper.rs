//! Canonical selection-row-segment helper.

use crate::state::{Selection, SelectionKind};

/// One row's selected column range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSegment {
    pub row: i64,
    pub start_column: u16,
    pub end_column: u16,
}

/// Hosts may supply their own row-segmentation (e.g. respecting wide
/// glyphs or reflow); this trait names that seam (Design Notes: "Cursor
/// overlay customization" sibling note on pluggable host behavior).
pub trait SelectionSegmenter {
    fn segments(&self, selection: &Selection, columns: u16) -> Vec<SelectionSegment>;
}

/// The canonical fallback: iterates the inclusive anchor->focus interval
/// clipped to `[0, columns-1]`.
pub fn segments(selection: &Selection, columns: u16) -> Vec<SelectionSegment> {
    if columns == 0 {
        return Vec::new();
    }

    let (start, end) = if (selection.anchor.row, selection.anchor.column)
        <= (selection.focus.row, selection.focus.column)
    {
        (selection.anchor, selection.focus)
    } else {
        (selection.focus, selection.anchor)
    };

    let max_col = columns - 1;

    match selection.kind {
        SelectionKind::Block => {
            let (lo_col, hi_col) = (start.column.min(end.column), start.column.max(end.column).min(max_col));
            (start.row..=end.row)
                .map(|row| SelectionSegment { row, start_column: lo_col, end_column: hi_col })
                .collect()
        },
        SelectionKind::Linear => {
            if start.row == end.row {
                vec![SelectionSegment {
                    row: start.row,
                    start_column: start.column.min(max_col),
                    end_column: end.column.min(max_col),
                }]
            } else {
                let mut out = Vec::new();
                out.push(SelectionSegment {
                    row: start.row,
                    start_column: start.column.min(max_col),
                    end_column: max_col,
                });
                for row in (start.row + 1)..end.row {
                    out.push(SelectionSegment { row, start_column: 0, end_column: max_col });
                }
                out.push(SelectionSegment {
                    row: end.row,
                    start_column: 0,
                    end_column: end.column.min(max_col),
                });
                out
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SelectionPoint, SelectionStatus};

    fn point(row: i64, column: u16) -> SelectionPoint {
        SelectionPoint { row, column, ts: 0 }
    }

    #[test]
    fn linear_single_row() {
        let sel = Selection {
            anchor: point(0, 1),
            focus: point(0, 3),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        let segs = segments(&sel, 10);
        assert_eq!(segs, vec![SelectionSegment { row: 0, start_column: 1, end_column: 3 }]);
    }

    #[test]
    fn linear_multi_row_spans_full_width_in_middle() {
        let sel = Selection {
            anchor: point(0, 5),
            focus: point(2, 2),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        let segs = segments(&sel, 8);
        assert_eq!(
            segs,
            vec![
                SelectionSegment { row: 0, start_column: 5, end_column: 7 },
                SelectionSegment { row: 1, start_column: 0, end_column: 7 },
                SelectionSegment { row: 2, start_column: 0, end_column: 2 },
            ]
        );
    }

    #[test]
    fn block_selection_is_rectangular() {
        let sel = Selection {
            anchor: point(0, 4),
            focus: point(2, 1),
            kind: SelectionKind::Block,
            status: SelectionStatus::Complete,
        };
        let segs = segments(&sel, 10);
        assert_eq!(segs.len(), 3);
        for s in &segs {
            assert_eq!((s.start_column, s.end_column), (1, 4));
        }
    }

    #[test]
    fn reversed_focus_before_anchor_is_normalized() {
        let sel = Selection {
            anchor: point(2, 0),
            focus: point(0, 0),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        let segs = segments(&sel, 5);
        assert_eq!(segs.first().unwrap().row, 0);
        assert_eq!(segs.last().unwrap().row, 2);
    }
}
