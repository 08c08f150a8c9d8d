//! Selected-text extraction. Walks `termrender_core::Selection` row segments
//! directly so it works identically regardless of which backend is live.

use termrender_core::{segments, Selection, TerminalState};

/// Concatenates the symbols covered by `selection` into a single string, one
/// line per selected row, in document order.
///
/// Rows outside `[0, state.rows)` (stale selections surviving a resize) are
/// skipped rather than causing an error.
pub fn selection_text(state: &TerminalState, selection: &Selection, trim_trailing_whitespace: bool) -> String {
    let segs = segments(selection, state.columns);
    let mut out = String::new();

    for (i, seg) in segs.iter().enumerate() {
        if seg.row < 0 || seg.row as u16 >= state.rows {
            continue;
        }
        let row = seg.row as u16;

        let mut line = String::new();
        for col in seg.start_column..=seg.end_column {
            if let Some(cell) = state.cell(row, col) {
                line.push_str(&cell.symbol);
            }
        }

        if trim_trailing_whitespace {
            let trimmed_len = line.trim_end().len();
            line.truncate(trimmed_len);
        }

        if i > 0 {
            out.push('\n');
        }
        out.push_str(&line);
    }

    out
}

#[cfg(test)]
mod tests {
    use termrender_core::{Cell, CellAttr, SelectionKind, SelectionPoint, SelectionStatus};

    use super::*;

    fn state_with_text(rows: u16, columns: u16, text: &[&str]) -> TerminalState {
        let mut state = TerminalState::blank(rows, columns);
        for (r, line) in text.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                state.buffer[r][c] = Cell::new(ch.to_string(), CellAttr::default());
            }
        }
        state
    }

    fn point(row: i64, column: u16) -> SelectionPoint {
        SelectionPoint { row, column, ts: 0 }
    }

    #[test]
    fn single_row_selection_extracts_substring() {
        let state = state_with_text(1, 10, &["hello world"]);
        let sel = Selection {
            anchor: point(0, 0),
            focus: point(0, 4),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        assert_eq!(selection_text(&state, &sel, false), "hello");
    }

    #[test]
    fn multi_row_linear_selection_joins_with_newline() {
        let state = state_with_text(2, 5, &["abcde", "fghij"]);
        let sel = Selection {
            anchor: point(0, 3),
            focus: point(1, 1),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        assert_eq!(selection_text(&state, &sel, false), "de\nfg");
    }

    #[test]
    fn trailing_whitespace_is_trimmed_when_requested() {
        let state = state_with_text(1, 10, &["hi   "]);
        let sel = Selection {
            anchor: point(0, 0),
            focus: point(0, 9),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        assert_eq!(selection_text(&state, &sel, true), "hi");
    }

    #[test]
    fn stale_row_outside_state_is_skipped() {
        let state = state_with_text(1, 5, &["abcde"]);
        let sel = Selection {
            anchor: point(0, 0),
            focus: point(3, 0),
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        };
        let text = selection_text(&state, &sel, false);
        assert_eq!(text.lines().next().unwrap(), "abcde");
    }
}
