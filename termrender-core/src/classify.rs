//! Dirty classification from interpreter updates: turns one
//! `TerminalUpdate` into `DirtyTracker` marks plus the diagnostic fragments
//! the renderer facade folds into `Diagnostics`.

use std::collections::HashMap;

use compact_str::CompactString;

use crate::{
    dirty::DirtyTracker,
    state::{TerminalState, TerminalUpdate},
    theme::Rgba,
};

/// One DCS fragment, accumulated by the caller into a pending-DCS string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DcsFragment {
    Start(CompactString),
    Data(CompactString),
    End,
}

/// What a single update meant for damage tracking and diagnostics. Mirrors
/// table without duplicating the dirty-tracker's own state.
#[derive(Debug, Clone, Default)]
pub struct Damage {
    pub forces_full: bool,
    /// Present for `scroll` updates; the renderer facade attempts
    /// `RowSliceStore::apply_scroll_translation` with these parameters and
    /// only then decides whether a full rebuild is actually needed.
    pub scroll: Option<(i32, u16, u16)>,
    pub palette_changed: bool,
    pub selection_changed: bool,
    pub osc: Option<CompactString>,
    pub sos_pm_apc: Option<CompactString>,
    pub dcs_fragment: Option<DcsFragment>,
    pub clipboard: Option<CompactString>,
    pub title: Option<CompactString>,
    pub bell: bool,
}

/// Applies one update's dirty-tracker marks and returns its `Damage`.
/// `state` is the *pre-update* snapshot (so cursor/selection "old position"
/// marking reads the value being replaced).
pub fn classify_update(
    tracker: &mut DirtyTracker,
    state: &TerminalState,
    columns: u16,
    palette_overrides: &mut HashMap<u8, Rgba>,
    update: &TerminalUpdate,
) -> Damage {
    let mut damage = Damage::default();

    match update {
        TerminalUpdate::Cells(positions) => {
            for &(row, col) in positions {
                tracker.mark_cell(row, col);
            }
        },
        TerminalUpdate::Cursor { old, new } => {
            tracker.mark_cell(old.row, old.column);
            tracker.mark_cell(new.row, new.column);
        },
        TerminalUpdate::CursorVisibility(_) => {
            tracker.mark_cell(state.cursor.row, state.cursor.column);
        },
        TerminalUpdate::Scroll { amount, top, bottom } => {
            damage.scroll = Some((*amount, *top, *bottom));
        },
        TerminalUpdate::ClearDisplay => {
            tracker.mark_full();
            damage.forces_full = true;
        },
        TerminalUpdate::ClearLine(row) => {
            tracker.mark_row(*row);
        },
        TerminalUpdate::ClearLineAfterCursor { row, col } => {
            tracker.mark_range(*row, *col as i64, i64::MAX);
        },
        TerminalUpdate::Attributes => {
            tracker.mark_full();
            damage.forces_full = true;
        },
        TerminalUpdate::ScrollRegion { .. } => {
            tracker.mark_full();
            damage.forces_full = true;
        },
        TerminalUpdate::Mode => {
            tracker.mark_full();
            damage.forces_full = true;
        },
        TerminalUpdate::Palette { index, color } => {
            palette_overrides.insert(*index, *color);
            tracker.mark_full();
            damage.forces_full = true;
            damage.palette_changed = true;
        },
        TerminalUpdate::SelectionSet(sel) | TerminalUpdate::SelectionUpdate(sel) => {
            tracker.mark_selection(state.selection.as_ref(), columns);
            tracker.mark_selection(Some(sel), columns);
            damage.selection_changed = true;
        },
        TerminalUpdate::SelectionClear => {
            tracker.mark_selection(state.selection.as_ref(), columns);
            damage.selection_changed = true;
        },
        TerminalUpdate::Osc(s) => damage.osc = Some(s.clone()),
        TerminalUpdate::SosPmApc(s) => damage.sos_pm_apc = Some(s.clone()),
        TerminalUpdate::DcsStart(s) => damage.dcs_fragment = Some(DcsFragment::Start(s.clone())),
        TerminalUpdate::DcsData(s) => damage.dcs_fragment = Some(DcsFragment::Data(s.clone())),
        TerminalUpdate::DcsEnd => damage.dcs_fragment = Some(DcsFragment::End),
        TerminalUpdate::Clipboard(s) => damage.clipboard = Some(s.clone()),
        TerminalUpdate::Title(s) => damage.title = Some(s.clone()),
        TerminalUpdate::Bell => damage.bell = true,
    }

    damage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dirty::DirtyMode,
        state::{CursorPos, Selection, SelectionKind, SelectionPoint, SelectionStatus},
    };

    fn blank_state() -> TerminalState {
        TerminalState::blank(4, 4)
    }

    #[test]
    fn cells_update_marks_each_position_without_full() {
        let mut tracker = DirtyTracker::new();
        let state = blank_state();
        let mut overrides = HashMap::new();
        let update = TerminalUpdate::Cells(vec![(0, 0), (1, 2)]);

        let damage = classify_update(&mut tracker, &state, 4, &mut overrides, &update);
        assert!(!damage.forces_full);
        let result = tracker.consume(4, 4);
        assert_eq!(result.mode, DirtyMode::Partial);
        assert!(result.rows.contains_key(&0));
        assert!(result.rows.contains_key(&1));
    }

    #[test]
    fn clear_display_forces_full() {
        let mut tracker = DirtyTracker::new();
        let state = blank_state();
        let mut overrides = HashMap::new();
        let damage = classify_update(&mut tracker, &state, 4, &mut overrides, &TerminalUpdate::ClearDisplay);
        assert!(damage.forces_full);
        assert!(tracker.is_full());
    }

    #[test]
    fn palette_update_inserts_override_and_forces_full() {
        let mut tracker = DirtyTracker::new();
        let state = blank_state();
        let mut overrides = HashMap::new();
        let color = Rgba::opaque(1, 2, 3);
        let damage =
            classify_update(&mut tracker, &state, 4, &mut overrides, &TerminalUpdate::Palette { index: 1, color });
        assert!(damage.palette_changed);
        assert!(damage.forces_full);
        assert_eq!(overrides.get(&1), Some(&color));
    }

    #[test]
    fn scroll_update_does_not_force_full_by_itself() {
        let mut tracker = DirtyTracker::new();
        let state = blank_state();
        let mut overrides = HashMap::new();
        let update = TerminalUpdate::Scroll { amount: 1, top: 0, bottom: 3 };
        let damage = classify_update(&mut tracker, &state, 4, &mut overrides, &update);
        assert!(!damage.forces_full);
        assert_eq!(damage.scroll, Some((1, 0, 3)));
    }

    #[test]
    fn selection_clear_marks_old_selection_and_reports_change() {
        let mut tracker = DirtyTracker::new();
        let mut state = blank_state();
        state.selection = Some(Selection {
            anchor: SelectionPoint { row: 0, column: 0, ts: 0 },
            focus: SelectionPoint { row: 0, column: 2, ts: 0 },
            kind: SelectionKind::Linear,
            status: SelectionStatus::Complete,
        });
        let mut overrides = HashMap::new();
        let damage = classify_update(&mut tracker, &state, 4, &mut overrides, &TerminalUpdate::SelectionClear);
        assert!(damage.selection_changed);
        let result = tracker.consume(4, 4);
        assert!(result.rows.contains_key(&0));
    }

    #[test]
    fn cursor_visibility_marks_current_cursor_cell() {
        let mut tracker = DirtyTracker::new();
        let mut state = blank_state();
        state.cursor = CursorPos { row: 2, column: 1 };
        let mut overrides = HashMap::new();
        classify_update(&mut tracker, &state, 4, &mut overrides, &TerminalUpdate::CursorVisibility(false));
        let result = tracker.consume(4, 4);
        assert!(result.rows.contains_key(&2));
    }

    #[test]
    fn bell_clipboard_title_are_rendering_no_ops() {
        let mut tracker = DirtyTracker::new();
        let state = blank_state();
        let mut overrides = HashMap::new();
        let damage = classify_update(&mut tracker, &state, 4, &mut overrides, &TerminalUpdate::Bell);
        assert!(damage.bell);
        assert!(!damage.forces_full);
        let result = tracker.consume(4, 4);
        assert_eq!(result.mode, DirtyMode::None);
    }
}
