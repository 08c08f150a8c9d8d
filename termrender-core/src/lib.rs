mod atlas;
mod classify;
mod color;
mod dirty;
mod error;
mod geometry;
mod selection_helper;
mod slices;
mod state;
mod theme;

pub use atlas::{GlyphAtlasLayout, GlyphEntry, GlyphKey, MAX_PAGES, PADDING};
pub use classify::{classify_update, Damage, DcsFragment};
pub use color::{parse_css_color, resolve_cell_colors, resolve_palette_entry, terminal_color_to_rgba};
pub use dirty::{ConsumeResult, DirtyMode, DirtyTracker, Span};
pub use error::Error;
pub use geometry::{build_row_geometry, RowGeometry};
pub use selection_helper::{segments, SelectionSegment, SelectionSegmenter};
pub use slices::{GrowableBuffer, RowSliceStore, ScrollOutcome};
pub use state::{
    Cell, CellAttr, ColorTag, CursorPos, Selection, SelectionKind, SelectionPoint,
    SelectionStatus, TerminalState, TerminalUpdate, Underline,
};
pub use theme::{
    CursorShape, CursorTheme, FontMetrics, Metrics, Palette, Rgba, SelectionTheme, Theme,
};

/// Diagnostics accumulated across renderer calls; transient, never persisted.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub last_frame_duration_ms: f64,
    pub last_draw_call_count: u32,
    pub last_osc: Option<compact_str::CompactString>,
    pub last_sos_pm_apc: Option<compact_str::CompactString>,
    pub pending_dcs: Option<compact_str::CompactString>,
    pub bytes_uploaded: Option<u64>,
    pub cells_processed: u64,
    pub dirty_coverage: Option<f32>,
    pub frame_hash: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_default_is_empty() {
        let d = Diagnostics::default();
        assert_eq!(d.cells_processed, 0);
        assert!(d.last_osc.is_none());
    }
}
