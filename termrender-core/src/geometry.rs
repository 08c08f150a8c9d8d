//! Row-geometry builder: turns one row of a `TerminalState`
//! into clip-space quads. Platform-independent; glyph rasterization is
//! supplied by the caller via an `ensure_glyph` callback so this module
//! never touches a canvas or GPU context.

use std::collections::HashMap;

use crate::{
    atlas::{GlyphEntry, GlyphKey},
    color::resolve_cell_colors,
    error::Error,
    selection_helper::SelectionSegment,
    state::{CursorPos, TerminalState},
    theme::{CursorShape, Metrics, Rgba, SelectionTheme, Theme},
};

/// Five parallel float buffers in clip-space, ready for GPU upload or CPU
/// `fillRect`/`fillText` replay.
#[derive(Debug, Clone, Default)]
pub struct RowGeometry {
    pub bg_positions: Vec<f32>,
    pub bg_colors: Vec<f32>,
    pub glyph_positions: Vec<f32>,
    pub glyph_texcoords: Vec<f32>,
    pub glyph_colors: Vec<f32>,
}

impl RowGeometry {
    pub fn background_vertex_count(&self) -> usize {
        self.bg_positions.len() / 2
    }

    pub fn glyph_vertex_count(&self) -> usize {
        self.glyph_positions.len() / 2
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_row_geometry(
    state: &TerminalState,
    row: u16,
    metrics: &Metrics,
    theme: &Theme,
    palette_overrides: &HashMap<u8, Rgba>,
    mut ensure_glyph: impl FnMut(GlyphKey) -> Result<GlyphEntry, Error>,
    fallback_fg: Rgba,
    fallback_bg: Rgba,
    selection_segment: Option<SelectionSegment>,
    selection_theme: Option<&SelectionTheme>,
    include_cursor: bool,
) -> Result<RowGeometry, Error> {
    let mut geo = RowGeometry::default();

    let cols = state.columns as f32;
    let rows = state.rows as f32;
    let cell_w = metrics.cell_width;
    let cell_h = metrics.cell_height;

    let clip = |x: f32, y: f32| -> (f32, f32) {
        let clip_x = x / (cols * cell_w) * 2.0 - 1.0;
        let clip_y = 1.0 - y / (rows * cell_h) * 2.0;
        (clip_x, clip_y)
    };

    if let Some(seg) = selection_segment {
        if let Some(sel_theme) = selection_theme {
            if let Some(bg) = sel_theme.background {
                let width = (seg.end_column as i32 - seg.start_column as i32 + 1).max(0) as f32 * cell_w;
                push_quad(
                    &mut geo.bg_positions,
                    &mut geo.bg_colors,
                    &clip,
                    seg.start_column as f32 * cell_w,
                    row as f32 * cell_h,
                    width,
                    cell_h,
                    bg,
                    1.0,
                );
            }
        }
    }

    for c in 0..state.columns {
        let Some(cell) = state.cell(row, c) else { continue };

        let (mut fg, mut bg) =
            resolve_cell_colors(&cell.attr, theme, palette_overrides, fallback_fg, fallback_bg);

        let in_selection = selection_segment
            .map(|seg| seg.start_column <= c && c <= seg.end_column)
            .unwrap_or(false);

        if in_selection {
            if let Some(sel_theme) = selection_theme {
                if let Some(sel_fg) = sel_theme.foreground {
                    fg = Some(sel_fg);
                }
            }
            bg = None;
        }

        let x = c as f32 * cell_w;
        let y = row as f32 * cell_h;

        if let Some(bg) = bg {
            push_quad(&mut geo.bg_positions, &mut geo.bg_colors, &clip, x, y, cell_w, cell_h, bg, 1.0);
        }

        if let Some(fg) = fg {
            push_decorations(&mut geo.bg_positions, &mut geo.bg_colors, &clip, &cell.attr, x, y, cell_w, cell_h, fg);

            let is_blank = cell.symbol.as_str() == " ";
            if !cell.symbol.is_empty() && !is_blank {
                let ch = cell.symbol.chars().next().unwrap();
                let key = GlyphKey::new(ch, cell.attr.bold, cell.attr.italic);
                let entry = ensure_glyph(key)?;
                let alpha = if cell.attr.faint { 0.6 } else { 1.0 };
                push_glyph_quad(&mut geo, &clip, x, y, cell_w, cell_h, entry, fg, alpha);
            }
        }
    }

    if include_cursor && state.cursor_visible && state.cursor.row == row {
        push_cursor(&mut geo.bg_positions, &mut geo.bg_colors, &clip, state.cursor, theme, cell_w, cell_h);
    }

    Ok(geo)
}

#[allow(clippy::too_many_arguments)]
fn push_quad(
    positions: &mut Vec<f32>,
    colors: &mut Vec<f32>,
    clip: &impl Fn(f32, f32) -> (f32, f32),
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgba,
    alpha: f32,
) {
    let (x0, y0) = clip(x, y);
    let (x1, y1) = clip(x + w, y + h);

    #[rustfmt::skip]
    let verts = [
        x0, y0, x0, y1, x1, y0,
        x1, y0, x0, y1, x1, y1,
    ];
    positions.extend_from_slice(&verts);

    let rgba = [
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        (color.3 as f32 / 255.0) * alpha,
    ];
    for _ in 0..6 {
        colors.extend_from_slice(&rgba);
    }
}

#[allow(clippy::too_many_arguments)]
fn push_glyph_quad(
    geo: &mut RowGeometry,
    clip: &impl Fn(f32, f32) -> (f32, f32),
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    entry: GlyphEntry,
    color: Rgba,
    alpha: f32,
) {
    let (x0, y0) = clip(x, y);
    let (x1, y1) = clip(x + w, y + h);

    #[rustfmt::skip]
    let verts = [
        x0, y0, x0, y1, x1, y0,
        x1, y0, x0, y1, x1, y1,
    ];
    geo.glyph_positions.extend_from_slice(&verts);

    #[rustfmt::skip]
    let uvs = [
        entry.u0, entry.v0, entry.u0, entry.v1, entry.u1, entry.v0,
        entry.u1, entry.v0, entry.u0, entry.v1, entry.u1, entry.v1,
    ];
    geo.glyph_texcoords.extend_from_slice(&uvs);

    let rgba = [
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        (color.3 as f32 / 255.0) * alpha,
    ];
    for _ in 0..6 {
        geo.glyph_colors.extend_from_slice(&rgba);
    }
}

#[allow(clippy::too_many_arguments)]
fn push_decorations(
    positions: &mut Vec<f32>,
    colors: &mut Vec<f32>,
    clip: &impl Fn(f32, f32) -> (f32, f32),
    attr: &crate::state::CellAttr,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    fg: Rgba,
) {
    use crate::state::Underline;

    let thickness = (h * 0.08).round().max(1.0);

    match attr.underline {
        Underline::Single => {
            push_quad(positions, colors, clip, x, y + h - thickness, w, thickness, fg, 1.0);
        },
        Underline::Double => {
            push_quad(positions, colors, clip, x, y + h - thickness, w, thickness, fg, 1.0);
            push_quad(
                positions,
                colors,
                clip,
                x,
                y + h - thickness - (thickness + 2.0),
                w,
                thickness,
                fg,
                1.0,
            );
        },
        Underline::None => {},
    }

    if attr.strikethrough {
        let mid_y = y + (h / 2.0).round() - (thickness / 2.0).floor();
        push_quad(positions, colors, clip, x, mid_y, w, thickness, fg, 1.0);
    }
}

fn push_cursor(
    positions: &mut Vec<f32>,
    colors: &mut Vec<f32>,
    clip: &impl Fn(f32, f32) -> (f32, f32),
    cursor: CursorPos,
    theme: &Theme,
    cell_w: f32,
    cell_h: f32,
) {
    let x = cursor.column as f32 * cell_w;
    let y = cursor.row as f32 * cell_h;
    let alpha = theme.cursor.opacity;

    match theme.cursor.shape {
        CursorShape::Block => push_quad(positions, colors, clip, x, y, cell_w, cell_h, theme.cursor.color, alpha),
        CursorShape::Underline => {
            let height = (cell_h * 0.2).round().max(1.0);
            push_quad(positions, colors, clip, x, y + cell_h - height, cell_w, height, theme.cursor.color, alpha);
        },
        CursorShape::Bar => {
            let width = (cell_w * 0.2).round().max(1.0);
            push_quad(positions, colors, clip, x, y, width, cell_h, theme.cursor.color, alpha);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Cell, CellAttr, ColorTag};

    fn no_glyphs() -> impl FnMut(GlyphKey) -> Result<GlyphEntry, Error> {
        |_key| {
            Ok(GlyphEntry {
                page: 0,
                u0: 0.0,
                v0: 0.0,
                u1: 1.0,
                v1: 1.0,
                width: 8,
                height: 16,
                padding: 1,
                is_color: false,
            })
        }
    }

    #[test]
    fn blank_row_emits_background_only() {
        let state = TerminalState::blank(1, 2);
        let metrics = Metrics::default();
        let theme = Theme::default();
        let overrides = HashMap::new();

        let geo = build_row_geometry(
            &state,
            0,
            &metrics,
            &theme,
            &overrides,
            no_glyphs(),
            theme.foreground,
            theme.background,
            None,
            None,
            false,
        )
        .unwrap();

        // default background is the fallback, default treat_default_as_null makes
        // it non-null for both cells -> 2 background quads, no glyphs (blank cells)
        assert_eq!(geo.background_vertex_count(), 12);
        assert_eq!(geo.glyph_vertex_count(), 0);
    }

    #[test]
    fn non_space_cell_emits_glyph_quad() {
        let mut state = TerminalState::blank(1, 1);
        state.buffer[0][0] = Cell::new("x", CellAttr::default());
        let metrics = Metrics::default();
        let theme = Theme::default();
        let overrides = HashMap::new();

        let geo = build_row_geometry(
            &state,
            0,
            &metrics,
            &theme,
            &overrides,
            no_glyphs(),
            theme.foreground,
            theme.background,
            None,
            None,
            false,
        )
        .unwrap();

        assert_eq!(geo.glyph_vertex_count(), 6);
    }

    #[test]
    fn selection_substitutes_foreground_and_nulls_background() {
        let mut state = TerminalState::blank(1, 2);
        state.buffer[0][0] = Cell::new("x", CellAttr { background: ColorTag::Rgb(1, 2, 3), ..CellAttr::default() });
        let metrics = Metrics::default();
        let theme = Theme::default();
        let overrides = HashMap::new();
        let sel_theme = SelectionTheme { background: Some(Rgba::opaque(1, 2, 3)), foreground: Some(Rgba::opaque(9, 9, 9)) };
        let seg = SelectionSegment { row: 0, start_column: 0, end_column: 0 };

        let geo = build_row_geometry(
            &state,
            0,
            &metrics,
            &theme,
            &overrides,
            no_glyphs(),
            theme.foreground,
            theme.background,
            Some(seg),
            Some(&sel_theme),
            false,
        )
        .unwrap();

        // selection bg quad (6 verts) + column 1's own background (6 verts);
        // column 0's cell background is forced null by the selection.
        assert_eq!(geo.background_vertex_count(), 12);
        assert_eq!(geo.glyph_vertex_count(), 6);
    }

    #[test]
    fn cursor_block_emits_quad_at_cursor_row() {
        let mut state = TerminalState::blank(1, 2);
        state.cursor = CursorPos { row: 0, column: 1 };
        let metrics = Metrics::default();
        let theme = Theme::default();
        let overrides = HashMap::new();

        let geo = build_row_geometry(
            &state,
            0,
            &metrics,
            &theme,
            &overrides,
            no_glyphs(),
            theme.foreground,
            theme.background,
            None,
            None,
            true,
        )
        .unwrap();

        // 2 cell backgrounds + 1 cursor quad
        assert_eq!(geo.background_vertex_count(), 18);
    }
}
