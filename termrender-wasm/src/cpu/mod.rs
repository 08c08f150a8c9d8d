//! CPU fallback backend: a single-pass repaint through a 2D
//! drawing context, following the same semantic rules as the row-geometry
//! builder but skipping vertex buffers entirely in favor of direct
//! `fillRect`/`fillText` calls. Used when WebGL2 is unavailable or the host
//! explicitly requests `BackendConfig::Cpu2d`.

use std::collections::HashMap;

use termrender_core::{
    resolve_cell_colors, segments, CursorShape, Diagnostics, Metrics, Rgba, Selection,
    SelectionSegment, SelectionTheme, TerminalState, Theme, Underline,
};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::{error::Error, js};

/// The dataset attribute the renderer facade advertises on the host canvas.
pub(crate) const BACKEND_TAG: &str = "cpu-2d";

pub struct Cpu2dBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Cpu2dBackend {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, Error> {
        let ctx = js::get_2d_context(&canvas)?;
        canvas.dataset().set("backend", BACKEND_TAG).map_err(|_| Error::canvas_2d_context_failed())?;
        Ok(Self { canvas, ctx })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// Repaints every row of `state`, returning the diagnostics this frame
    /// produced. GPU-specific fields (`bytes_uploaded`) stay `None` since
    /// this backend has no GPU buffers to report on.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        state: &TerminalState,
        metrics: &Metrics,
        theme: &Theme,
        palette_overrides: &HashMap<u8, Rgba>,
        selection: Option<&Selection>,
        selection_theme: Option<&SelectionTheme>,
    ) -> Diagnostics {
        let cell_w = metrics.cell_width as f64;
        let cell_h = metrics.cell_height as f64;

        let (fallback_fg, fallback_bg) = if state.reverse_video {
            (theme.background, theme.foreground)
        } else {
            (theme.foreground, theme.background)
        };

        self.fill_rect(0.0, 0.0, state.columns as f64 * cell_w, state.rows as f64 * cell_h, fallback_bg);

        let segments_by_row = selection_row_map(selection, state.columns);

        let mut cells_processed = 0u64;
        for row in 0..state.rows {
            let segment = segments_by_row.get(&row).copied();
            self.render_row(state, row, metrics, theme, palette_overrides, segment, selection_theme, fallback_fg, fallback_bg);
            cells_processed += state.columns as u64;
        }

        if state.cursor_visible {
            self.render_cursor(state, metrics, theme, cell_w, cell_h);
        }

        Diagnostics {
            last_frame_duration_ms: 0.0,
            last_draw_call_count: state.rows as u32,
            cells_processed,
            bytes_uploaded: None,
            dirty_coverage: Some(1.0),
            ..Diagnostics::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_row(
        &self,
        state: &TerminalState,
        row: u16,
        metrics: &Metrics,
        theme: &Theme,
        palette_overrides: &HashMap<u8, Rgba>,
        segment: Option<SelectionSegment>,
        selection_theme: Option<&SelectionTheme>,
        fallback_fg: Rgba,
        fallback_bg: Rgba,
    ) {
        let cell_w = metrics.cell_width as f64;
        let cell_h = metrics.cell_height as f64;
        let y = row as f64 * cell_h;

        if let Some(seg) = segment {
            if let Some(sel_theme) = selection_theme {
                if let Some(bg) = sel_theme.background {
                    let width = (seg.end_column as i32 - seg.start_column as i32 + 1).max(0) as f64 * cell_w;
                    self.fill_rect(seg.start_column as f64 * cell_w, y, width, cell_h, bg);
                }
            }
        }

        for c in 0..state.columns {
            let Some(cell) = state.cell(row, c) else { continue };
            let (mut fg, mut bg) = resolve_cell_colors(&cell.attr, theme, palette_overrides, fallback_fg, fallback_bg);

            let in_selection = segment.map(|s| s.start_column <= c && c <= s.end_column).unwrap_or(false);
            if in_selection {
                if let Some(sel_theme) = selection_theme {
                    if let Some(sel_fg) = sel_theme.foreground {
                        fg = Some(sel_fg);
                    }
                }
                bg = None;
            }

            let x = c as f64 * cell_w;

            if let Some(bg) = bg {
                self.fill_rect(x, y, cell_w, cell_h, bg);
            }

            let Some(fg) = fg else { continue };

            self.render_decorations(&cell.attr, x, y, cell_w, cell_h, fg);

            let is_blank = cell.symbol.as_str() == " ";
            if cell.symbol.is_empty() || is_blank {
                continue;
            }

            self.ctx.set_fill_style_str(&css_rgba(fg, if cell.attr.faint { 0.6 } else { 1.0 }));
            self.ctx.set_text_baseline("alphabetic");
            self.ctx.set_text_align("left");
            let weight = if cell.attr.bold { "bold " } else { "" };
            let style = if cell.attr.italic { "italic " } else { "" };
            self.ctx.set_font(&format!("{style}{weight}{}px {}", metrics.font.size, metrics.font.family));
            let _ = self.ctx.fill_text(cell.symbol.as_str(), x, y + metrics.cell_baseline as f64);
        }
    }

    fn render_decorations(&self, attr: &termrender_core::CellAttr, x: f64, y: f64, w: f64, h: f64, fg: Rgba) {
        let thickness = (h * 0.08).round().max(1.0);

        match attr.underline {
            Underline::Single => self.fill_rect(x, y + h - thickness, w, thickness, fg),
            Underline::Double => {
                self.fill_rect(x, y + h - thickness, w, thickness, fg);
                self.fill_rect(x, y + h - thickness - (thickness + 2.0), w, thickness, fg);
            },
            Underline::None => {},
        }

        if attr.strikethrough {
            let mid_y = y + (h / 2.0).round() - (thickness / 2.0).floor();
            self.fill_rect(x, mid_y, w, thickness, fg);
        }
    }

    fn render_cursor(&self, state: &TerminalState, metrics: &Metrics, theme: &Theme, cell_w: f64, cell_h: f64) {
        let x = state.cursor.column as f64 * cell_w;
        let y = state.cursor.row as f64 * cell_h;
        let color = theme.cursor.color;
        let alpha = theme.cursor.opacity;

        match theme.cursor.shape {
            CursorShape::Block => self.fill_rect_alpha(x, y, cell_w, cell_h, color, alpha),
            CursorShape::Underline => {
                let height = (cell_h * 0.2).round().max(1.0);
                self.fill_rect_alpha(x, y + cell_h - height, cell_w, height, color, alpha);
            },
            CursorShape::Bar => {
                let width = (cell_w * 0.2).round().max(1.0);
                self.fill_rect_alpha(x, y, width, cell_h, color, alpha);
            },
        }
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        self.fill_rect_alpha(x, y, w, h, color, 1.0);
    }

    fn fill_rect_alpha(&self, x: f64, y: f64, w: f64, h: f64, color: Rgba, alpha: f32) {
        self.ctx.set_fill_style_str(&css_rgba(color, alpha));
        self.ctx.fill_rect(x, y, w, h);
    }
}

fn css_rgba(color: Rgba, alpha: f32) -> String {
    let a = (color.3 as f32 / 255.0) * alpha;
    format!("rgba({}, {}, {}, {a})", color.0, color.1, color.2)
}

fn selection_row_map(selection: Option<&Selection>, columns: u16) -> HashMap<u16, SelectionSegment> {
    let Some(selection) = selection else { return HashMap::new() };
    segments(selection, columns)
        .into_iter()
        .filter_map(|seg| (seg.row >= 0).then(|| (seg.row as u16, seg)))
        .collect()
}
