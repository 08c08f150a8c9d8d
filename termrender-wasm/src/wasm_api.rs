//! JavaScript-facing wrapper: flat setters build up a `TerminalState`
//! snapshot and enqueue the matching `TerminalUpdate`s; `flush()` hands both
//! to `Renderer::apply_updates` in one call.

use compact_str::CompactString;
use termrender_core::{
    Cell, CellAttr, ColorTag, CursorPos, CursorShape, CursorTheme, FontMetrics, Metrics, Rgba,
    Selection, SelectionKind, SelectionPoint, SelectionStatus, SelectionTheme, TerminalState,
    TerminalUpdate, Theme,
};
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::{
    backend::{BackendConfig, GpuFallback},
    js,
    renderer::{Renderer, RendererOptions},
    selection::selection_text,
};

const BOLD: u16 = 1 << 0;
const ITALIC: u16 = 1 << 1;
const UNDERLINE: u16 = 1 << 2;
const DOUBLE_UNDERLINE: u16 = 1 << 3;
const STRIKETHROUGH: u16 = 1 << 4;
const FAINT: u16 = 1 << 5;
const INVERSE: u16 = 1 << 6;
const HIDDEN: u16 = 1 << 7;

/// Style flags for [`CellStyle`].
#[wasm_bindgen]
#[derive(Debug, Default, Clone, Copy)]
pub struct CellStyle {
    bits: u16,
}

#[wasm_bindgen]
impl CellStyle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CellStyle {
        CellStyle { bits: 0 }
    }

    pub fn bold(mut self) -> CellStyle {
        self.bits |= BOLD;
        self
    }

    pub fn italic(mut self) -> CellStyle {
        self.bits |= ITALIC;
        self
    }

    pub fn underline(mut self) -> CellStyle {
        self.bits |= UNDERLINE;
        self
    }

    pub fn double_underline(mut self) -> CellStyle {
        self.bits |= DOUBLE_UNDERLINE;
        self
    }

    pub fn strikethrough(mut self) -> CellStyle {
        self.bits |= STRIKETHROUGH;
        self
    }

    pub fn faint(mut self) -> CellStyle {
        self.bits |= FAINT;
        self
    }

    pub fn inverse(mut self) -> CellStyle {
        self.bits |= INVERSE;
        self
    }

    pub fn hidden(mut self) -> CellStyle {
        self.bits |= HIDDEN;
        self
    }

    #[wasm_bindgen(getter)]
    pub fn bits(&self) -> u16 {
        self.bits
    }
}

fn attr_from_bits(bits: u16, fg: u32, bg: u32) -> CellAttr {
    CellAttr {
        bold: bits & BOLD != 0,
        faint: bits & FAINT != 0,
        italic: bits & ITALIC != 0,
        underline: if bits & DOUBLE_UNDERLINE != 0 {
            termrender_core::Underline::Double
        } else if bits & UNDERLINE != 0 {
            termrender_core::Underline::Single
        } else {
            termrender_core::Underline::None
        },
        strikethrough: bits & STRIKETHROUGH != 0,
        inverse: bits & INVERSE != 0,
        hidden: bits & HIDDEN != 0,
        foreground: color_tag_from_packed(fg),
        background: color_tag_from_packed(bg),
    }
}

/// Packed `0xAARRGGBB`; alpha `0x00` means "use the theme default" for that
/// channel (`ColorTag::Default`).
fn color_tag_from_packed(packed: u32) -> ColorTag {
    let a = (packed >> 24) as u8;
    if a == 0 {
        return ColorTag::Default;
    }
    let r = (packed >> 16) as u8;
    let g = (packed >> 8) as u8;
    let b = packed as u8;
    ColorTag::Rgb(r, g, b)
}

fn rgba_from_packed(packed: u32) -> Rgba {
    let r = (packed >> 16) as u8;
    let g = (packed >> 8) as u8;
    let b = packed as u8;
    Rgba::opaque(r, g, b)
}

fn parse_selection_kind(kind: &str) -> SelectionKind {
    match kind {
        "block" => SelectionKind::Block,
        _ => SelectionKind::Linear,
    }
}

fn parse_selection_status(status: &str) -> SelectionStatus {
    match status {
        "complete" => SelectionStatus::Complete,
        _ => SelectionStatus::InProgress,
    }
}

fn js_err(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// `"cpu-2d"` / `"gpu-webgl"` force a backend; anything else (e.g. `"auto"`)
/// leaves the choice to `detectPreferredBackend`.
fn parse_backend_config(value: &str) -> Option<BackendConfig> {
    match value {
        "cpu-2d" => Some(BackendConfig::Cpu2d),
        "gpu-webgl" => Some(BackendConfig::GpuWebgl),
        _ => None,
    }
}

fn parse_gpu_fallback(value: &str) -> GpuFallback {
    match value {
        "require-gpu" => GpuFallback::RequireGpu,
        "cpu-only" => GpuFallback::CpuOnly,
        _ => GpuFallback::PreferGpu,
    }
}

/// JavaScript-facing terminal renderer. Owns a `TerminalState` buffer built
/// up through the setters below and a queue of pending `TerminalUpdate`s;
/// `flush()` applies both in one call.
#[wasm_bindgen]
pub struct TermRenderer {
    renderer: Renderer,
    state: TerminalState,
    pending: Vec<TerminalUpdate>,
    selection_ts: u64,
}

#[wasm_bindgen]
impl TermRenderer {
    /// Creates a renderer attached to `canvas_selector`, with a blank
    /// `rows x columns` grid and the given font/device settings. Backend
    /// selection follows `detectPreferredBackend`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_selector: &str,
        rows: u16,
        columns: u16,
        font_family: String,
        font_size: f32,
        device_pixel_ratio: f32,
        backend: &str,
        gpu_fallback: &str,
    ) -> Result<TermRenderer, JsValue> {
        console_error_panic_hook::set_once();

        let canvas = js::get_canvas_by_id(canvas_selector).map_err(js_err)?;

        let font = FontMetrics {
            family: Box::leak(font_family.into_boxed_str()),
            size: font_size,
            letter_spacing: 0.0,
            line_height: 1.2,
        };
        let metrics = Metrics {
            device_pixel_ratio,
            cell_width: font_size * 0.6,
            cell_height: font_size * 1.2,
            cell_baseline: font_size,
            font,
        };

        let state = TerminalState::blank(rows, columns);
        let theme = Theme::default();

        let options = RendererOptions {
            backend: parse_backend_config(backend),
            gpu_fallback: parse_gpu_fallback(gpu_fallback),
            cursor_overlay: None,
        };

        let renderer = Renderer::new(canvas, metrics, theme, state.clone(), options).map_err(js_err)?;

        console::log_1(&"termrender renderer initialized".into());

        Ok(TermRenderer { renderer, state, pending: Vec::new(), selection_ts: 0 })
    }

    /// Updates a single cell in the local buffer and enqueues its damage.
    /// `fg`/`bg` are packed `0xAARRGGBB`; alpha `0` selects the theme
    /// default for that channel.
    pub fn update_cell(&mut self, row: u16, col: u16, symbol: &str, style: &CellStyle, fg: u32, bg: u32) {
        if row >= self.state.rows || col >= self.state.columns {
            return;
        }
        let attr = attr_from_bits(style.bits, fg, bg);
        self.state.buffer[row as usize][col as usize] = Cell::new(symbol, attr);
        self.pending.push(TerminalUpdate::Cells(vec![(row, col)]));
    }

    /// Writes `text` starting at `(row, col)`, one cell per character,
    /// clipping at the row boundary.
    pub fn write_text(&mut self, row: u16, col: u16, text: &str, style: &CellStyle, fg: u32, bg: u32) {
        if row >= self.state.rows {
            return;
        }
        let attr = attr_from_bits(style.bits, fg, bg);
        let mut touched = Vec::new();
        for (i, ch) in text.chars().enumerate() {
            let c = col + i as u16;
            if c >= self.state.columns {
                break;
            }
            self.state.buffer[row as usize][c as usize] = Cell::new(ch.to_string(), attr);
            touched.push((row, c));
        }
        if !touched.is_empty() {
            self.pending.push(TerminalUpdate::Cells(touched));
        }
    }

    pub fn set_cursor(&mut self, row: u16, col: u16) {
        let old = self.state.cursor;
        let new = CursorPos { row, column: col };
        self.state.cursor = new;
        self.pending.push(TerminalUpdate::Cursor { old, new });
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.state.cursor_visible = visible;
        self.pending.push(TerminalUpdate::CursorVisibility(visible));
    }

    pub fn clear_display(&mut self) {
        let blank = TerminalState::blank(self.state.rows, self.state.columns);
        self.state.buffer = blank.buffer;
        self.pending.push(TerminalUpdate::ClearDisplay);
    }

    pub fn clear_line(&mut self, row: u16) {
        if let Some(line) = self.state.buffer.get_mut(row as usize) {
            for cell in line.iter_mut() {
                *cell = Cell::blank();
            }
        }
        self.pending.push(TerminalUpdate::ClearLine(row));
    }

    pub fn clear_line_after_cursor(&mut self, row: u16, col: u16) {
        if let Some(line) = self.state.buffer.get_mut(row as usize) {
            for cell in line.iter_mut().skip(col as usize) {
                *cell = Cell::blank();
            }
        }
        self.pending.push(TerminalUpdate::ClearLineAfterCursor { row, col });
    }

    pub fn scroll(&mut self, amount: i32, top: u16, bottom: u16) {
        self.pending.push(TerminalUpdate::Scroll { amount, top, bottom });
    }

    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        self.state.scroll_top = top;
        self.state.scroll_bottom = bottom;
        self.pending.push(TerminalUpdate::ScrollRegion { top, bottom });
    }

    pub fn set_reverse_video(&mut self, enabled: bool) {
        self.state.reverse_video = enabled;
        self.pending.push(TerminalUpdate::Attributes);
    }

    pub fn set_palette_color(&mut self, index: u8, rgb: u32) {
        self.pending.push(TerminalUpdate::Palette { index, color: rgba_from_packed(rgb) });
    }

    pub fn set_selection(&mut self, anchor_row: i32, anchor_col: u16, focus_row: i32, focus_col: u16, kind: &str) {
        self.selection_ts += 1;
        let anchor = SelectionPoint { row: anchor_row as i64, column: anchor_col, ts: self.selection_ts };
        self.selection_ts += 1;
        let focus = SelectionPoint { row: focus_row as i64, column: focus_col, ts: self.selection_ts };
        let selection =
            Selection { anchor, focus, kind: parse_selection_kind(kind), status: SelectionStatus::InProgress };
        self.state.selection = Some(selection);
        self.pending.push(TerminalUpdate::SelectionSet(selection));
    }

    pub fn update_selection_focus(&mut self, focus_row: i32, focus_col: u16, status: &str) {
        let Some(mut selection) = self.state.selection else { return };
        self.selection_ts += 1;
        selection.focus = SelectionPoint { row: focus_row as i64, column: focus_col, ts: self.selection_ts };
        selection.status = parse_selection_status(status);
        self.state.selection = Some(selection);
        self.pending.push(TerminalUpdate::SelectionUpdate(selection));
    }

    pub fn clear_selection(&mut self) {
        self.state.selection = None;
        self.pending.push(TerminalUpdate::SelectionClear);
    }

    pub fn osc(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::Osc(CompactString::from(payload)));
    }

    pub fn sos_pm_apc(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::SosPmApc(CompactString::from(payload)));
    }

    pub fn dcs_start(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::DcsStart(CompactString::from(payload)));
    }

    pub fn dcs_data(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::DcsData(CompactString::from(payload)));
    }

    pub fn dcs_end(&mut self) {
        self.pending.push(TerminalUpdate::DcsEnd);
    }

    pub fn clipboard(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::Clipboard(CompactString::from(payload)));
    }

    pub fn title(&mut self, payload: &str) {
        self.pending.push(TerminalUpdate::Title(CompactString::from(payload)));
    }

    pub fn bell(&mut self) {
        self.pending.push(TerminalUpdate::Bell);
    }

    /// Applies all updates queued since the last `flush`. A no-op queue is still a no-op call, matching §8's
    /// invariant.
    pub fn flush(&mut self) -> Result<(), JsValue> {
        let updates = std::mem::take(&mut self.pending);
        self.renderer.apply_updates(self.state.clone(), &updates).map_err(js_err)
    }

    /// Resizes the canvas/terminal; forces a full
    /// rebuild. Keeps the current font/device-pixel-ratio, only replacing
    /// cell geometry and grid dimensions.
    pub fn resize(&mut self, rows: u16, columns: u16, cell_width: f32, cell_height: f32) -> Result<(), JsValue> {
        self.state.rows = rows;
        self.state.columns = columns;
        self.state.buffer.resize(rows as usize, vec![Cell::blank(); columns as usize]);
        for line in self.state.buffer.iter_mut() {
            line.resize(columns as usize, Cell::blank());
        }

        let mut new_metrics = *self.renderer.metrics();
        new_metrics.cell_width = cell_width;
        new_metrics.cell_height = cell_height;
        new_metrics.cell_baseline = cell_height * 0.8;

        self.renderer.resize(self.state.clone(), new_metrics).map_err(js_err)
    }

    /// Replaces the theme; clears palette
    /// overrides and forces a full rebuild.
    pub fn set_theme(
        &mut self,
        background: u32,
        foreground: u32,
        cursor_color: u32,
        cursor_opacity: f32,
        cursor_shape: &str,
    ) -> Result<(), JsValue> {
        let shape = match cursor_shape {
            "underline" => CursorShape::Underline,
            "bar" => CursorShape::Bar,
            _ => CursorShape::Block,
        };
        let theme = Theme {
            background: rgba_from_packed(background),
            foreground: rgba_from_packed(foreground),
            cursor: CursorTheme { color: rgba_from_packed(cursor_color), opacity: cursor_opacity, shape },
            selection: self.renderer.theme().selection,
            palette: self.renderer.theme().palette.clone(),
        };
        self.renderer.set_theme(theme).map_err(js_err)
    }

    /// Full rebuild from the current local buffer without any pending
    /// updates.
    pub fn sync(&mut self) -> Result<(), JsValue> {
        self.renderer.sync(self.state.clone()).map_err(js_err)
    }

    pub fn dispose(&mut self) {
        self.renderer.dispose();
    }

    #[wasm_bindgen(getter)]
    pub fn backend_tag(&self) -> String {
        self.renderer.backend_tag().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> u16 {
        self.state.rows
    }

    #[wasm_bindgen(getter)]
    pub fn columns(&self) -> u16 {
        self.state.columns
    }

    /// The text covered by the current selection, or `None` if there is no
    /// active selection.
    pub fn selected_text(&self, trim_trailing_whitespace: bool) -> Option<String> {
        self.state.selection.map(|sel| selection_text(&self.state, &sel, trim_trailing_whitespace))
    }

    #[wasm_bindgen(getter)]
    pub fn cells_processed(&self) -> u64 {
        self.renderer.diagnostics().cells_processed
    }

    #[wasm_bindgen(getter)]
    pub fn last_draw_call_count(&self) -> u32 {
        self.renderer.diagnostics().last_draw_call_count
    }

    #[wasm_bindgen(getter)]
    pub fn dirty_coverage(&self) -> Option<f32> {
        self.renderer.diagnostics().dirty_coverage
    }
}

/// Probes backend availability without constructing a renderer.
#[wasm_bindgen]
pub fn detect_preferred_backend(canvas_selector: &str) -> Result<String, JsValue> {
    let canvas = js::get_canvas_by_id(canvas_selector).map_err(js_err)?;
    let tag = match crate::backend::detect_preferred_backend(&canvas) {
        BackendConfig::GpuWebgl => "gpu-webgl",
        BackendConfig::Cpu2d => "cpu-2d",
    };
    Ok(tag.to_string())
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}
