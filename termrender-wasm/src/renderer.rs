//! Renderer facade: the single entry point a host drives
//! with `apply_updates`/`resize`/`set_theme`/`sync`/`dispose`, dispatching to
//! whichever backend (`gl::GpuBackend` or `cpu::Cpu2dBackend`) is live.

use std::collections::HashMap;

use termrender_core::{
    build_row_geometry, classify_update, segments, DcsFragment, Diagnostics, DirtyMode, DirtyTracker,
    GlyphKey, Metrics, Rgba, RowSliceStore, ScrollOutcome, Selection, SelectionTheme, TerminalState,
    TerminalUpdate, Theme,
};
use web_sys::HtmlCanvasElement;

use crate::{
    backend::{create_backend, Backend, BackendConfig, GpuFallback},
    error::Error,
    overlay::CursorOverlayStrategy,
};

/// Initialization options beyond the required `(canvas, metrics, theme,
/// snapshot)` tuple.
#[derive(Default)]
pub struct RendererOptions {
    pub backend: Option<BackendConfig>,
    pub gpu_fallback: GpuFallback,
    pub cursor_overlay: Option<CursorOverlayStrategy>,
}

/// The public facade over both backends; owns every piece of renderer state
/// named in "Renderer-owned state".
pub struct Renderer {
    canvas: HtmlCanvasElement,
    backend: Backend,
    disposed: bool,

    state: TerminalState,
    metrics: Metrics,
    theme: Theme,
    palette_overrides: HashMap<u8, Rgba>,

    dirty: DirtyTracker,
    store: RowSliceStore,

    diagnostics: Diagnostics,
    current_selection: Option<Selection>,
    on_selection_change: Option<Box<dyn FnMut(Option<&Selection>)>>,
    cursor_overlay: Option<CursorOverlayStrategy>,

    pending_dcs: String,
}

impl Renderer {
    pub fn new(
        canvas: HtmlCanvasElement,
        metrics: Metrics,
        theme: Theme,
        snapshot: TerminalState,
        options: RendererOptions,
    ) -> Result<Self, Error> {
        let config = options.backend.unwrap_or_else(|| crate::backend::detect_preferred_backend(&canvas));
        let backend = create_backend(&canvas, config, options.gpu_fallback, &metrics.font, metrics.device_pixel_ratio)?;

        canvas
            .dataset()
            .set("backend", backend.tag())
            .map_err(|_| Error::Initialization("failed to tag canvas with backend".to_string()))?;

        let rows = snapshot.rows;
        let current_selection = snapshot.selection;

        let mut renderer = Self {
            canvas,
            backend,
            disposed: false,
            state: snapshot,
            metrics,
            theme,
            palette_overrides: HashMap::new(),
            dirty: DirtyTracker::new(),
            store: RowSliceStore::new(rows),
            diagnostics: Diagnostics::default(),
            current_selection,
            on_selection_change: None,
            cursor_overlay: options.cursor_overlay,
            pending_dcs: String::new(),
        };

        renderer.full_rebuild()?;
        Ok(renderer)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn current_selection(&self) -> Option<&Selection> {
        self.current_selection.as_ref()
    }

    pub fn set_on_selection_change(&mut self, listener: Box<dyn FnMut(Option<&Selection>)>) {
        self.on_selection_change = Some(listener);
    }

    pub fn backend_tag(&self) -> &'static str {
        self.backend.tag()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// `applyUpdates`.
    pub fn apply_updates(&mut self, snapshot: TerminalState, updates: &[TerminalUpdate]) -> Result<(), Error> {
        self.require_live()?;

        if updates.is_empty() {
            self.state = snapshot;
            return Ok(());
        }

        let columns = snapshot.columns;
        let mut selection_changed = false;
        let mut scroll_request = None;

        for update in updates {
            let damage =
                classify_update(&mut self.dirty, &self.state, columns, &mut self.palette_overrides, update);

            if damage.selection_changed {
                selection_changed = true;
            }
            if let Some(scroll) = damage.scroll {
                scroll_request = Some(scroll);
            }
            if let Some(frag) = damage.dcs_fragment {
                match frag {
                    DcsFragment::Start(s) => self.pending_dcs = s.to_string(),
                    DcsFragment::Data(s) => self.pending_dcs.push_str(&s),
                    DcsFragment::End => self.diagnostics.pending_dcs = Some(self.pending_dcs.clone().into()),
                }
            }
            if let Some(osc) = damage.osc {
                self.diagnostics.last_osc = Some(osc);
            }
            if let Some(s) = damage.sos_pm_apc {
                self.diagnostics.last_sos_pm_apc = Some(s);
            }
        }

        self.state = snapshot;
        self.current_selection = self.state.selection;

        if let Some((amount, top, bottom)) = scroll_request {
            self.try_scroll_translation(amount, top, bottom)?;
        }

        let result = self.dirty.consume(self.state.rows, self.state.columns);
        match result.mode {
            DirtyMode::None => {},
            DirtyMode::Full => self.full_rebuild()?,
            DirtyMode::Partial => {
                for &row in result.rows.keys() {
                    self.rebuild_row(row)?;
                }
            },
        }

        self.diagnostics.cells_processed += result.cells;
        self.diagnostics.dirty_coverage = result.coverage;

        self.upload_and_draw()?;

        if selection_changed {
            if let Some(listener) = &mut self.on_selection_change {
                listener(self.current_selection.as_ref());
            }
        }

        Ok(())
    }

    /// `resize`.
    pub fn resize(&mut self, snapshot: TerminalState, metrics: Metrics) -> Result<(), Error> {
        self.require_live()?;
        self.metrics = metrics;
        self.state = snapshot;
        self.canvas.set_width((self.state.columns as f32 * self.metrics.cell_width) as u32);
        self.canvas.set_height((self.state.rows as f32 * self.metrics.cell_height) as u32);

        if let Backend::Gpu(gpu) = &mut self.backend {
            gpu.resize(self.canvas.width() as i32, self.canvas.height() as i32);
            gpu.set_metrics(&self.metrics.font, self.metrics.device_pixel_ratio);
            if self.cursor_overlay.is_some() {
                gpu.enable_overlay(self.canvas.width() as i32, self.canvas.height() as i32)?;
            }
        } else if let Backend::Cpu(cpu) = &mut self.backend {
            cpu.resize(self.canvas.width(), self.canvas.height());
        }

        self.store = RowSliceStore::new(self.state.rows);
        self.dirty.mark_full();
        self.full_rebuild()
    }

    /// `setTheme`.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), Error> {
        self.require_live()?;
        self.theme = theme;
        self.palette_overrides.clear();
        self.dirty.mark_full();
        self.full_rebuild()
    }

    /// `sync`.
    pub fn sync(&mut self, snapshot: TerminalState) -> Result<(), Error> {
        self.require_live()?;
        self.state = snapshot;
        self.current_selection = self.state.selection;
        self.full_rebuild()
    }

    /// `dispose`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Backend::Gpu(gpu) = &mut self.backend {
            gpu.dispose();
        }
        self.disposed = true;
    }

    fn require_live(&self) -> Result<(), Error> {
        if self.disposed {
            Err(Error::RendererDisposed)
        } else {
            Ok(())
        }
    }

    fn try_scroll_translation(&mut self, amount: i32, top: u16, bottom: u16) -> Result<(), Error> {
        match self.store.apply_scroll_translation(amount, self.state.rows, top, bottom) {
            ScrollOutcome::Translated { rebuilt_rows } => {
                for row in rebuilt_rows {
                    self.dirty.mark_row(row);
                }
            },
            ScrollOutcome::NotApplicable => {
                self.dirty.mark_full();
            },
        }
        Ok(())
    }

    fn full_rebuild(&mut self) -> Result<(), Error> {
        self.store = RowSliceStore::new(self.state.rows);
        for row in 0..self.state.rows {
            self.rebuild_row(row)?;
        }
        self.upload_and_draw()
    }

    fn rebuild_row(&mut self, row: u16) -> Result<(), Error> {
        let segment = self
            .current_selection
            .as_ref()
            .and_then(|sel| segments(sel, self.state.columns).into_iter().find(|s| s.row == row as i64));

        let selection_theme: Option<SelectionTheme> = self.theme.selection;
        let include_cursor = self.cursor_overlay.is_none();

        let (fallback_fg, fallback_bg) = if self.state.reverse_video {
            (self.theme.background, self.theme.foreground)
        } else {
            (self.theme.foreground, self.theme.background)
        };

        let geo = match &mut self.backend {
            Backend::Gpu(gpu) => {
                let font = self.metrics.font;
                build_row_geometry(
                    &self.state,
                    row,
                    &self.metrics,
                    &self.theme,
                    &self.palette_overrides,
                    |key: GlyphKey| gpu.ensure_glyph(key, &font),
                    fallback_fg,
                    fallback_bg,
                    segment,
                    selection_theme.as_ref(),
                    include_cursor,
                )
                .map_err(Error::Core)?
            },
            Backend::Cpu(_) => return Ok(()),
        };

        self.store.update_row(row, &geo);
        Ok(())
    }

    fn upload_and_draw(&mut self) -> Result<(), Error> {
        match &mut self.backend {
            Backend::Gpu(gpu) => {
                gpu.sync(&self.store);

                if let Some(strategy) = &mut self.cursor_overlay {
                    gpu.enable_overlay(self.canvas.width() as i32, self.canvas.height() as i32)?;
                    if let Some(surface) = gpu.overlay_surface() {
                        surface.clear();
                        strategy(&self.state, &self.metrics, &self.theme, self.current_selection.as_ref(), &surface);
                    }
                    gpu.upload_overlay();
                }

                gpu.render(self.theme.background);
                self.diagnostics.last_draw_call_count = 2;
            },
            Backend::Cpu(cpu) => {
                let selection_theme = self.theme.selection;
                let diag = cpu.render(
                    &self.state,
                    &self.metrics,
                    &self.theme,
                    &self.palette_overrides,
                    self.current_selection.as_ref(),
                    selection_theme.as_ref(),
                );
                self.diagnostics.last_draw_call_count = diag.last_draw_call_count;
                self.diagnostics.dirty_coverage = diag.dirty_coverage;
            },
        }
        Ok(())
    }
}
