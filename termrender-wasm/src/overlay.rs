//! Cursor overlay strategy. By default the cursor is part of
//! the background geometry each backend already draws; a host may instead
//! supply a pure function of `(snapshot, metrics, theme, selection)` that
//! paints to a surface the renderer owns, rebuilt and drawn every frame.

use termrender_core::{Metrics, Selection, TerminalState, Theme};

/// The drawing primitives an overlay strategy needs. `Cpu2dBackend` and a
/// dedicated overlay canvas both implement this directly against a
/// `CanvasRenderingContext2d`; the trait exists so overlay callbacks never
/// depend on which backend is active.
pub trait OverlaySurface {
    fn clear(&self);
    fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64, css_color: &str);
    fn fill_text(&self, text: &str, x: f64, y: f64, css_color: &str, css_font: &str);
}

/// A host-provided cursor overlay: invoked with the live snapshot once per
/// frame, writing to a surface the renderer owns. When set, the default
/// cursor quad is omitted from row geometry (the caller is responsible for
/// passing `include_cursor: false` to the row-geometry builder while an
/// overlay is installed).
pub type CursorOverlayStrategy =
    Box<dyn FnMut(&TerminalState, &Metrics, &Theme, Option<&Selection>, &dyn OverlaySurface)>;

/// An `OverlaySurface` backed directly by a 2D canvas context, shared by the
/// CPU backend (which already owns one) and the GPU backend's dedicated
/// offscreen overlay canvas.
pub(crate) struct CanvasOverlaySurface<'a> {
    ctx: &'a web_sys::CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl<'a> CanvasOverlaySurface<'a> {
    pub fn new(ctx: &'a web_sys::CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self { ctx, width, height }
    }
}

impl OverlaySurface for CanvasOverlaySurface<'_> {
    fn clear(&self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64, css_color: &str) {
        self.ctx.set_fill_style_str(css_color);
        self.ctx.fill_rect(x, y, width, height);
    }

    fn fill_text(&self, text: &str, x: f64, y: f64, css_color: &str, css_font: &str) {
        self.ctx.set_fill_style_str(css_color);
        self.ctx.set_font(css_font);
        self.ctx.set_text_baseline("alphabetic");
        self.ctx.set_text_align("left");
        let _ = self.ctx.fill_text(text, x, y);
    }
}
