mod backend;
mod cpu;
mod error;
mod gl;
pub(crate) mod js;
mod mouse;
mod overlay;
mod renderer;
mod selection;
mod wasm_api;

pub use backend::{detect_preferred_backend, BackendConfig, GpuFallback};
pub use cpu::Cpu2dBackend;
pub use error::Error;
pub use mouse::{
    DefaultSelectionHandler, MouseDimensions, MouseEventCallback, TerminalMouseEvent,
    TerminalMouseHandler,
};
pub use overlay::{CursorOverlayStrategy, OverlaySurface};
pub use renderer::{Renderer, RendererOptions};
pub use selection::selection_text;
pub use wasm_api::{CellStyle, TermRenderer};

#[cfg(test)]
mod tests {
    use termrender_core::{Metrics, Theme};

    #[test]
    fn theme_and_metrics_defaults_are_constructible() {
        let _ = Theme::default();
        let _ = Metrics::default();
    }
}
