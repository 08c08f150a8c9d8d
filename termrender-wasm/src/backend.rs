//! Backend selection: a tagged variant over the GPU and CPU draw paths, plus the
//! non-destructive capability probe the renderer facade runs at init.

use termrender_core::FontMetrics;
use web_sys::HtmlCanvasElement;

use crate::{cpu::Cpu2dBackend, error::Error, gl::GpuBackend, js};

/// Fallback policy when the GPU path fails to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuFallback {
    #[default]
    PreferGpu,
    RequireGpu,
    CpuOnly,
}

/// The backend configuration a host may request, or that
/// `detect_preferred_backend` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendConfig {
    Cpu2d,
    #[default]
    GpuWebgl,
}

/// Probes WebGL2 support without allocating any lasting resources; used by
/// `detect_preferred_backend` and by the facade's own init fallback.
fn webgl2_available(canvas: &HtmlCanvasElement) -> bool {
    js::get_webgl2_context(canvas).is_ok()
}

/// Non-destructive probe of the preferred backend for `canvas`.
pub fn detect_preferred_backend(canvas: &HtmlCanvasElement) -> BackendConfig {
    if webgl2_available(canvas) {
        BackendConfig::GpuWebgl
    } else {
        BackendConfig::Cpu2d
    }
}

/// The live backend a `Renderer` drives each frame, behind one tag.
pub(crate) enum Backend {
    Gpu(GpuBackend),
    Cpu(Cpu2dBackend),
}

impl Backend {
    /// Dataset tag advertised on the host canvas.
    pub fn tag(&self) -> &'static str {
        match self {
            Backend::Gpu(_) => "gpu-webgl",
            Backend::Cpu(_) => "cpu-2d",
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Backend::Gpu(_))
    }
}

/// Creates the backend named by `config`, honoring `fallback` when the GPU
/// path fails.
pub(crate) fn create_backend(
    canvas: &HtmlCanvasElement,
    config: BackendConfig,
    fallback: GpuFallback,
    font: &FontMetrics,
    device_pixel_ratio: f32,
) -> Result<Backend, Error> {
    match config {
        BackendConfig::Cpu2d => Ok(Backend::Cpu(Cpu2dBackend::new(canvas.clone())?)),
        BackendConfig::GpuWebgl => match try_create_gpu(canvas, font, device_pixel_ratio) {
            Ok(backend) => Ok(Backend::Gpu(backend)),
            Err(err) if fallback != GpuFallback::RequireGpu => {
                Cpu2dBackend::new(canvas.clone()).map(Backend::Cpu).map_err(|_| err)
            },
            Err(err) => Err(err),
        },
    }
}

fn try_create_gpu(canvas: &HtmlCanvasElement, font: &FontMetrics, device_pixel_ratio: f32) -> Result<GpuBackend, Error> {
    let gl = js::get_webgl2_context(canvas)?;
    GpuBackend::new(gl, font, device_pixel_ratio)
}
