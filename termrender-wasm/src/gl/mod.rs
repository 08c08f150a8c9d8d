mod atlas;
mod backend;
mod buffer;
mod context;
mod program;
mod texture;

pub(crate) use atlas::GpuGlyphAtlas;
pub(crate) use backend::GpuBackend;
use buffer::*;
pub(crate) use context::GlState;
pub(crate) use program::ShaderProgram;

pub(crate) type GL = web_sys::WebGl2RenderingContext;
