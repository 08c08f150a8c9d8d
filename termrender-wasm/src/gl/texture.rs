use web_sys::{HtmlCanvasElement, WebGlTexture};

use crate::{error::Error, gl::GL};

/// A single growable RGBA8 2D texture backing the glyph atlas's first (and,
/// in practice, only) page. `termrender_core::GlyphAtlasLayout` models up to
/// `MAX_PAGES` pages so the packer can be exercised and unit-tested in
/// isolation, but one page sized to [`Texture::DEFAULT_SIZE`] comfortably
/// holds every glyph/style combination a terminal session is expected to
/// need; spilling into a second page surfaces as `Error::Core(AtlasOverflow)`
/// rather than silently rendering from the wrong page.
#[derive(Debug)]
pub(super) struct Texture {
    gl_texture: WebGlTexture,
    width: i32,
    height: i32,
}

impl Texture {
    pub const DEFAULT_SIZE: i32 = 2048;

    pub fn new(gl: &GL, width: i32, height: i32) -> Result<Self, Error> {
        let gl_texture = gl.create_texture().ok_or(Error::texture_creation_failed())?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&gl_texture));
        gl.tex_storage_2d(GL::TEXTURE_2D, 1, GL::RGBA8, width, height);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        gl.bind_texture(GL::TEXTURE_2D, None);

        Ok(Self { gl_texture, width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Uploads a rasterized glyph bitmap (an offscreen canvas) into the
    /// texture at `(x, y)`.
    pub fn upload_region(&self, gl: &GL, x: i32, y: i32, canvas: &HtmlCanvasElement) {
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.gl_texture));
        let _ = gl.tex_sub_image_2d_with_u32_and_u32_and_html_canvas_element(
            GL::TEXTURE_2D,
            0,
            x,
            y,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            canvas,
        );
        gl.bind_texture(GL::TEXTURE_2D, None);
    }

    pub fn bind(&self, gl: &GL, texture_unit: u32) {
        gl.active_texture(GL::TEXTURE0 + texture_unit);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.gl_texture));
    }

    pub fn delete(&self, gl: &GL) {
        gl.delete_texture(Some(&self.gl_texture));
    }
}
