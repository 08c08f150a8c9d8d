use js_sys::wasm_bindgen::JsCast;
use termrender_core::{FontMetrics, GlyphKey, RowSliceStore};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, WebGlBuffer, WebGlTexture, WebGlVertexArrayObject};

use crate::{
    error::Error,
    gl::{buffer_sub_upload_array, buffer_upload_array, context::GlState, program::ShaderProgram, GpuGlyphAtlas, GL},
    js,
    overlay::CanvasOverlaySurface,
};

/// Tracks, per pooled buffer, the byte-capacity last handed to the GPU so
/// `sync` can tell a `bufferData` reallocation from a cheaper
/// `bufferSubData` overwrite.
#[derive(Debug, Default, Clone, Copy)]
struct UploadedCapacity {
    floats: usize,
}

impl UploadedCapacity {
    fn sync(&mut self, gl: &GL, target: u32, capacity_floats: usize, data: &[f32]) -> bool {
        if capacity_floats > self.floats {
            buffer_upload_array(gl, target, data, GL::DYNAMIC_DRAW);
            self.floats = capacity_floats;
            true
        } else {
            buffer_sub_upload_array(gl, target, 0, data);
            false
        }
    }
}

struct QuadBuffers {
    vao: WebGlVertexArrayObject,
    positions: WebGlBuffer,
    colors: WebGlBuffer,
    positions_cap: UploadedCapacity,
    colors_cap: UploadedCapacity,
}

struct GlyphBuffers {
    vao: WebGlVertexArrayObject,
    positions: WebGlBuffer,
    texcoords: WebGlBuffer,
    colors: WebGlBuffer,
    positions_cap: UploadedCapacity,
    texcoords_cap: UploadedCapacity,
    colors_cap: UploadedCapacity,
}

/// Optional host-driven cursor overlay: a
/// full-viewport offscreen canvas whose pixels are uploaded to a texture
/// and drawn as a single passthrough-textured quad, last in the frame.
struct OverlayResources {
    program: ShaderProgram,
    sampler_loc: web_sys::WebGlUniformLocation,
    vao: WebGlVertexArrayObject,
    texture: WebGlTexture,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: i32,
    height: i32,
}

/// The WebGL2 draw path: two programs (flat-color quads for backgrounds,
/// decorations and the cursor; textured quads for glyphs) drawing directly
/// from `RowSliceStore`'s pooled clip-space buffers. Uses plain (non-instanced)
/// quads since row geometry already carries six explicit vertices per cell.
pub(crate) struct GpuBackend {
    gl: GL,
    state: GlState,
    quad_program: ShaderProgram,
    glyph_program: ShaderProgram,
    glyph_sampler_loc: web_sys::WebGlUniformLocation,
    quad: QuadBuffers,
    glyph: GlyphBuffers,
    atlas: GpuGlyphAtlas,
    bg_vertex_count: i32,
    glyph_vertex_count: i32,
    overlay: Option<OverlayResources>,
}

impl GpuBackend {
    const QUAD_VERT: &'static str = include_str!("../shaders/quad.vert");
    const QUAD_FRAG: &'static str = include_str!("../shaders/quad.frag");
    const GLYPH_VERT: &'static str = include_str!("../shaders/glyph.vert");
    const GLYPH_FRAG: &'static str = include_str!("../shaders/glyph.frag");
    const OVERLAY_VERT: &'static str = include_str!("../shaders/overlay.vert");
    const OVERLAY_FRAG: &'static str = include_str!("../shaders/overlay.frag");

    pub fn new(gl: GL, font: &FontMetrics, device_pixel_ratio: f32) -> Result<Self, Error> {
        let state = GlState::new(&gl);

        let quad_program = ShaderProgram::create(&gl, Self::QUAD_VERT, Self::QUAD_FRAG)?;
        let glyph_program = ShaderProgram::create(&gl, Self::GLYPH_VERT, Self::GLYPH_FRAG)?;
        glyph_program.use_program(&gl);
        let glyph_sampler_loc = glyph_program.uniform_location(&gl, "u_atlas")?;

        let quad = create_quad_buffers(&gl)?;
        let glyph = create_glyph_buffers(&gl)?;
        let atlas = GpuGlyphAtlas::new(&gl, font, device_pixel_ratio)?;

        Ok(Self {
            gl,
            state,
            quad_program,
            glyph_program,
            glyph_sampler_loc,
            quad,
            glyph,
            atlas,
            bg_vertex_count: 0,
            glyph_vertex_count: 0,
            overlay: None,
        })
    }

    pub fn gl(&self) -> &GL {
        &self.gl
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.state.viewport(&self.gl, 0, 0, width, height);
    }

    pub fn set_metrics(&mut self, font: &FontMetrics, device_pixel_ratio: f32) {
        self.atlas.set_metrics(font, device_pixel_ratio);
    }

    pub fn cell_size(&self) -> (i32, i32) {
        self.atlas.cell_size()
    }

    /// Rasterizes (if needed) and returns the atlas entry for `key`; this is
    /// the closure `build_row_geometry` is driven with.
    pub fn ensure_glyph(
        &mut self,
        key: GlyphKey,
        font: &FontMetrics,
    ) -> Result<termrender_core::GlyphEntry, termrender_core::Error> {
        self.atlas.ensure_glyph(&self.gl, key, font)
    }

    /// Uploads the full contents of `store`'s five pooled buffers, growing
    /// GPU buffers only when the store's own tracked capacity grew.
    pub fn sync(&mut self, store: &RowSliceStore) {
        let gl = &self.gl;

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.quad.positions));
        self.quad.positions_cap.sync(gl, GL::ARRAY_BUFFER, store.bg_positions().capacity(), store.bg_positions().as_slice());

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.quad.colors));
        self.quad.colors_cap.sync(gl, GL::ARRAY_BUFFER, store.bg_colors().capacity(), store.bg_colors().as_slice());

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.glyph.positions));
        self.glyph.positions_cap.sync(
            gl,
            GL::ARRAY_BUFFER,
            store.glyph_positions().capacity(),
            store.glyph_positions().as_slice(),
        );

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.glyph.texcoords));
        self.glyph.texcoords_cap.sync(
            gl,
            GL::ARRAY_BUFFER,
            store.glyph_texcoords().capacity(),
            store.glyph_texcoords().as_slice(),
        );

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.glyph.colors));
        self.glyph.colors_cap.sync(gl, GL::ARRAY_BUFFER, store.glyph_colors().capacity(), store.glyph_colors().as_slice());

        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        self.bg_vertex_count = store.total_background_vertex_count() as i32;
        self.glyph_vertex_count = store.total_glyph_vertex_count() as i32;
    }

    /// Installs the full-viewport overlay canvas/texture, replacing any
    /// existing one (e.g. after a resize). A no-op resize-in-place when an
    /// overlay of the same dimensions already exists.
    pub fn enable_overlay(&mut self, width: i32, height: i32) -> Result<(), Error> {
        if let Some(existing) = &self.overlay {
            if existing.width == width && existing.height == height {
                return Ok(());
            }
        }

        let gl = &self.gl;
        let program = ShaderProgram::create(gl, Self::OVERLAY_VERT, Self::OVERLAY_FRAG)?;
        program.use_program(gl);
        let sampler_loc = program.uniform_location(gl, "u_overlay")?;

        let vao = gl.create_vertex_array().ok_or(Error::vertex_array_creation_failed())?;
        gl.bind_vertex_array(Some(&vao));

        let quad_buf = gl.create_buffer().ok_or(Error::buffer_creation_failed("overlay-positions"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&quad_buf));
        #[rustfmt::skip]
        let positions: [f32; 12] = [
            -1.0, -1.0,  -1.0, 1.0,  1.0, -1.0,
             1.0, -1.0,  -1.0, 1.0,  1.0, 1.0,
        ];
        buffer_upload_array(gl, GL::ARRAY_BUFFER, &positions, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(attrib::POSITION);
        gl.vertex_attrib_pointer_with_i32(attrib::POSITION, 2, GL::FLOAT, false, 0, 0);

        let tex_buf = gl.create_buffer().ok_or(Error::buffer_creation_failed("overlay-texcoords"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&tex_buf));
        #[rustfmt::skip]
        let texcoords: [f32; 12] = [
            0.0, 1.0,  0.0, 0.0,  1.0, 1.0,
            1.0, 1.0,  0.0, 0.0,  1.0, 0.0,
        ];
        buffer_upload_array(gl, GL::ARRAY_BUFFER, &texcoords, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(attrib::TEXCOORD);
        gl.vertex_attrib_pointer_with_i32(attrib::TEXCOORD, 2, GL::FLOAT, false, 0, 0);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        let texture = gl.create_texture().ok_or(Error::texture_creation_failed())?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
        gl.tex_storage_2d(GL::TEXTURE_2D, 1, GL::RGBA8, width, height);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.bind_texture(GL::TEXTURE_2D, None);

        let canvas = js::document()?
            .create_element("canvas")
            .map_err(|_| Error::element_creation_failed("canvas"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::element_creation_failed("canvas"))?;
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let ctx = js::get_2d_context(&canvas)?;

        if let Some(old) = self.overlay.take() {
            gl.delete_texture(Some(&old.texture));
            gl.delete_vertex_array(Some(&old.vao));
        }

        self.overlay = Some(OverlayResources { program, sampler_loc, vao, texture, canvas, ctx, width, height });
        Ok(())
    }

    pub fn disable_overlay(&mut self) {
        if let Some(old) = self.overlay.take() {
            self.gl.delete_texture(Some(&old.texture));
            self.gl.delete_vertex_array(Some(&old.vao));
        }
    }

    /// The drawing surface a cursor-overlay strategy paints into; `None`
    /// until `enable_overlay` has been called.
    pub fn overlay_surface(&self) -> Option<CanvasOverlaySurface<'_>> {
        self.overlay.as_ref().map(|o| CanvasOverlaySurface::new(&o.ctx, o.width as f64, o.height as f64))
    }

    /// Copies the overlay canvas's current pixels to its texture; call once
    /// after the host's overlay strategy has painted this frame.
    pub fn upload_overlay(&self) {
        let Some(overlay) = &self.overlay else { return };
        let gl = &self.gl;
        gl.bind_texture(GL::TEXTURE_2D, Some(&overlay.texture));
        let _ = gl.tex_sub_image_2d_with_u32_and_u32_and_html_canvas_element(
            GL::TEXTURE_2D,
            0,
            0,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &overlay.canvas,
        );
        gl.bind_texture(GL::TEXTURE_2D, None);
    }

    /// Draws one full frame: clear, flat-color quads, then textured glyphs.
    pub fn render(&mut self, clear_color: termrender_core::Rgba) {
        let gl = &self.gl;
        let (r, g, b, a) = (
            clear_color.0 as f32 / 255.0,
            clear_color.1 as f32 / 255.0,
            clear_color.2 as f32 / 255.0,
            clear_color.3 as f32 / 255.0,
        );
        self.state.clear_color(gl, r, g, b, a);
        gl.clear(GL::COLOR_BUFFER_BIT);

        gl.enable(GL::BLEND);
        self.state.blend_func(gl, GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        if self.bg_vertex_count > 0 {
            self.quad_program.use_program(gl);
            gl.bind_vertex_array(Some(&self.quad.vao));
            gl.draw_arrays(GL::TRIANGLES, 0, self.bg_vertex_count);
        }

        if self.glyph_vertex_count > 0 {
            self.glyph_program.use_program(gl);
            gl.bind_vertex_array(Some(&self.glyph.vao));
            self.atlas.bind(gl, 0);
            gl.uniform1i(Some(&self.glyph_sampler_loc), 0);
            gl.draw_arrays(GL::TRIANGLES, 0, self.glyph_vertex_count);
        }

        if let Some(overlay) = &self.overlay {
            overlay.program.use_program(gl);
            gl.bind_vertex_array(Some(&overlay.vao));
            self.state.active_texture(gl, GL::TEXTURE0 + 1);
            gl.bind_texture(GL::TEXTURE_2D, Some(&overlay.texture));
            gl.uniform1i(Some(&overlay.sampler_loc), 1);
            gl.draw_arrays(GL::TRIANGLES, 0, 6);
        }

        gl.bind_vertex_array(None);
    }

    pub fn dispose(&mut self) {
        let gl = &self.gl;
        gl.delete_buffer(Some(&self.quad.positions));
        gl.delete_buffer(Some(&self.quad.colors));
        gl.delete_buffer(Some(&self.glyph.positions));
        gl.delete_buffer(Some(&self.glyph.texcoords));
        gl.delete_buffer(Some(&self.glyph.colors));
        gl.delete_vertex_array(Some(&self.quad.vao));
        gl.delete_vertex_array(Some(&self.glyph.vao));
        self.atlas.delete(gl);
        if let Some(overlay) = self.overlay.take() {
            gl.delete_texture(Some(&overlay.texture));
            gl.delete_vertex_array(Some(&overlay.vao));
        }
    }
}

mod attrib {
    pub const POSITION: u32 = 0;
    pub const TEXCOORD: u32 = 1;
    pub const COLOR_AT_1: u32 = 1;
    pub const COLOR_AT_2: u32 = 2;
}

fn create_quad_buffers(gl: &GL) -> Result<QuadBuffers, Error> {
    let vao = gl.create_vertex_array().ok_or(Error::vertex_array_creation_failed())?;
    gl.bind_vertex_array(Some(&vao));

    let positions = gl.create_buffer().ok_or(Error::buffer_creation_failed("quad-positions"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&positions));
    gl.enable_vertex_attrib_array(attrib::POSITION);
    gl.vertex_attrib_pointer_with_i32(attrib::POSITION, 2, GL::FLOAT, false, 0, 0);

    let colors = gl.create_buffer().ok_or(Error::buffer_creation_failed("quad-colors"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&colors));
    gl.enable_vertex_attrib_array(attrib::COLOR_AT_1);
    gl.vertex_attrib_pointer_with_i32(attrib::COLOR_AT_1, 4, GL::FLOAT, false, 0, 0);

    gl.bind_vertex_array(None);
    gl.bind_buffer(GL::ARRAY_BUFFER, None);

    Ok(QuadBuffers {
        vao,
        positions,
        colors,
        positions_cap: UploadedCapacity::default(),
        colors_cap: UploadedCapacity::default(),
    })
}

fn create_glyph_buffers(gl: &GL) -> Result<GlyphBuffers, Error> {
    let vao = gl.create_vertex_array().ok_or(Error::vertex_array_creation_failed())?;
    gl.bind_vertex_array(Some(&vao));

    let positions = gl.create_buffer().ok_or(Error::buffer_creation_failed("glyph-positions"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&positions));
    gl.enable_vertex_attrib_array(attrib::POSITION);
    gl.vertex_attrib_pointer_with_i32(attrib::POSITION, 2, GL::FLOAT, false, 0, 0);

    let texcoords = gl.create_buffer().ok_or(Error::buffer_creation_failed("glyph-texcoords"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&texcoords));
    gl.enable_vertex_attrib_array(attrib::TEXCOORD);
    gl.vertex_attrib_pointer_with_i32(attrib::TEXCOORD, 2, GL::FLOAT, false, 0, 0);

    let colors = gl.create_buffer().ok_or(Error::buffer_creation_failed("glyph-colors"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&colors));
    gl.enable_vertex_attrib_array(attrib::COLOR_AT_2);
    gl.vertex_attrib_pointer_with_i32(attrib::COLOR_AT_2, 4, GL::FLOAT, false, 0, 0);

    gl.bind_vertex_array(None);
    gl.bind_buffer(GL::ARRAY_BUFFER, None);

    Ok(GlyphBuffers {
        vao,
        positions,
        texcoords,
        colors,
        positions_cap: UploadedCapacity::default(),
        texcoords_cap: UploadedCapacity::default(),
        colors_cap: UploadedCapacity::default(),
    })
}
