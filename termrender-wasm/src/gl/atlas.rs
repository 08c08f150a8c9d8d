use termrender_core::{FontMetrics, GlyphAtlasLayout, GlyphEntry, GlyphKey, PADDING};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::{error::Error, gl::texture::Texture, gl::GL, js};

/// Owns the GPU-side half of the glyph atlas: a packing layout (the pure,
/// platform-independent half lives in `termrender_core::atlas`), an
/// offscreen 2D canvas used to rasterize one glyph at a time, and the
/// texture those bitmaps get copied into.
#[derive(Debug)]
pub(crate) struct GpuGlyphAtlas {
    layout: GlyphAtlasLayout,
    texture: Texture,
    raster_canvas: HtmlCanvasElement,
    raster_ctx: CanvasRenderingContext2d,
    cell_width: i32,
    cell_height: i32,
}

impl GpuGlyphAtlas {
    pub fn new(gl: &GL, font: &FontMetrics, device_pixel_ratio: f32) -> Result<Self, Error> {
        let texture = Texture::new(gl, Texture::DEFAULT_SIZE, Texture::DEFAULT_SIZE)?;
        let layout = GlyphAtlasLayout::new(Texture::DEFAULT_SIZE, Texture::DEFAULT_SIZE);
        let (cell_width, cell_height) = cell_pixel_size(font, device_pixel_ratio);

        let raster_canvas = create_offscreen_canvas(cell_width + 2 * PADDING, cell_height + 2 * PADDING)?;
        let raster_ctx = js::get_2d_context(&raster_canvas)?;

        Ok(Self { layout, texture, raster_canvas, raster_ctx, cell_width, cell_height })
    }

    /// Resets packing and the raster canvas's size for a new cell geometry;
    /// does not reallocate the GPU texture.
    pub fn set_metrics(&mut self, font: &FontMetrics, device_pixel_ratio: f32) {
        self.layout.set_metrics(Texture::DEFAULT_SIZE, Texture::DEFAULT_SIZE);
        let (cw, ch) = cell_pixel_size(font, device_pixel_ratio);
        self.cell_width = cw;
        self.cell_height = ch;
        self.raster_canvas.set_width((cw + 2 * PADDING) as u32);
        self.raster_canvas.set_height((ch + 2 * PADDING) as u32);
    }

    pub fn cell_size(&self) -> (i32, i32) {
        (self.cell_width, self.cell_height)
    }

    pub fn bind(&self, gl: &GL, texture_unit: u32) {
        self.texture.bind(gl, texture_unit);
    }

    pub fn delete(&self, gl: &GL) {
        self.texture.delete(gl);
    }

    /// Rasterizes `key` if not already packed, uploads the bitmap, and
    /// returns its (cached, on repeat calls) atlas entry. Returns
    /// `termrender_core::Error` directly (rather than this crate's `Error`)
    /// so it can be passed straight as the `ensure_glyph` callback
    /// `build_row_geometry` expects; a glyph that would land on a second
    /// atlas page is reported as `AtlasOverflow`, since this backend is
    /// GPU-backed by a single growable page (see the module doc above).
    pub fn ensure_glyph(
        &mut self,
        gl: &GL,
        key: GlyphKey,
        font: &FontMetrics,
    ) -> Result<GlyphEntry, termrender_core::Error> {
        if let Some(entry) = self.layout.get(key) {
            return Ok(entry);
        }

        self.rasterize(key, font);

        let entry = self.layout.ensure_glyph(key, self.cell_width, self.cell_height, false)?;
        if entry.page != 0 {
            return Err(termrender_core::Error::AtlasOverflow(entry.page + 1));
        }

        let x = (entry.u0 * self.texture.width() as f32).round() as i32;
        let y = (entry.v0 * self.texture.height() as f32).round() as i32;
        self.texture.upload_region(gl, x, y, &self.raster_canvas);

        Ok(entry)
    }

    fn rasterize(&self, key: GlyphKey, font: &FontMetrics) {
        let ctx = &self.raster_ctx;
        let w = (self.cell_width + 2 * PADDING) as f64;
        let h = (self.cell_height + 2 * PADDING) as f64;

        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#ffffff");
        ctx.set_text_baseline("alphabetic");
        ctx.set_text_align("left");

        let weight = if key.bold { "bold " } else { "" };
        let style = if key.italic { "italic " } else { "" };
        ctx.set_font(&format!("{style}{weight}{}px {}", font.size, font.family));

        let baseline_y = PADDING as f64 + self.cell_height as f64 * 0.8;
        let mut buf = [0u8; 4];
        let symbol = key.codepoint.encode_utf8(&mut buf);
        let _ = ctx.fill_text(symbol, PADDING as f64, baseline_y);
    }
}

fn cell_pixel_size(font: &FontMetrics, device_pixel_ratio: f32) -> (i32, i32) {
    let size = font.size * device_pixel_ratio;
    let width = (size * 0.6).ceil() as i32;
    let height = (size * font.line_height).ceil() as i32;
    (width.max(1), height.max(1))
}

fn create_offscreen_canvas(width: i32, height: i32) -> Result<HtmlCanvasElement, Error> {
    use js_sys::wasm_bindgen::JsCast;

    let canvas = js::document()?
        .create_element("canvas")
        .map_err(|_| Error::element_creation_failed("canvas"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::element_creation_failed("canvas"))?;
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    Ok(canvas)
}
