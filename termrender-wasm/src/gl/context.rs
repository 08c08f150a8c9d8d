use crate::gl::GL;

/// Manages simple WebGL state to reduce redundant state changes.
#[derive(Debug)]
pub struct GlState {
    viewport: [i32; 4],
    clear_color: [f32; 4],
    blend_func: (u32, u32),
    active_texture_unit: u32,
    enabled_vertex_attribs: Vec<bool>,
}

impl GlState {
    /// Create a new GlState with WebGL defaults.
    pub fn new(gl: &GL) -> Self {
        let max_vertex_attribs =
            gl.get_parameter(GL::MAX_VERTEX_ATTRIBS).unwrap().as_f64().unwrap() as usize;

        Self {
            viewport: [0, 0, 0, 0],
            clear_color: [0.0, 0.0, 0.0, 0.0],
            blend_func: (GL::ONE, GL::ZERO),
            active_texture_unit: GL::TEXTURE0,
            enabled_vertex_attribs: vec![false; max_vertex_attribs],
        }
    }

    pub fn viewport(&mut self, gl: &GL, x: i32, y: i32, width: i32, height: i32) -> &mut Self {
        let new_viewport = [x, y, width, height];
        if self.viewport != new_viewport {
            gl.viewport(x, y, width, height);
            self.viewport = new_viewport;
        }
        self
    }

    pub fn clear_color(&mut self, gl: &GL, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        let new_color = [r, g, b, a];
        if self.clear_color != new_color {
            gl.clear_color(r, g, b, a);
            self.clear_color = new_color;
        }
        self
    }

    pub fn blend_func(&mut self, gl: &GL, src: u32, dst: u32) -> &mut Self {
        if self.blend_func != (src, dst) {
            gl.blend_func(src, dst);
            self.blend_func = (src, dst);
        }
        self
    }

    pub fn active_texture(&mut self, gl: &GL, texture_unit: u32) -> &mut Self {
        if self.active_texture_unit != texture_unit {
            gl.active_texture(texture_unit);
            self.active_texture_unit = texture_unit;
        }
        self
    }

    pub fn vertex_attrib_array(&mut self, gl: &GL, index: u32, enable: bool) -> &mut Self {
        let idx = index as usize;
        if idx < self.enabled_vertex_attribs.len() && self.enabled_vertex_attribs[idx] != enable {
            if enable {
                gl.enable_vertex_attrib_array(index);
            } else {
                gl.disable_vertex_attrib_array(index);
            }
            self.enabled_vertex_attribs[idx] = enable;
        }
        self
    }

    /// Resets tracked capability/attribute state; viewport and clear color
    /// are left alone since they track the canvas, not a capability toggle.
    pub fn reset(&mut self, gl: &GL) {
        if self.blend_func != (GL::ONE, GL::ZERO) {
            gl.blend_func(GL::ONE, GL::ZERO);
            self.blend_func = (GL::ONE, GL::ZERO);
        }

        if self.active_texture_unit != GL::TEXTURE0 {
            gl.active_texture(GL::TEXTURE0);
            self.active_texture_unit = GL::TEXTURE0;
        }

        for (idx, enabled) in self.enabled_vertex_attribs.iter_mut().enumerate() {
            if *enabled {
                gl.disable_vertex_attrib_array(idx as u32);
                *enabled = false;
            }
        }
    }
}
