/// A packed RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTheme {
    pub color: Rgba,
    pub opacity: f32,
    pub shape: CursorShape,
}

impl Default for CursorTheme {
    fn default() -> Self {
        Self { color: Rgba::opaque(255, 255, 255), opacity: 1.0, shape: CursorShape::Block }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionTheme {
    pub background: Option<Rgba>,
    pub foreground: Option<Rgba>,
}

/// The 16 base ANSI colors plus up to 240 extended palette entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub ansi: [Rgba; 16],
    pub extended: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        #[rustfmt::skip]
        let ansi = [
            Rgba::opaque(0, 0, 0),       Rgba::opaque(205, 49, 49),
            Rgba::opaque(13, 188, 121),  Rgba::opaque(229, 229, 16),
            Rgba::opaque(36, 114, 200),  Rgba::opaque(188, 63, 188),
            Rgba::opaque(17, 168, 205),  Rgba::opaque(229, 229, 229),
            Rgba::opaque(102, 102, 102), Rgba::opaque(241, 76, 76),
            Rgba::opaque(35, 209, 139),  Rgba::opaque(245, 245, 67),
            Rgba::opaque(59, 142, 234),  Rgba::opaque(214, 112, 214),
            Rgba::opaque(41, 184, 219),  Rgba::opaque(255, 255, 255),
        ];
        Self { ansi, extended: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Rgba,
    pub foreground: Rgba,
    pub cursor: CursorTheme,
    pub selection: Option<SelectionTheme>,
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::opaque(16, 16, 16),
            foreground: Rgba::opaque(229, 229, 229),
            cursor: CursorTheme::default(),
            selection: None,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub family: &'static str,
    pub size: f32,
    pub letter_spacing: f32,
    pub line_height: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self { family: "monospace", size: 14.0, letter_spacing: 0.0, line_height: 1.2 }
    }
}

/// Device/cell/font sizing in CSS pixels, as configured by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub device_pixel_ratio: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub cell_baseline: f32,
    pub font: FontMetrics,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            cell_width: 9.0,
            cell_height: 17.0,
            cell_baseline: 13.0,
            font: FontMetrics::default(),
        }
    }
}
