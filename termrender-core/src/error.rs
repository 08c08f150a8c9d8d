/// Error categories surfaced by the platform-independent core.
///
/// GPU/DOM-specific failures (shader compile, context loss, ...) live in
/// `termrender-wasm::Error`, which wraps this type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The glyph atlas ran out of pages (exceeded the configured page cap).
    #[error("glyph atlas overflow: {0} pages exceeds the cap")]
    AtlasOverflow(u32),

    /// A glyph's rasterized size exceeds a single atlas page in either dimension.
    #[error("glyph too large for atlas page: {width}x{height}")]
    GlyphTooLarge { width: i32, height: i32 },

    /// A color string could not be parsed by `parse_css_color`.
    #[error("unsupported color string: {0}")]
    UnsupportedColor(String),
}
