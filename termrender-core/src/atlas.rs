//! Glyph-atlas packing: growable pages with an explicit packing cursor.
//! Rasterization and texture upload are backend concerns
//! (`termrender-wasm::gl::atlas`); this module only decides *where* a glyph
//! lives once rasterized.

use std::collections::HashMap;

use unicode_width::UnicodeWidthChar;

use crate::error::Error;

/// A page is square; at least this many CSS pixels per side.
pub const MIN_PAGE_SIZE: i32 = 1024;
/// Space reserved around each glyph's rasterized bitmap.
pub const PADDING: i32 = 1;
/// Maximum number of pages before `ensure_glyph` fails with `AtlasOverflow`.
pub const MAX_PAGES: u32 = 8;

/// A glyph identity: one codepoint (never a combining cluster) tagged with
/// style and tagged with whether it's a double-width East-Asian glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub codepoint: char,
    pub bold: bool,
    pub italic: bool,
    pub wide: bool,
}

impl GlyphKey {
    pub fn new(codepoint: char, bold: bool, italic: bool) -> Self {
        let wide = codepoint.width().map(|w| w >= 2).unwrap_or(false);
        Self { codepoint, bold, italic, wide }
    }
}

/// Where a glyph lives in the atlas, in UV coordinates normalized to the
/// page's dimensions. Once returned, immutable for the atlas metrics'
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphEntry {
    pub page: u32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub width: i32,
    pub height: i32,
    pub padding: i32,
    pub is_color: bool,
}

#[derive(Debug, Clone, Copy)]
struct PackCursor {
    x: i32,
    y: i32,
    row_height: i32,
}

impl PackCursor {
    const ZERO: PackCursor = PackCursor { x: 0, y: 0, row_height: 0 };
}

/// Packing state for one page: a reset-on-`set_metrics` cursor. Texture
/// backing (if any) is owned by the backend and is not reallocated when
/// the cursor resets.
#[derive(Debug, Clone, Copy)]
struct Page {
    cursor: PackCursor,
}

/// The pure packing half of the glyph atlas: decides UV rectangles for
/// `(codepoint, bold, italic)` keys, growing pages up to `MAX_PAGES`.
#[derive(Debug)]
pub struct GlyphAtlasLayout {
    page_width: i32,
    page_height: i32,
    pages: Vec<Page>,
    entries: HashMap<GlyphKey, GlyphEntry>,
}

impl GlyphAtlasLayout {
    pub fn new(page_width: i32, page_height: i32) -> Self {
        let page_width = page_width.max(MIN_PAGE_SIZE);
        let page_height = page_height.max(MIN_PAGE_SIZE);
        Self { page_width, page_height, pages: vec![Page { cursor: PackCursor::ZERO }], entries: HashMap::new() }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Clears all entries and resets every page's packing cursor to the
    /// origin; called when metrics (and therefore glyph dimensions) change.
    pub fn set_metrics(&mut self, page_width: i32, page_height: i32) {
        self.page_width = page_width.max(MIN_PAGE_SIZE);
        self.page_height = page_height.max(MIN_PAGE_SIZE);
        self.entries.clear();
        for page in &mut self.pages {
            page.cursor = PackCursor::ZERO;
        }
    }

    pub fn get(&self, key: GlyphKey) -> Option<GlyphEntry> {
        self.entries.get(&key).copied()
    }

    /// Packs a new glyph of size `(glyph_width, glyph_height)` (without
    /// padding) into the atlas, returning its entry. Repeated calls with
    /// the same key return the cached entry.
    pub fn ensure_glyph(
        &mut self,
        key: GlyphKey,
        glyph_width: i32,
        glyph_height: i32,
        is_color: bool,
    ) -> Result<GlyphEntry, Error> {
        if let Some(entry) = self.entries.get(&key) {
            return Ok(*entry);
        }

        let padded_w = glyph_width + 2 * PADDING;
        let padded_h = glyph_height + 2 * PADDING;

        if padded_w > self.page_width || padded_h > self.page_height {
            return Err(Error::GlyphTooLarge { width: glyph_width, height: glyph_height });
        }

        let (page_index, x, y) = self.allocate_slot(padded_w, padded_h)?;

        let entry = GlyphEntry {
            page: page_index,
            u0: x as f32 / self.page_width as f32,
            v0: y as f32 / self.page_height as f32,
            u1: (x + padded_w) as f32 / self.page_width as f32,
            v1: (y + padded_h) as f32 / self.page_height as f32,
            width: glyph_width,
            height: glyph_height,
            padding: PADDING,
            is_color,
        };

        self.entries.insert(key, entry);
        Ok(entry)
    }

    fn allocate_slot(&mut self, w: i32, h: i32) -> Result<(u32, i32, i32), Error> {
        // try the last page first, then any page with room, else grow.
        for (idx, page) in self.pages.iter_mut().enumerate().rev() {
            if let Some((x, y)) = try_pack(page, w, h, self.page_width, self.page_height) {
                return Ok((idx as u32, x, y));
            }
        }

        if self.pages.len() as u32 >= MAX_PAGES {
            return Err(Error::AtlasOverflow(self.pages.len() as u32));
        }

        self.pages.push(Page { cursor: PackCursor::ZERO });
        let page = self.pages.last_mut().unwrap();
        let (x, y) =
            try_pack(page, w, h, self.page_width, self.page_height).expect("fresh page always fits a validated glyph");
        Ok((self.pages.len() as u32 - 1, x, y))
    }
}

/// Row-wrap packing within a single page; returns `None` if the page is
/// (already) full and a new page is required.
fn try_pack(page: &mut Page, w: i32, h: i32, page_width: i32, page_height: i32) -> Option<(i32, i32)> {
    let cur = &mut page.cursor;

    if cur.x + w > page_width {
        cur.x = 0;
        cur.y += cur.row_height;
        cur.row_height = 0;
    }

    if cur.y + h > page_height {
        return None;
    }

    let (x, y) = (cur.x, cur.y);
    cur.x += w;
    cur.row_height = cur.row_height.max(h);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_glyph_returns_same_entry() {
        let mut atlas = GlyphAtlasLayout::new(1024, 1024);
        let key = GlyphKey::new('a', false, false);
        let e1 = atlas.ensure_glyph(key, 8, 16, false).unwrap();
        let e2 = atlas.ensure_glyph(key, 8, 16, false).unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn distinct_styles_get_distinct_entries() {
        let mut atlas = GlyphAtlasLayout::new(1024, 1024);
        let regular = atlas.ensure_glyph(GlyphKey::new('a', false, false), 8, 16, false).unwrap();
        let bold = atlas.ensure_glyph(GlyphKey::new('a', true, false), 8, 16, false).unwrap();
        assert_ne!(regular, bold);
    }

    #[test]
    fn set_metrics_resets_packing_and_invalidates_entries() {
        let mut atlas = GlyphAtlasLayout::new(1024, 1024);
        let key = GlyphKey::new('a', false, false);
        atlas.ensure_glyph(key, 8, 16, false).unwrap();
        assert!(atlas.get(key).is_some());

        atlas.set_metrics(1024, 1024);
        assert!(atlas.get(key).is_none());
    }

    #[test]
    fn glyph_larger_than_page_fails() {
        let mut atlas = GlyphAtlasLayout::new(1024, 1024);
        let key = GlyphKey::new('a', false, false);
        let err = atlas.ensure_glyph(key, 2000, 16, false).unwrap_err();
        assert!(matches!(err, Error::GlyphTooLarge { .. }));
    }

    #[test]
    fn page_overflow_fails_after_cap() {
        // tiny page forces a new page for nearly every glyph
        let mut atlas = GlyphAtlasLayout::new(MIN_PAGE_SIZE, MIN_PAGE_SIZE);
        let mut last_err = None;
        // pack far more distinct glyphs than MAX_PAGES*cells-per-page could ever hold
        // using deliberately huge (but individually valid) glyph cells.
        let big = MIN_PAGE_SIZE - 2 * PADDING - 1;
        for i in 0..(MAX_PAGES + 2) {
            let key = GlyphKey { codepoint: char::from_u32('a' as u32 + i).unwrap(), bold: false, italic: false, wide: false };
            match atlas.ensure_glyph(key, big, big, false) {
                Ok(_) => {},
                Err(e) => last_err = Some(e),
            }
        }
        assert!(matches!(last_err, Some(Error::AtlasOverflow(_))));
    }

    #[test]
    fn wide_glyph_key_tags_cjk_as_wide() {
        let key = GlyphKey::new('\u{4E2D}', false, false); // 中
        assert!(key.wide);
        let ascii = GlyphKey::new('a', false, false);
        assert!(!ascii.wide);
    }
}
