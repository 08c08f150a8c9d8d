//! Row-slice store and scroll translation: pooled dynamic
//! float buffers indexed by per-row vertex counts, so a single changed row
//! can be rewritten without repacking the whole frame.

/// A pooled dynamic buffer with an explicit logical length separate from
/// backing capacity.
#[derive(Debug, Clone, Default)]
pub struct GrowableBuffer<T> {
    data: Vec<T>,
    capacity_floor: usize,
}

impl<T: Copy + Default> GrowableBuffer<T> {
    pub fn new() -> Self {
        Self { data: Vec::new(), capacity_floor: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The highest capacity ever reserved; only grows, and only by
    /// doubling. Callers use this to decide `bufferData` (reallocate) vs.
    /// `bufferSubData` (overwrite in place) on the GPU side.
    pub fn capacity(&self) -> usize {
        self.capacity_floor
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Replaces `old_len` elements at `offset` with `new_values`. Returns
    /// `true` if tracked capacity grew as a result.
    pub fn splice(&mut self, offset: usize, old_len: usize, new_values: &[T]) -> bool {
        self.data.splice(offset..offset + old_len, new_values.iter().copied());
        self.bump_capacity_to(self.data.len())
    }

    /// Replaces the entire logical content. Used by whole-buffer
    /// reassembly (scroll translation, full rebuild).
    pub fn reset_with(&mut self, data: Vec<T>) -> bool {
        self.data = data;
        self.bump_capacity_to(self.data.len())
    }

    fn bump_capacity_to(&mut self, needed: usize) -> bool {
        if needed > self.capacity_floor {
            self.capacity_floor = needed.max(self.capacity_floor * 2).max(1);
            true
        } else {
            false
        }
    }
}

/// Per-row vertex counts; offsets into the pooled buffers are derived as
/// prefix sums over this array in row order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RowLens {
    bg_vertices: usize,
    glyph_vertices: usize,
}

/// Outcome of attempting an in-place scroll translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Not eligible (not a full-viewport scroll, or `|amount| >= rows`).
    NotApplicable,
    /// Translation succeeded for in-region rows; `rebuilt_rows` lists rows
    /// whose source fell outside the scroll region and must be rebuilt
    /// from the new snapshot via `update_row`.
    Translated { rebuilt_rows: Vec<u16> },
}

/// Holds the five pooled float buffers from (bg positions/
/// colors, glyph positions/texcoords/colors) and the per-row bookkeeping
/// needed to rewrite a single row in place.
#[derive(Debug, Clone)]
pub struct RowSliceStore {
    row_lens: Vec<RowLens>,
    bg_positions: GrowableBuffer<f32>,
    bg_colors: GrowableBuffer<f32>,
    glyph_positions: GrowableBuffer<f32>,
    glyph_texcoords: GrowableBuffer<f32>,
    glyph_colors: GrowableBuffer<f32>,
    version: u64,
}

impl RowSliceStore {
    pub fn new(rows: u16) -> Self {
        Self {
            row_lens: vec![RowLens::default(); rows as usize],
            bg_positions: GrowableBuffer::new(),
            bg_colors: GrowableBuffer::new(),
            glyph_positions: GrowableBuffer::new(),
            glyph_texcoords: GrowableBuffer::new(),
            glyph_colors: GrowableBuffer::new(),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bg_positions(&self) -> &GrowableBuffer<f32> {
        &self.bg_positions
    }

    pub fn bg_colors(&self) -> &GrowableBuffer<f32> {
        &self.bg_colors
    }

    pub fn glyph_positions(&self) -> &GrowableBuffer<f32> {
        &self.glyph_positions
    }

    pub fn glyph_texcoords(&self) -> &GrowableBuffer<f32> {
        &self.glyph_texcoords
    }

    pub fn glyph_colors(&self) -> &GrowableBuffer<f32> {
        &self.glyph_colors
    }

    pub fn total_background_vertex_count(&self) -> usize {
        self.row_lens.iter().map(|r| r.bg_vertices).sum()
    }

    pub fn total_glyph_vertex_count(&self) -> usize {
        self.row_lens.iter().map(|r| r.glyph_vertices).sum()
    }

    pub fn total_glyph_count(&self) -> usize {
        self.total_glyph_vertex_count() / 6
    }

    fn bg_vertex_offset(&self, row: usize) -> usize {
        self.row_lens[..row].iter().map(|r| r.bg_vertices).sum()
    }

    fn glyph_vertex_offset(&self, row: usize) -> usize {
        self.row_lens[..row].iter().map(|r| r.glyph_vertices).sum()
    }

    /// Overwrites one row's slice in all five buffers, growing or shrinking
    /// that row's region as needed; every other row's data is untouched,
    /// only its *offset* may shift. Returns `true` if any buffer's tracked
    /// capacity grew (the caller must reallocate the GPU buffer).
    pub fn update_row(&mut self, row: u16, geo: &crate::geometry::RowGeometry) -> bool {
        let idx = row as usize;
        let old = self.row_lens[idx];

        let bg_offset = self.bg_vertex_offset(idx);
        let glyph_offset = self.glyph_vertex_offset(idx);

        let mut grew = false;
        grew |= self.bg_positions.splice(bg_offset * 2, old.bg_vertices * 2, &geo.bg_positions);
        grew |= self.bg_colors.splice(bg_offset * 4, old.bg_vertices * 4, &geo.bg_colors);
        grew |= self.glyph_positions.splice(glyph_offset * 2, old.glyph_vertices * 2, &geo.glyph_positions);
        grew |= self.glyph_texcoords.splice(glyph_offset * 2, old.glyph_vertices * 2, &geo.glyph_texcoords);
        grew |= self.glyph_colors.splice(glyph_offset * 4, old.glyph_vertices * 4, &geo.glyph_colors);

        self.row_lens[idx] = RowLens {
            bg_vertices: geo.background_vertex_count(),
            glyph_vertices: geo.glyph_vertex_count(),
        };
        self.version += 1;
        grew
    }

    /// Attempts the in-place scroll translation of . Only
    /// applicable to a full-viewport scroll region; rows whose source row
    /// falls outside `[scroll_top, scroll_bottom]` are reported for the
    /// caller to rebuild from the post-scroll snapshot.
    pub fn apply_scroll_translation(
        &mut self,
        amount: i32,
        rows: u16,
        scroll_top: u16,
        scroll_bottom: u16,
    ) -> ScrollOutcome {
        if amount == 0 || scroll_top != 0 || scroll_bottom != rows.saturating_sub(1) {
            return ScrollOutcome::NotApplicable;
        }
        if rows == 0 || amount.unsigned_abs() as u16 >= rows {
            return ScrollOutcome::NotApplicable;
        }

        let old_row_lens = self.row_lens.clone();
        let old_bg_positions = self.bg_positions.as_slice().to_vec();
        let old_bg_colors = self.bg_colors.as_slice().to_vec();
        let old_glyph_positions = self.glyph_positions.as_slice().to_vec();
        let old_glyph_texcoords = self.glyph_texcoords.as_slice().to_vec();
        let old_glyph_colors = self.glyph_colors.as_slice().to_vec();

        let bg_prefix = prefix_sums(&old_row_lens, |r| r.bg_vertices);
        let glyph_prefix = prefix_sums(&old_row_lens, |r| r.glyph_vertices);

        let mut new_row_lens = vec![RowLens::default(); rows as usize];
        let mut new_bg_positions = Vec::new();
        let mut new_bg_colors = Vec::new();
        let mut new_glyph_positions = Vec::new();
        let mut new_glyph_texcoords = Vec::new();
        let mut new_glyph_colors = Vec::new();
        let mut rebuilt_rows = Vec::new();

        for t in 0..rows {
            let s = t as i32 + amount;
            if s < scroll_top as i32 || s > scroll_bottom as i32 {
                rebuilt_rows.push(t);
                continue;
            }
            let s = s as usize;
            let lens = old_row_lens[s];
            new_row_lens[t as usize] = lens;

            let delta_clip_y = -((t as i32 - s as i32) as f32) * (2.0 / rows as f32);

            let bg_off = bg_prefix[s];
            append_translated_positions(
                &mut new_bg_positions,
                &old_bg_positions[bg_off * 2..(bg_off + lens.bg_vertices) * 2],
                delta_clip_y,
            );
            let bg_col_off = bg_off * 4;
            new_bg_colors.extend_from_slice(&old_bg_colors[bg_col_off..bg_col_off + lens.bg_vertices * 4]);

            let gl_off = glyph_prefix[s];
            append_translated_positions(
                &mut new_glyph_positions,
                &old_glyph_positions[gl_off * 2..(gl_off + lens.glyph_vertices) * 2],
                delta_clip_y,
            );
            let gl_tex_off = gl_off * 2;
            new_glyph_texcoords
                .extend_from_slice(&old_glyph_texcoords[gl_tex_off..gl_tex_off + lens.glyph_vertices * 2]);
            let gl_col_off = gl_off * 4;
            new_glyph_colors.extend_from_slice(&old_glyph_colors[gl_col_off..gl_col_off + lens.glyph_vertices * 4]);
        }

        self.row_lens = new_row_lens;
        self.bg_positions.reset_with(new_bg_positions);
        self.bg_colors.reset_with(new_bg_colors);
        self.glyph_positions.reset_with(new_glyph_positions);
        self.glyph_texcoords.reset_with(new_glyph_texcoords);
        self.glyph_colors.reset_with(new_glyph_colors);
        self.version += 1;

        ScrollOutcome::Translated { rebuilt_rows }
    }
}

fn prefix_sums(lens: &[RowLens], f: impl Fn(&RowLens) -> usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(lens.len());
    let mut acc = 0;
    for l in lens {
        out.push(acc);
        acc += f(l);
    }
    out
}

fn append_translated_positions(out: &mut Vec<f32>, positions: &[f32], delta_clip_y: f32) {
    for pair in positions.chunks_exact(2) {
        out.push(pair[0]);
        out.push(pair[1] + delta_clip_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RowGeometry;

    fn geo_with_bg_vertices(n: usize) -> RowGeometry {
        RowGeometry {
            bg_positions: vec![0.0; n * 2],
            bg_colors: vec![0.0; n * 4],
            glyph_positions: vec![],
            glyph_texcoords: vec![],
            glyph_colors: vec![],
        }
    }

    #[test]
    fn update_row_grows_capacity_once() {
        let mut store = RowSliceStore::new(2);
        let grew = store.update_row(0, &geo_with_bg_vertices(6));
        assert!(grew);
        assert_eq!(store.total_background_vertex_count(), 6);
    }

    #[test]
    fn update_row_in_place_does_not_disturb_other_rows() {
        let mut store = RowSliceStore::new(2);
        store.update_row(0, &geo_with_bg_vertices(6));
        store.update_row(1, &geo_with_bg_vertices(6));
        let before = store.bg_positions().as_slice().to_vec();

        store.update_row(0, &geo_with_bg_vertices(6));
        let after = store.bg_positions().as_slice().to_vec();
        assert_eq!(before.len(), after.len());
        // row 1's slice (second half) is untouched
        assert_eq!(before[12..], after[12..]);
    }

    #[test]
    fn scroll_outside_full_viewport_is_not_applicable() {
        let mut store = RowSliceStore::new(4);
        let outcome = store.apply_scroll_translation(1, 4, 1, 2);
        assert_eq!(outcome, ScrollOutcome::NotApplicable);
    }

    #[test]
    fn scroll_translates_in_region_rows_and_reports_rebuilds() {
        let mut store = RowSliceStore::new(3);
        for r in 0..3u16 {
            store.update_row(r, &geo_with_bg_vertices(6));
        }

        match store.apply_scroll_translation(1, 3, 0, 2) {
            ScrollOutcome::Translated { rebuilt_rows } => {
                // row 2's source (row 3) is out of range -> must rebuild
                assert_eq!(rebuilt_rows, vec![2]);
            },
            ScrollOutcome::NotApplicable => panic!("expected translation"),
        }
        // rows 0,1 carried their 6-vertex slices over; row 2 is zeroed pending rebuild
        assert_eq!(store.total_background_vertex_count(), 12);
    }
}
