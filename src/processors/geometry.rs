//! Per-image geometry bookkeeping
//!
//! Each image in a batch gets an [`ImageGeometry`] record describing its
//! original size and the size it was resized to. Because batch padding only
//! grows the bottom and right edges, these four numbers are enough to map a
//! detection on the padded canvas back into source coordinates.

use serde::{Deserialize, Serialize};

/// Original and resized size of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Original width
    pub src_w: u32,
    /// Original height
    pub src_h: u32,
    /// Width after resizing (before batch padding)
    pub dst_w: u32,
    /// Height after resizing (before batch padding)
    pub dst_h: u32,
}

impl ImageGeometry {
    pub fn new(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Self {
        Self {
            src_w,
            src_h,
            dst_w,
            dst_h,
        }
    }

    /// Returns the record as `[orig_w, orig_h, target_w, target_h]`.
    pub fn as_array(&self) -> [u32; 4] {
        [self.src_w, self.src_h, self.dst_w, self.dst_h]
    }

    /// Horizontal resize ratio (`dst_w / src_w`).
    pub fn ratio_w(&self) -> f32 {
        self.dst_w as f32 / self.src_w as f32
    }

    /// Vertical resize ratio (`dst_h / src_h`).
    pub fn ratio_h(&self) -> f32 {
        self.dst_h as f32 / self.src_h as f32
    }

    /// Maps a point on the resized (or padded) image back to source
    /// coordinates, clamped to the source bounds.
    pub fn to_source_point(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = (x / self.ratio_w()).clamp(0.0, self.src_w as f32);
        let sy = (y / self.ratio_h()).clamp(0.0, self.src_h as f32);
        (sx, sy)
    }

    /// Pixel count of the resized image.
    pub fn target_area(&self) -> u64 {
        u64::from(self.dst_w) * u64::from(self.dst_h)
    }

    /// Returns true if the resize step leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        self.src_w == self.dst_w && self.src_h == self.dst_h
    }
}

/// Geometry table for the batch currently being processed.
///
/// The table is cleared and resized at the start of every call, so records
/// from a previous batch can never leak into the next one.
#[derive(Debug, Clone, Default)]
pub struct BatchGeometryTracker {
    records: Vec<ImageGeometry>,
}

impl BatchGeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all records and sizes the table for `batch_size` images.
    pub fn reset(&mut self, batch_size: usize) {
        self.records.clear();
        self.records.resize(batch_size, ImageGeometry::default());
    }

    /// Stores the record of image `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the size given to the last `reset`.
    pub fn set(&mut self, index: usize, geometry: ImageGeometry) {
        self.records[index] = geometry;
    }

    pub fn get(&self, index: usize) -> Option<&ImageGeometry> {
        self.records.get(index)
    }

    /// Mutable access for index-partitioned filling.
    pub fn records_mut(&mut self) -> &mut [ImageGeometry] {
        &mut self.records
    }

    pub fn as_slice(&self) -> &[ImageGeometry] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageGeometry> {
        self.records.iter()
    }

    /// Element-wise maximum of the target sizes, as `(max_w, max_h)`.
    ///
    /// Returns `(0, 0)` for an empty table.
    pub fn max_target(&self) -> (u32, u32) {
        self.records
            .iter()
            .fold((0, 0), |(w, h), g| (w.max(g.dst_w), h.max(g.dst_h)))
    }

    /// Copies the table out, leaving the tracker untouched.
    pub fn to_vec(&self) -> Vec<ImageGeometry> {
        self.records.clone()
    }
}
