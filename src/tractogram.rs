//! In-memory representation of a tractogram: streamlines plus the named
//! attributes attached to each streamline or to each point.

use crate::error::{Result, TrkError};
use std::collections::BTreeMap;

/// A point in 3D space.
pub type Point = [f32; 3];

/// An ordered sequence of 3D points representing one traced path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Streamline {
    points: Vec<Point>,
}

impl Streamline {
    /// Create a streamline out of its points.
    pub fn new(points: Vec<Point>) -> Self {
        Streamline { points }
    }

    /// The points of this streamline.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the streamline has no points at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Take the points, discarding the rest.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Copy the points into an `n x 3` array.
    #[cfg(feature = "ndarray_streamlines")]
    pub fn to_ndarray(&self) -> ndarray::Array2<f32> {
        ndarray::Array2::from_shape_fn((self.points.len(), 3), |(i, j)| self.points[i][j])
    }
}

impl From<Vec<Point>> for Streamline {
    fn from(points: Vec<Point>) -> Self {
        Streamline::new(points)
    }
}

/// A series of fixed-width rows of floats, one row per streamline (or
/// per point). The width is known even when there are no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValues {
    width: usize,
    data: Vec<f32>,
}

impl AttributeValues {
    /// An empty series of rows holding `width` values each.
    pub fn with_width(width: usize) -> Self {
        AttributeValues {
            width,
            data: Vec::new(),
        }
    }

    /// Build a series from its rows.
    ///
    /// # Errors
    ///
    /// - `TrkError::AttributeLength` if the rows do not all have the
    ///   width of the first one.
    pub fn from_rows<R>(rows: Vec<R>) -> Result<Self>
    where
        R: AsRef<[f32]>,
    {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut values = AttributeValues::with_width(width);
        for row in rows {
            values.push(row.as_ref())?;
        }
        Ok(values)
    }

    /// Append one row.
    ///
    /// # Errors
    ///
    /// - `TrkError::AttributeLength` if the row does not have this
    ///   series' width.
    pub fn push(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.width {
            return Err(TrkError::AttributeLength(
                "row".to_string(),
                self.width,
                row.len(),
            ));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Number of values in each row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The row at the given index.
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.width)?;
        self.data.get(start..start + self.width)
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // a zero width has no rows, and chunks(0) would panic
        self.data.chunks(self.width.max(1))
    }

    /// All values, row after row.
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

/// A set of streamlines with per-streamline and per-point attributes.
///
/// Every per-streamline series holds one row per streamline; every
/// per-point series holds, for each streamline, one row per point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tractogram {
    streamlines: Vec<Streamline>,
    data_per_streamline: BTreeMap<String, AttributeValues>,
    data_per_point: BTreeMap<String, Vec<AttributeValues>>,
}

impl Tractogram {
    /// A tractogram without attributes.
    pub fn new(streamlines: Vec<Streamline>) -> Self {
        Tractogram {
            streamlines,
            ..Default::default()
        }
    }

    /// Attach a per-streamline attribute, replacing any with the same name.
    ///
    /// # Errors
    ///
    /// - `TrkError::AttributeLength` if the series does not hold one row
    ///   per streamline.
    pub fn with_data_per_streamline<N>(mut self, name: N, values: AttributeValues) -> Result<Self>
    where
        N: Into<String>,
    {
        let name = name.into();
        if values.len() != self.streamlines.len() {
            return Err(TrkError::AttributeLength(
                name,
                self.streamlines.len(),
                values.len(),
            ));
        }
        let _ = self.data_per_streamline.insert(name, values);
        Ok(self)
    }

    /// Attach a per-point attribute, replacing any with the same name.
    ///
    /// # Errors
    ///
    /// - `TrkError::AttributeLength` if the series does not hold one entry
    ///   per streamline and, within it, one row per point.
    pub fn with_data_per_point<N>(mut self, name: N, values: Vec<AttributeValues>) -> Result<Self>
    where
        N: Into<String>,
    {
        let name = name.into();
        if values.len() != self.streamlines.len() {
            return Err(TrkError::AttributeLength(
                name,
                self.streamlines.len(),
                values.len(),
            ));
        }
        for (streamline, rows) in self.streamlines.iter().zip(&values) {
            if rows.len() != streamline.len() {
                return Err(TrkError::AttributeLength(name, streamline.len(), rows.len()));
            }
        }
        let _ = self.data_per_point.insert(name, values);
        Ok(self)
    }

    /// The streamlines.
    pub fn streamlines(&self) -> &[Streamline] {
        &self.streamlines
    }

    /// Per-streamline attributes by name.
    pub fn data_per_streamline(&self) -> &BTreeMap<String, AttributeValues> {
        &self.data_per_streamline
    }

    /// Per-point attributes by name.
    pub fn data_per_point(&self) -> &BTreeMap<String, Vec<AttributeValues>> {
        &self.data_per_point
    }

    /// Number of streamlines.
    pub fn len(&self) -> usize {
        self.streamlines.len()
    }

    /// Whether there are no streamlines.
    pub fn is_empty(&self) -> bool {
        self.streamlines.is_empty()
    }

    /// Total number of points over all streamlines.
    pub fn point_count(&self) -> usize {
        self.streamlines.iter().map(Streamline::len).sum()
    }

    /// Move the streamlines and per-streamline attributes out, discarding
    /// the per-point attributes.
    pub fn into_parts(self) -> (Vec<Streamline>, BTreeMap<String, AttributeValues>) {
        (self.streamlines, self.data_per_streamline)
    }

    /// Build a tractogram without checking the length invariants. Used by
    /// the reader, which produces consistent series by construction.
    pub(crate) fn from_raw_parts(
        streamlines: Vec<Streamline>,
        data_per_streamline: BTreeMap<String, AttributeValues>,
        data_per_point: BTreeMap<String, Vec<AttributeValues>>,
    ) -> Self {
        debug_assert!(data_per_streamline
            .values()
            .all(|v| v.len() == streamlines.len()));
        Tractogram {
            streamlines,
            data_per_streamline,
            data_per_point,
        }
    }
}
