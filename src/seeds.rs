//! Seed extraction: pairing each streamline with the point(s) its
//! tracking started from.
//!
//! Tracking tools that record seeds store them as a per-streamline
//! attribute named `"seeds"`. [`extract_seeds_and_streamlines`] validates
//! a file step by step and returns the streamlines together with their
//! seeds, ready to be drawn:
//!
//! 1. the container format is detected and must be TrackVis, before any
//!    parsing takes place;
//! 2. the file is loaded;
//! 3. the `"seeds"` attribute must be present;
//! 4. streamlines and seeds are extracted side by side.

use crate::error::{SeedError, TrkError};
use crate::format::{detect_format, ContainerFormat};
use crate::reader::ReaderOptions;
use crate::tractogram::{AttributeValues, Point, Streamline, Tractogram};
use std::path::Path;

/// Name of the per-streamline attribute holding seed coordinates.
pub const SEEDS_KEY: &str = "seeds";

/// Alias type for results of the seed extraction pipeline.
pub type Result<T> = ::std::result::Result<T, SeedError>;

/// Streamlines paired with their seed points, by position.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededTractogram {
    streamlines: Vec<Streamline>,
    seed_points: Vec<Vec<Point>>,
}

impl SeededTractogram {
    /// The streamlines.
    pub fn streamlines(&self) -> &[Streamline] {
        &self.streamlines
    }

    /// The seed points, one set per streamline.
    pub fn seed_points(&self) -> &[Vec<Point>] {
        &self.seed_points
    }

    /// Number of streamlines (and of seed sets).
    pub fn len(&self) -> usize {
        self.streamlines.len()
    }

    /// Whether there are no streamlines.
    pub fn is_empty(&self) -> bool {
        self.streamlines.is_empty()
    }

    /// Iterate over each streamline along with its seed points.
    pub fn iter(&self) -> impl Iterator<Item = (&Streamline, &[Point])> {
        self.streamlines
            .iter()
            .zip(self.seed_points.iter().map(Vec::as_slice))
    }

    /// All seed points in a single sequence, in streamline order.
    pub fn flat_seed_points(&self) -> Vec<Point> {
        self.seed_points.iter().flatten().copied().collect()
    }

    /// Move the streamlines and seed points out.
    pub fn into_parts(self) -> (Vec<Streamline>, Vec<Vec<Point>>) {
        (self.streamlines, self.seed_points)
    }
}

/// Fetch a per-streamline attribute which must be present.
///
/// # Errors
///
/// - `SeedError::MissingAttribute` if the tractogram has no attribute
///   under `key`.
pub fn get_required_attribute<'a>(
    tractogram: &'a Tractogram,
    key: &str,
) -> Result<&'a AttributeValues> {
    tractogram
        .data_per_streamline()
        .get(key)
        .ok_or_else(|| SeedError::MissingAttribute(key.to_string()))
}

/// Split each entry of a seed attribute into 3D points.
fn seed_points_of(key: &str, values: &AttributeValues) -> Result<Vec<Vec<Point>>> {
    let width = values.width();
    if width == 0 || width % 3 != 0 {
        return Err(SeedError::MalformedAttribute(key.to_string(), width));
    }
    Ok(values
        .rows()
        .map(|row| row.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
        .collect())
}

/// Pair the streamlines of an already loaded tractogram with their seeds.
pub fn seeded_tractogram(tractogram: Tractogram) -> Result<SeededTractogram> {
    let seed_points = {
        let seeds = get_required_attribute(&tractogram, SEEDS_KEY)?;
        seed_points_of(SEEDS_KEY, seeds)?
    };
    let (streamlines, _) = tractogram.into_parts();
    debug_assert_eq!(streamlines.len(), seed_points.len());
    Ok(SeededTractogram {
        streamlines,
        seed_points,
    })
}

/// Load a TrackVis file and return its streamlines along with the points
/// they were seeded from.
///
/// Streamline points are in RAS+mm; seed coordinates are returned as
/// recorded by the tracking tool.
///
/// # Errors
///
/// - `SeedError::UnsupportedFormat` if the file is not a TrackVis file.
///   Nothing is parsed in that case.
/// - `SeedError::Load` if the file cannot be read or parsed.
/// - `SeedError::MissingAttribute` if the file holds no seeds.
/// - `SeedError::MalformedAttribute` if the seeds are not 3D points.
///
/// # Example
///
/// ```no_run
/// use trk_seeds::extract_seeds_and_streamlines;
///
/// # fn run() -> Result<(), trk_seeds::SeedError> {
/// let seeded = extract_seeds_and_streamlines("tracking.trk")?;
/// for (streamline, seeds) in seeded.iter() {
///     println!("{} points, seeded at {:?}", streamline.len(), seeds);
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_seeds_and_streamlines<P>(path: P) -> Result<SeededTractogram>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let load_error = |err: TrkError| SeedError::Load(path.to_path_buf(), err);

    let format = detect_format(path).map_err(|e| load_error(e.into()))?;
    if format != ContainerFormat::Trk {
        return Err(SeedError::UnsupportedFormat(path.to_path_buf(), format));
    }

    let trk = ReaderOptions::new().read_file(path).map_err(load_error)?;
    let seeded = seeded_tractogram(trk.into_tractogram())?;
    log::info!(
        "{}: {} streamlines, {} seed points",
        path.display(),
        seeded.len(),
        seeded.seed_points.iter().map(Vec::len).sum::<usize>()
    );
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tractogram_with(key: &str, width: usize, n: usize) -> Tractogram {
        let streamlines = (0..n)
            .map(|i| Streamline::new(vec![[i as f32, 0., 0.]; i + 1]))
            .collect();
        let rows: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32; width]).collect();
        let values = if rows.is_empty() {
            AttributeValues::with_width(width)
        } else {
            AttributeValues::from_rows(rows).unwrap()
        };
        Tractogram::new(streamlines)
            .with_data_per_streamline(key, values)
            .unwrap()
    }

    #[test]
    fn required_attribute() {
        let t = tractogram_with("seeds", 3, 2);
        assert_eq!(get_required_attribute(&t, "seeds").unwrap().len(), 2);
        let err = get_required_attribute(&t, "colors").unwrap_err();
        assert!(matches!(err, SeedError::MissingAttribute(ref k) if k == "colors"));
        assert_eq!(err.to_string(), "Tractogram does not contain colors");
    }

    #[test]
    fn single_point_seeds() {
        let seeded = seeded_tractogram(tractogram_with("seeds", 3, 3)).unwrap();
        assert_eq!(seeded.len(), 3);
        assert_eq!(seeded.seed_points()[2], vec![[2., 2., 2.]]);
        let lens: Vec<usize> = seeded.iter().map(|(s, seeds)| s.len() + seeds.len()).collect();
        assert_eq!(lens, vec![2, 3, 4]);
        assert_eq!(seeded.flat_seed_points().len(), 3);
    }

    #[test]
    fn multi_point_seeds() {
        let seeded = seeded_tractogram(tractogram_with("seeds", 6, 2)).unwrap();
        assert_eq!(seeded.seed_points()[1].len(), 2);
        assert_eq!(seeded.flat_seed_points().len(), 4);
    }

    #[test]
    fn malformed_seeds() {
        let err = seeded_tractogram(tractogram_with("seeds", 2, 2)).unwrap_err();
        assert!(matches!(err, SeedError::MalformedAttribute(_, 2)));
    }

    #[test]
    fn missing_seeds() {
        let err = seeded_tractogram(tractogram_with("other", 3, 2)).unwrap_err();
        assert!(matches!(err, SeedError::MissingAttribute(_)));
    }

    #[test]
    fn empty_seeds_are_not_missing() {
        let seeded = seeded_tractogram(tractogram_with("seeds", 3, 0)).unwrap();
        assert!(seeded.is_empty());
        let (streamlines, seeds) = seeded.into_parts();
        assert!(streamlines.is_empty());
        assert!(seeds.is_empty());
    }
}
