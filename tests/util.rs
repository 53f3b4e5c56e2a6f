#![allow(dead_code)]

use std::path::{Path, PathBuf};

use trk_seeds::{AttributeValues, Streamline, Tractogram, TrkHeader, WriterOptions};

/// Streamlines with the given point counts. Streamline `i` runs along x at
/// height `y = i`, starting from `x = 1`.
pub fn streamlines(lengths: &[usize]) -> Vec<Streamline> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            Streamline::new((0..n).map(|x| [1. + x as f32, i as f32, 2.]).collect())
        })
        .collect()
}

/// A tractogram seeded at the first point of each streamline.
pub fn seeded_tractogram(lengths: &[usize]) -> Tractogram {
    let streamlines = streamlines(lengths);
    let seeds = if streamlines.is_empty() {
        AttributeValues::with_width(3)
    } else {
        AttributeValues::from_rows(streamlines.iter().map(|s| s.points()[0]).collect()).unwrap()
    };
    Tractogram::new(streamlines)
        .with_data_per_streamline("seeds", seeds)
        .unwrap()
}

/// Known header for the fixtures: a 10mm cube of 1mm voxels in RAS order.
pub fn fixture_header() -> TrkHeader {
    TrkHeader {
        dim: [10, 10, 10],
        ..TrkHeader::default()
    }
}

/// Write a tractogram as `name` in `dir`, returning its path.
pub fn write_fixture(dir: &Path, name: &str, tractogram: &Tractogram) -> PathBuf {
    let path = dir.join(name);
    WriterOptions::new(&path)
        .reference_header(&fixture_header())
        .write_trk(tractogram)
        .unwrap();
    path
}
