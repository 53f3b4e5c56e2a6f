//! An application for writing a seeded TrackVis file from scratch

extern crate trk_seeds;

use std::env;

use trk_seeds::{AttributeValues, Streamline, Tractogram, TrkHeader, WriterOptions};

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to TrackVis file is required");

    // a fan of 16 straight streamlines, each seeded at its middle point
    let streamlines: Vec<Streamline> = (0..16)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::PI / 16.;
            let (sin, cos) = angle.sin_cos();
            let points = (0..=20)
                .map(|t| {
                    let r = t as f32 - 10.;
                    [32. + r * cos, 32. + r * sin, 16.]
                })
                .collect();
            Streamline::new(points)
        })
        .collect();
    let seeds: Vec<[f32; 3]> = streamlines.iter().map(|s| s.points()[10]).collect();

    let header = TrkHeader {
        dim: [64, 64, 32],
        ..TrkHeader::default()
    };
    let tractogram = Tractogram::new(streamlines)
        .with_data_per_streamline("seeds", AttributeValues::from_rows(seeds).unwrap())
        .unwrap();

    WriterOptions::new(&filename)
        .reference_header(&header)
        .write_trk(&tractogram)
        .unwrap();
}
