//! An application for reading TrackVis file meta-data.

extern crate trk_seeds;

use std::env;
use trk_seeds::TrkHeader;

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to TrackVis file is required");
    let header = TrkHeader::from_file(filename)
        .expect("Failed to read TrackVis file");
    println!("{:#?}", &header);
    println!("voxel order: {}", header.voxel_order());
    println!("scalars: {:?}", header.scalar_layout());
    println!("properties: {:?}", header.property_layout());
}
