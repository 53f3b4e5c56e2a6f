//! Rust implementation of the TrackVis tractogram format, with the tools
//! needed to visualize where streamlines were seeded from.
//!
//! # Introduction
//!
//! The main entry point is [`extract_seeds_and_streamlines`], which checks
//! that a file is a TrackVis tractogram carrying a `"seeds"` attribute and
//! returns its streamlines paired with their seed points:
//!
//! ```no_run
//! use trk_seeds::extract_seeds_and_streamlines;
//! # use trk_seeds::SeedError;
//!
//! # fn run() -> Result<(), SeedError> {
//! let seeded = extract_seeds_and_streamlines("tracking.trk")?;
//! assert_eq!(seeded.streamlines().len(), seeded.seed_points().len());
//! # Ok(())
//! # }
//! ```
//!
//! The lower level codec is available through [`ReaderOptions`],
//! [`TrkHeader`] and [`WriterOptions`]:
//!
//! ```no_run
//! use trk_seeds::{ReaderOptions, Space};
//! # use trk_seeds::error::Result;
//!
//! # fn run() -> Result<()> {
//! let trk = ReaderOptions::new().space(Space::VoxMm).read_file("bundle.trk.gz")?;
//! for (name, values) in trk.tractogram().data_per_streamline() {
//!     println!("{}: {} values per streamline", name, values.width());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Streamlines and seeds can then be drawn with the [`render`] module.
//!
//! # Features
//!
//! - `ndarray_streamlines` (default): `Streamline::to_ndarray`.
//! - `nalgebra_affine`: conversion of affines to `nalgebra` matrices.
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]
#![recursion_limit = "128"]

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate num_derive;

pub mod affine;
pub mod error;
pub mod format;
pub mod header;
pub mod reader;
pub mod render;
pub mod seeds;
pub mod tractogram;
pub mod writer;
mod util;

pub use byteordered::Endianness;
pub use error::{Result, SeedError, TrkError};
pub use format::{detect_format, ContainerFormat};
pub use header::{TrkHeader, TrkVersion};
pub use reader::{ReaderOptions, Space, TrkFile};
pub use render::{Actor, RasterRenderer, Renderer, Scene};
pub use seeds::{extract_seeds_and_streamlines, get_required_attribute, SeededTractogram};
pub use tractogram::{AttributeValues, Point, Streamline, Tractogram};
pub use writer::WriterOptions;
