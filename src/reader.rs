//! Module for reading complete TrackVis files: the header followed by
//! the streamline records.
//!
//! Each record holds a point count, then for each point its three
//! coordinates followed by `n_scalars` values, then `n_properties`
//! values for the whole streamline.

use crate::affine::{apply_affine, trackvis_to_rasmm};
use crate::error::{Result, TrkError};
use crate::header::TrkHeader;
use crate::tractogram::{AttributeValues, Point, Streamline, Tractogram};
use crate::util::{open_file_maybe_gz, read_up_to};
use byteordered::{ByteOrdered, Endianness};
use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind as IoErrorKind, Read};
use std::path::Path;

/// Upper bound on preallocations driven by counts read from the file.
const MAX_PREALLOC: usize = 1 << 16;

/// Coordinate space of the points handed out by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// RAS+ world coordinates, in millimetres
    RasMm,
    /// TrackVis native coordinates, as stored in the file
    VoxMm,
}

impl Default for Space {
    fn default() -> Self {
        Space::RasMm
    }
}

/// Options and flags which can be used to configure how a TrackVis file
/// is read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReaderOptions {
    space: Space,
}

impl ReaderOptions {
    /// Creates a blank new set of options ready for configuration.
    pub fn new() -> Self {
        ReaderOptions::default()
    }

    /// Sets the coordinate space of the returned points.
    pub fn space(&mut self, space: Space) -> &mut Self {
        self.space = space;
        self
    }

    /// Retrieve the full contents of a TrackVis file.
    /// If the file's name ends with ".gz", the file is assumed to need
    /// GZip decoding.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trk_seeds::ReaderOptions;
    /// # use trk_seeds::error::Result;
    ///
    /// # fn run() -> Result<()> {
    /// let trk = ReaderOptions::new().read_file("bundle.trk")?;
    /// println!("{} streamlines", trk.tractogram().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_file<P>(&self, path: P) -> Result<TrkFile>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        log::debug!("reading {}", path.display());
        let stream = open_file_maybe_gz(path)?;
        self.read(stream)
    }

    /// Retrieve a TrackVis file from a stream of data, positioned at the
    /// start of the header.
    pub fn read<R>(&self, mut source: R) -> Result<TrkFile>
    where
        R: Read,
    {
        let header = TrkHeader::from_reader(&mut source)?;
        let affine = match self.space {
            Space::RasMm => Some(trackvis_to_rasmm(&header)?),
            Space::VoxMm => None,
        };
        let tractogram = read_body(&header, source, |p| match &affine {
            Some(a) => apply_affine(a, p),
            None => p,
        })?;
        log::debug!(
            "read {} streamlines ({} points)",
            tractogram.len(),
            tractogram.point_count()
        );

        Ok(TrkFile {
            header,
            tractogram,
            space: self.space,
        })
    }
}

/// A TrackVis file loaded in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct TrkFile {
    header: TrkHeader,
    tractogram: Tractogram,
    space: Space,
}

impl TrkFile {
    /// Read a TrackVis file with the default options: points in RAS+mm.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<TrkFile> {
        ReaderOptions::new().read_file(path)
    }

    /// Obtain a reference to the header.
    pub fn header(&self) -> &TrkHeader {
        &self.header
    }

    /// Obtain a reference to the streamlines and their attributes.
    pub fn tractogram(&self) -> &Tractogram {
        &self.tractogram
    }

    /// The coordinate space of the points.
    pub fn space(&self) -> Space {
        self.space
    }

    /// Move the tractogram out, discarding the header.
    pub fn into_tractogram(self) -> Tractogram {
        self.tractogram
    }
}

fn eof_as_truncated(e: IoError, index: usize) -> TrkError {
    if e.kind() == IoErrorKind::UnexpectedEof {
        TrkError::Truncated(index)
    } else {
        TrkError::Io(e)
    }
}

/// Read the point count opening a record. `None` means a clean end of file.
fn read_point_count<R: Read>(
    source: R,
    endianness: Endianness,
    index: usize,
) -> Result<Option<i32>> {
    let mut buf = [0u8; 4];
    match read_up_to(source, &mut buf)? {
        0 => Ok(None),
        4 => Ok(Some(match endianness {
            Endianness::Little => i32::from_le_bytes(buf),
            Endianness::Big => i32::from_be_bytes(buf),
        })),
        _ => Err(TrkError::Truncated(index)),
    }
}

fn read_body<R, F>(header: &TrkHeader, source: R, transform: F) -> Result<Tractogram>
where
    R: Read,
    F: Fn(Point) -> Point,
{
    let scalar_layout = header.scalar_layout()?;
    let property_layout = header.property_layout()?;
    let n_scalars = header.n_scalars as usize;
    let n_properties = header.n_properties as usize;
    let expected = header.streamline_count();

    let mut input = ByteOrdered::runtime(source, header.endianness);
    let mut streamlines = Vec::with_capacity(expected.unwrap_or(0).min(MAX_PREALLOC));
    let mut scalars: Vec<Vec<AttributeValues>> = vec![Vec::new(); scalar_layout.len()];
    let mut properties: Vec<AttributeValues> = property_layout
        .iter()
        .map(|(_, range)| AttributeValues::with_width(range.len()))
        .collect();
    let mut point_values = vec![0f32; 3 + n_scalars];
    let mut property_values = vec![0f32; n_properties];

    loop {
        let index = streamlines.len();
        if expected == Some(index) {
            break;
        }
        let n_points = match read_point_count(&mut input, header.endianness, index)? {
            Some(n) if n < 0 => return Err(TrkError::NegativePointCount(index, n)),
            Some(n) => n as usize,
            // a known count must be reached, an unknown one ends here
            None if expected.is_some() => return Err(TrkError::Truncated(index)),
            None => break,
        };

        let mut points = Vec::with_capacity(n_points.min(MAX_PREALLOC));
        let mut point_scalars: Vec<AttributeValues> = scalar_layout
            .iter()
            .map(|(_, range)| AttributeValues::with_width(range.len()))
            .collect();
        for _ in 0..n_points {
            for v in point_values.iter_mut() {
                *v = input.read_f32().map_err(|e| eof_as_truncated(e, index))?;
            }
            points.push(transform([point_values[0], point_values[1], point_values[2]]));
            for ((_, range), values) in scalar_layout.iter().zip(point_scalars.iter_mut()) {
                values.push(&point_values[3 + range.start..3 + range.end])?;
            }
        }
        for v in property_values.iter_mut() {
            *v = input.read_f32().map_err(|e| eof_as_truncated(e, index))?;
        }
        for ((_, range), values) in property_layout.iter().zip(properties.iter_mut()) {
            values.push(&property_values[range.clone()])?;
        }

        for (series, values) in scalars.iter_mut().zip(point_scalars) {
            series.push(values);
        }
        streamlines.push(Streamline::new(points));
    }

    let data_per_point: BTreeMap<_, _> = scalar_layout
        .into_iter()
        .map(|(name, _)| name)
        .zip(scalars)
        .collect();
    let data_per_streamline: BTreeMap<_, _> = property_layout
        .into_iter()
        .map(|(name, _)| name)
        .zip(properties)
        .collect();

    Ok(Tractogram::from_raw_parts(
        streamlines,
        data_per_streamline,
        data_per_point,
    ))
}
