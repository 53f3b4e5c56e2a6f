//! Utility functions to write TrackVis files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteordered::ByteOrdered;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Result, TrkError};
use crate::header::{encode_name, TrkHeader, HEADER_SIZE, MAGIC_ID_STRING, MAX_NAMES, NAME_LEN};
use crate::tractogram::{AttributeValues, Tractogram};
use crate::util::is_gz_file;

/// Options and flags which can be used to configure how a TrackVis file
/// is written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Where to write the file.
    path: PathBuf,
    /// Header used as a template for the volume and display fields.
    header_reference: Option<TrkHeader>,
    /// Whether to gzip the output. Defaults to the path ending in ".gz".
    compression: Option<Compression>,
}

impl WriterOptions {
    /// Creates a new set of options, writing to `path`.
    pub fn new<P>(path: P) -> WriterOptions
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let compression = if is_gz_file(&path) {
            Some(Compression::default())
        } else {
            None
        };
        WriterOptions {
            path,
            header_reference: None,
            compression,
        }
    }

    /// Sets a header to copy the volume description (dimensions, voxel
    /// size, affine, voxel order, endianness) from. The counts and
    /// attribute names are always derived from the tractogram.
    pub fn reference_header(mut self, header: &TrkHeader) -> WriterOptions {
        self.header_reference = Some(header.clone());
        self
    }

    /// Sets whether to gzip the output, regardless of the file name.
    pub fn compress(mut self, compress: bool) -> WriterOptions {
        self.compression = if compress {
            Some(Compression::default())
        } else {
            None
        };
        self
    }

    /// Write the tractogram. Points are written as they are, in TrackVis
    /// voxmm coordinates.
    pub fn write_trk(&self, tractogram: &Tractogram) -> Result<()> {
        let reference = self.header_reference.clone().unwrap_or_default();
        let header = prepare_header(&reference, tractogram)?;

        let f = File::create(&self.path)?;
        let writer = BufWriter::new(f);
        match self.compression {
            Some(level) => {
                let mut e = GzEncoder::new(writer, level);
                write_header(&mut e, &header)?;
                write_body(&mut e, &header, tractogram)?;
                e.finish()?.flush()?;
            }
            None => {
                let mut writer = writer;
                write_header(&mut writer, &header)?;
                write_body(&mut writer, &header, tractogram)?;
                writer.flush()?;
            }
        }
        log::debug!(
            "wrote {} streamlines to {}",
            tractogram.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Width of a per-point series, checking that it is the same for every
/// streamline. `None` if it cannot be known.
fn per_point_width(name: &str, series: &[AttributeValues]) -> Result<Option<usize>> {
    let width = match series.first() {
        Some(values) => values.width(),
        None => return Ok(None),
    };
    if let Some(bad) = series.iter().find(|v| v.width() != width) {
        return Err(TrkError::AttributeLength(name.to_string(), width, bad.width()));
    }
    Ok(Some(width))
}

fn encode_names<'a, I>(kind: &'static str, names: I) -> Result<([[u8; NAME_LEN]; MAX_NAMES], i16)>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let names: Vec<_> = names.into_iter().filter(|&(_, width)| width > 0).collect();
    if names.len() > MAX_NAMES {
        return Err(TrkError::TooManyAttributes(kind, names.len()));
    }
    let mut slots = [[0; NAME_LEN]; MAX_NAMES];
    let mut total = 0;
    for (slot, (name, width)) in slots.iter_mut().zip(names) {
        *slot = encode_name(name, width)?;
        total += width;
    }
    if total > i16::MAX as usize {
        return Err(TrkError::TooManyAttributes(kind, total));
    }
    Ok((slots, total as i16))
}

/// Build the header describing `tractogram`, copying the volume
/// description from `reference`.
pub fn prepare_header(reference: &TrkHeader, tractogram: &Tractogram) -> Result<TrkHeader> {
    let mut point_names = Vec::new();
    for (name, series) in tractogram.data_per_point() {
        if let Some(width) = per_point_width(name, series)? {
            point_names.push((name.as_str(), width));
        }
    }
    let (scalar_name, n_scalars) = encode_names("scalar", point_names)?;
    let (property_name, n_properties) = encode_names(
        "property",
        tractogram
            .data_per_streamline()
            .iter()
            .map(|(name, values)| (name.as_str(), values.width())),
    )?;

    Ok(TrkHeader {
        id_string: *MAGIC_ID_STRING,
        n_scalars,
        scalar_name,
        n_properties,
        property_name,
        n_count: tractogram.len() as i32,
        hdr_size: HEADER_SIZE as i32,
        ..reference.clone()
    })
}

/// Write a TrackVis header in its own byte order.
pub fn write_header<W>(writer: W, header: &TrkHeader) -> Result<()>
where
    W: Write,
{
    let mut writer = ByteOrdered::runtime(writer, header.endianness);

    writer.write_all(&header.id_string)?;
    for s in &header.dim {
        writer.write_i16(*s)?;
    }
    for f in header.voxel_size.iter().chain(&header.origin) {
        writer.write_f32(*f)?;
    }
    writer.write_i16(header.n_scalars)?;
    for name in &header.scalar_name {
        writer.write_all(name)?;
    }
    writer.write_i16(header.n_properties)?;
    for name in &header.property_name {
        writer.write_all(name)?;
    }
    for f in header.vox_to_ras.iter().flat_map(|row| row.iter()) {
        writer.write_f32(*f)?;
    }
    let mut reserved = header.reserved.clone();
    reserved.resize(444, 0);
    writer.write_all(&reserved)?;
    writer.write_all(&header.voxel_order)?;
    writer.write_all(&header.pad2)?;
    for f in &header.image_orientation_patient {
        writer.write_f32(*f)?;
    }
    writer.write_all(&header.pad1)?;
    for b in &[
        header.invert_x,
        header.invert_y,
        header.invert_z,
        header.swap_xy,
        header.swap_yz,
        header.swap_zx,
    ] {
        writer.write_u8(*b)?;
    }
    writer.write_i32(header.n_count)?;
    writer.write_i32(header.version)?;
    writer.write_i32(header.hdr_size)?;
    Ok(())
}

/// Write the streamline records described by `header`, which must come
/// from [`prepare_header`] for the same tractogram.
fn write_body<W>(writer: W, header: &TrkHeader, tractogram: &Tractogram) -> Result<()>
where
    W: Write,
{
    let mut writer = ByteOrdered::runtime(writer, header.endianness);
    let scalars: Vec<&Vec<AttributeValues>> = tractogram
        .data_per_point()
        .values()
        .filter(|series| series.first().map_or(false, |v| v.width() > 0))
        .collect();
    let properties: Vec<&AttributeValues> = tractogram
        .data_per_streamline()
        .values()
        .filter(|values| values.width() > 0)
        .collect();

    for (i, streamline) in tractogram.streamlines().iter().enumerate() {
        writer.write_i32(streamline.len() as i32)?;
        for (j, point) in streamline.points().iter().enumerate() {
            for v in point {
                writer.write_f32(*v)?;
            }
            for series in &scalars {
                for v in series[i].get(j).unwrap_or(&[]) {
                    writer.write_f32(*v)?;
                }
            }
        }
        for values in &properties {
            for v in values.get(i).unwrap_or(&[]) {
                writer.write_f32(*v)?;
            }
        }
    }
    Ok(())
}
