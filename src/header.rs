//! This module defines the `TrkHeader` struct, which is used
//! to provide important information about TrackVis tractograms.

use crate::error::{Result, TrkError};
use crate::format::MAGIC_TRK;
use crate::util::{open_file_maybe_gz, trim_nul_latin1};
use byteordered::{ByteOrdered, Endianness};
use num_traits::FromPrimitive;
use std::io::Read;
use std::ops::Range;
use std::path::Path;

/// Size of a TrackVis header in bytes, also the expected value of `hdr_size`.
pub const HEADER_SIZE: usize = 1000;
/// Magic string of the `id_string` field.
pub const MAGIC_ID_STRING: &[u8; 6] = b"TRACK\0";
/// Number of name slots for scalars (and for properties).
pub const MAX_NAMES: usize = 10;
/// Size of one name slot, in bytes.
pub const NAME_LEN: usize = 20;

/// Key under which unnamed per-point scalars are gathered.
pub const UNNAMED_SCALARS: &str = "scalars";
/// Key under which unnamed per-streamline properties are gathered.
pub const UNNAMED_PROPERTIES: &str = "properties";

/// Voxel order assumed when the header leaves it blank.
const DEFAULT_VOXEL_ORDER: &str = "LPS";

/// Version of the TrackVis header layout.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum TrkVersion {
    /// Version 1, without `vox_to_ras`
    V1 = 1,
    /// Version 2, the most common one
    V2 = 2,
    /// Version 3, same layout as version 2
    V3 = 3,
}

/// The TrackVis header data type.
/// All fields are public and named after the format's header definition.
///
/// # Examples
///
/// ```no_run
/// use trk_seeds::TrkHeader;
/// # use trk_seeds::error::Result;
///
/// # fn run() -> Result<()> {
/// let hdr = TrkHeader::from_file("bundle.trk")?;
/// println!("{} streamlines", hdr.n_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrkHeader {
    /// Magic string, must start with `TRACK`
    pub id_string: [u8; 6],
    /// Volume dimensions
    pub dim: [i16; 3],
    /// Voxel size in millimetres
    pub voxel_size: [f32; 3],
    /// Origin, unused by TrackVis
    pub origin: [f32; 3],
    /// Number of scalars stored with each point
    pub n_scalars: i16,
    /// Encoded scalar names
    pub scalar_name: [[u8; NAME_LEN]; MAX_NAMES],
    /// Number of properties stored with each streamline
    pub n_properties: i16,
    /// Encoded property names
    pub property_name: [[u8; NAME_LEN]; MAX_NAMES],
    /// Voxel to RAS+ world affine, row major
    pub vox_to_ras: [[f32; 4]; 4],
    /// Reserved space, 444 bytes
    pub reserved: Vec<u8>,
    /// Voxel order, e.g. `b"LPS\0"`
    pub voxel_order: [u8; 4],
    /// Padding
    pub pad2: [u8; 4],
    /// Image orientation of the first patient axis pair
    pub image_orientation_patient: [f32; 6],
    /// Padding
    pub pad1: [u8; 2],
    /// Display flag
    pub invert_x: u8,
    /// Display flag
    pub invert_y: u8,
    /// Display flag
    pub invert_z: u8,
    /// Display flag
    pub swap_xy: u8,
    /// Display flag
    pub swap_yz: u8,
    /// Display flag
    pub swap_zx: u8,
    /// Number of streamlines, 0 if unknown
    pub n_count: i32,
    /// Header version
    pub version: i32,
    /// Header size, must be 1000
    pub hdr_size: i32,

    /// Original data Endianness
    pub endianness: Endianness,
}

impl Default for TrkHeader {
    fn default() -> TrkHeader {
        TrkHeader {
            id_string: *MAGIC_ID_STRING,
            dim: [1, 1, 1],
            voxel_size: [1., 1., 1.],
            origin: [0.; 3],
            n_scalars: 0,
            scalar_name: [[0; NAME_LEN]; MAX_NAMES],
            n_properties: 0,
            property_name: [[0; NAME_LEN]; MAX_NAMES],
            vox_to_ras: [
                [1., 0., 0., 0.],
                [0., 1., 0., 0.],
                [0., 0., 1., 0.],
                [0., 0., 0., 1.],
            ],
            reserved: vec![0; 444],
            voxel_order: *b"RAS\0",
            pad2: [0; 4],
            image_orientation_patient: [0.; 6],
            pad1: [0; 2],
            invert_x: 0,
            invert_y: 0,
            invert_z: 0,
            swap_xy: 0,
            swap_yz: 0,
            swap_zx: 0,
            n_count: 0,
            version: 2,
            hdr_size: HEADER_SIZE as i32,
            endianness: Endianness::Little,
        }
    }
}

impl TrkHeader {
    /// Retrieve a TrackVis header, along with its byte order, from a file in the file system.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TrkHeader> {
        let stream = open_file_maybe_gz(path)?;
        TrkHeader::from_reader(stream)
    }

    /// Read a TrackVis header, along with its byte order, from the given
    /// byte stream. It is assumed that the input is currently at the start
    /// of the header.
    pub fn from_reader<S: Read>(mut input: S) -> Result<TrkHeader> {
        let mut raw = [0u8; HEADER_SIZE];
        input.read_exact(&mut raw)?;
        parse_header(&raw)
    }

    /// Get the header version as a validated enum.
    ///
    /// Loading does not fail on an unknown version: the body is read with
    /// the version 2 layout and a warning is logged.
    pub fn version(&self) -> Result<TrkVersion> {
        FromPrimitive::from_i32(self.version)
            .ok_or(TrkError::InvalidCode("version", self.version))
    }

    /// The voxel order as a string such as "LPS". Falls back to "LPS"
    /// when the header leaves it blank.
    pub fn voxel_order(&self) -> String {
        let order = trim_nul_latin1(&self.voxel_order);
        if order.trim().is_empty() {
            DEFAULT_VOXEL_ORDER.to_string()
        } else {
            order.trim().to_ascii_uppercase()
        }
    }

    /// The number of streamlines announced by the header, if any.
    pub fn streamline_count(&self) -> Option<usize> {
        if self.n_count > 0 {
            Some(self.n_count as usize)
        } else {
            None
        }
    }

    /// Map each per-point scalar name to its range within a point's
    /// scalar values.
    pub fn scalar_layout(&self) -> Result<Vec<(String, Range<usize>)>> {
        names_layout(
            "scalar",
            &self.scalar_name,
            self.n_scalars,
            UNNAMED_SCALARS,
        )
    }

    /// Map each per-streamline property name to its range within a
    /// streamline's property values.
    pub fn property_layout(&self) -> Result<Vec<(String, Range<usize>)>> {
        names_layout(
            "property",
            &self.property_name,
            self.n_properties,
            UNNAMED_PROPERTIES,
        )
    }
}

fn parse_header(raw: &[u8; HEADER_SIZE]) -> Result<TrkHeader> {
    if &raw[..MAGIC_TRK.len()] != MAGIC_TRK {
        let mut magic = [0u8; 6];
        magic.copy_from_slice(&raw[..6]);
        return Err(TrkError::InvalidMagic(magic));
    }

    let size_bytes = [raw[996], raw[997], raw[998], raw[999]];
    let endianness = if i32::from_le_bytes(size_bytes) == HEADER_SIZE as i32 {
        Endianness::Little
    } else if i32::from_be_bytes(size_bytes) == HEADER_SIZE as i32 {
        Endianness::Big
    } else {
        return Err(TrkError::InvalidHeaderSize(i32::from_le_bytes(size_bytes)));
    };

    let mut h = TrkHeader::default();
    h.endianness = endianness;
    let mut input = ByteOrdered::runtime(&raw[..], endianness);

    input.read_exact(&mut h.id_string)?;
    for v in &mut h.dim {
        *v = input.read_i16()?;
    }
    for v in &mut h.voxel_size {
        *v = input.read_f32()?;
    }
    for v in &mut h.origin {
        *v = input.read_f32()?;
    }
    h.n_scalars = input.read_i16()?;
    for name in &mut h.scalar_name {
        input.read_exact(name)?;
    }
    h.n_properties = input.read_i16()?;
    for name in &mut h.property_name {
        input.read_exact(name)?;
    }
    for row in &mut h.vox_to_ras {
        for v in row.iter_mut() {
            *v = input.read_f32()?;
        }
    }
    // reserved is a 444-elem vec already
    input.read_exact(h.reserved.as_mut_slice())?;
    input.read_exact(&mut h.voxel_order)?;
    input.read_exact(&mut h.pad2)?;
    for v in &mut h.image_orientation_patient {
        *v = input.read_f32()?;
    }
    input.read_exact(&mut h.pad1)?;
    h.invert_x = input.read_u8()?;
    h.invert_y = input.read_u8()?;
    h.invert_z = input.read_u8()?;
    h.swap_xy = input.read_u8()?;
    h.swap_yz = input.read_u8()?;
    h.swap_zx = input.read_u8()?;
    h.n_count = input.read_i32()?;
    h.version = input.read_i32()?;
    h.hdr_size = input.read_i32()?;

    if h.n_scalars < 0 {
        return Err(TrkError::InvalidCode("n_scalars", h.n_scalars as i32));
    }
    if h.n_properties < 0 {
        return Err(TrkError::InvalidCode("n_properties", h.n_properties as i32));
    }
    if h.n_count < 0 {
        return Err(TrkError::InvalidCode("n_count", h.n_count));
    }

    if h.version().is_err() {
        log::warn!("unknown TrackVis header version {}, reading as version 2", h.version);
    }

    log::debug!(
        "TrackVis header v{} ({:?} endian): {} streamlines, {} scalars, {} properties",
        h.version,
        endianness,
        h.n_count,
        h.n_scalars,
        h.n_properties
    );
    Ok(h)
}

/// Decode a 20 byte name slot into the name and the number of values it
/// stands for. An empty slot stands for no values.
pub fn decode_name(field: &'static str, raw: &[u8; NAME_LEN]) -> Result<(String, usize)> {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    if end == 0 {
        return Ok((String::new(), 0));
    }
    let latin1 = |bytes: &[u8]| bytes.iter().map(|&b| b as char).collect::<String>();
    let parts: Vec<&[u8]> = raw[..end].split(|&b| b == 0).collect();
    match parts.as_slice() {
        [name] => Ok((latin1(name), 1)),
        [name, count] => latin1(count)
            .parse::<usize>()
            .map(|count| (latin1(name), count))
            .map_err(|_| TrkError::InvalidName(field, latin1(&raw[..end]))),
        _ => Err(TrkError::InvalidName(field, latin1(&raw[..end]))),
    }
}

/// Encode a name standing for `count` values into a 20 byte name slot.
pub fn encode_name(name: &str, count: usize) -> Result<[u8; NAME_LEN]> {
    let mut encoded: Vec<u8> = name.chars().map(|c| c as u32 as u8).collect();
    if name.chars().any(|c| c as u32 > 0xFF) || encoded.contains(&0) {
        return Err(TrkError::InvalidName("attribute", name.to_string()));
    }
    if count > 1 {
        encoded.push(0);
        encoded.extend(count.to_string().bytes());
    }
    if encoded.len() > NAME_LEN {
        return Err(TrkError::NameTooLong(name.to_string()));
    }
    let mut slot = [0u8; NAME_LEN];
    slot[..encoded.len()].copy_from_slice(&encoded);
    Ok(slot)
}

fn names_layout(
    field: &'static str,
    names: &[[u8; NAME_LEN]; MAX_NAMES],
    total: i16,
    leftover: &str,
) -> Result<Vec<(String, Range<usize>)>> {
    let total = total.max(0) as usize;
    // slots are stale when there are no values to name
    if total == 0 {
        return Ok(Vec::new());
    }
    let mut layout = Vec::new();
    let mut cpt = 0;
    for raw in names {
        let (name, count) = decode_name(field, raw)?;
        if count == 0 {
            continue;
        }
        layout.push((name, cpt..cpt + count));
        cpt += count;
    }
    if cpt > total {
        return Err(TrkError::InvalidCode(
            if field == "scalar" { "n_scalars" } else { "n_properties" },
            total as i32,
        ));
    }
    if cpt < total {
        layout.push((leftover.to_string(), cpt..total));
    }
    Ok(layout)
}
