//! Detection of streamline container formats.
//!
//! Detection never parses streamline content: it sniffs the magic string
//! at the start of the file and, failing that, looks at the file
//! extension. Only [`ContainerFormat::Trk`] is actually readable by this
//! crate; the others are recognised so that they can be rejected with a
//! meaningful message.

use crate::util::{open_file_maybe_gz, read_up_to, without_gz_extension};
use std::fmt;
use std::io::Result as IoResult;
use std::path::Path;

/// Magic string at the start of TrackVis files.
pub const MAGIC_TRK: &[u8] = b"TRACK";
/// Magic string at the start of MRtrix track files.
pub const MAGIC_TCK: &[u8] = b"mrtrix tracks";
/// Magic string at the start of legacy VTK files.
pub const MAGIC_VTK: &[u8] = b"# vtk DataFile";

/// Number of leading bytes inspected when sniffing a file.
const SNIFF_LEN: usize = 64;

/// Known streamline container formats.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ContainerFormat {
    /// TrackVis (`.trk`)
    Trk,
    /// MRtrix tracks (`.tck`)
    Tck,
    /// Legacy VTK polydata (`.vtk`)
    Vtk,
    /// Not recognised
    Unknown,
}

impl ContainerFormat {
    /// The conventional file extension of this format, without a dot.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ContainerFormat::Trk => Some("trk"),
            ContainerFormat::Tck => Some("tck"),
            ContainerFormat::Vtk => Some("vtk"),
            ContainerFormat::Unknown => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerFormat::Trk => "a TrackVis (.trk) file",
            ContainerFormat::Tck => "an MRtrix (.tck) file",
            ContainerFormat::Vtk => "a VTK (.vtk) file",
            ContainerFormat::Unknown => "of an unknown format",
        };
        f.write_str(name)
    }
}

/// Identify a format from the first bytes of a file.
pub fn detect_format_from_bytes(prefix: &[u8]) -> Option<ContainerFormat> {
    if prefix.starts_with(MAGIC_TRK) {
        Some(ContainerFormat::Trk)
    } else if prefix.starts_with(MAGIC_TCK) {
        Some(ContainerFormat::Tck)
    } else if prefix.starts_with(MAGIC_VTK) {
        Some(ContainerFormat::Vtk)
    } else {
        None
    }
}

/// Identify a format from the file name alone. A trailing ".gz" is ignored.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> ContainerFormat {
    let path = without_gz_extension(path);
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("trk") => ContainerFormat::Trk,
        Some("tck") => ContainerFormat::Tck,
        Some("vtk") => ContainerFormat::Vtk,
        _ => ContainerFormat::Unknown,
    }
}

/// Detect the container format of the file at `path`.
///
/// The magic string wins over the extension, so a MRtrix file renamed to
/// `.trk` is still reported as [`ContainerFormat::Tck`]. Files with a
/// ".gz" suffix are decompressed before sniffing.
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<ContainerFormat> {
    let path = path.as_ref();
    let mut prefix = [0u8; SNIFF_LEN];
    let stream = open_file_maybe_gz(path)?;
    let len = read_up_to(stream, &mut prefix)?;

    let format = detect_format_from_bytes(&prefix[..len])
        .unwrap_or_else(|| detect_format_from_extension(path));
    log::debug!("{}: detected {:?}", path.display(), format);
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_strings() {
        assert_eq!(
            detect_format_from_bytes(b"TRACK\0\x01\x00"),
            Some(ContainerFormat::Trk)
        );
        assert_eq!(
            detect_format_from_bytes(b"mrtrix tracks\nEND\n"),
            Some(ContainerFormat::Tck)
        );
        assert_eq!(
            detect_format_from_bytes(b"# vtk DataFile Version 3.0\n"),
            Some(ContainerFormat::Vtk)
        );
        assert_eq!(detect_format_from_bytes(b"TRAC"), None);
        assert_eq!(detect_format_from_bytes(b""), None);
    }

    #[test]
    fn extensions() {
        assert_eq!(detect_format_from_extension("a/b.trk"), ContainerFormat::Trk);
        assert_eq!(detect_format_from_extension("a/b.TRK"), ContainerFormat::Trk);
        assert_eq!(detect_format_from_extension("a/b.trk.gz"), ContainerFormat::Trk);
        assert_eq!(detect_format_from_extension("b.tck"), ContainerFormat::Tck);
        assert_eq!(detect_format_from_extension("b.vtk"), ContainerFormat::Vtk);
        assert_eq!(detect_format_from_extension("b.nii.gz"), ContainerFormat::Unknown);
        assert_eq!(detect_format_from_extension("b"), ContainerFormat::Unknown);
    }

    #[test]
    fn display_names_the_format() {
        assert_eq!(ContainerFormat::Tck.to_string(), "an MRtrix (.tck) file");
        assert_eq!(ContainerFormat::Trk.extension(), Some("trk"));
        assert_eq!(ContainerFormat::Unknown.extension(), None);
    }
}
