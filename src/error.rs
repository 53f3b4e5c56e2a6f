//! Types for error handling go here.

use crate::format::ContainerFormat;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by the TrackVis codec.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum TrkError {
        /// The file does not start with the `TRACK` magic string.
        InvalidMagic(magic: [u8; 6]) {
            display("Invalid TrackVis file: bad magic string {:?}", magic)
        }
        /// The header size field is 1000 in neither byte order.
        InvalidHeaderSize(size: i32) {
            display("Invalid TrackVis header size {} (expected 1000)", size)
        }
        /// A header field holds a code outside of its known set.
        InvalidCode(typename: &'static str, code: i32) {
            display("invalid code `{}` for header field {}", code, typename)
        }
        /// A scalar or property name field could not be decoded.
        InvalidName(field: &'static str, name: String) {
            display("Malformed {} name {:?}: unused characters should be \\0", field, name)
        }
        /// The voxel order is not a permutation of one letter per axis.
        InvalidVoxelOrder(order: String) {
            display("Invalid voxel order {:?}", order)
        }
        /// An attribute name does not fit in its 20 byte header slot.
        NameTooLong(name: String) {
            display("Attribute name {:?} does not fit in 20 bytes", name)
        }
        /// More named attributes than the header can describe.
        TooManyAttributes(kind: &'static str, count: usize) {
            display("Too many {} attributes: {} (at most 10 names)", kind, count)
        }
        /// A streamline record claims a negative number of points.
        NegativePointCount(index: usize, count: i32) {
            display("Streamline #{} has a negative point count ({})", index, count)
        }
        /// The body ended in the middle of a streamline record, or before
        /// the number of streamlines announced in the header.
        Truncated(index: usize) {
            display("Unexpected end of file while reading streamline #{}", index)
        }
        /// An attribute series does not have one entry per streamline (or point).
        AttributeLength(name: String, expected: usize, got: usize) {
            display("Attribute {:?} has {} entries, expected {}", name, got, expected)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from the codec.
pub type Result<T> = ::std::result::Result<T, TrkError>;

quick_error! {
    /// Failures of the seed extraction pipeline.
    ///
    /// Each variant is terminal: no partial result is ever returned.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum SeedError {
        /// The container is not a TrackVis file. Raised before any parsing.
        UnsupportedFormat(path: PathBuf, detected: ContainerFormat) {
            display("Invalid input streamline file format (must be trk): {} is {}",
                    path.display(), detected)
        }
        /// The TrackVis codec could not read the file.
        Load(path: PathBuf, err: TrkError) {
            source(err)
            display("Could not load {}: {}", path.display(), err)
        }
        /// The tractogram has no per-streamline attribute under this key.
        MissingAttribute(key: String) {
            display("Tractogram does not contain {}", key)
        }
        /// The attribute exists but its entries cannot be read as 3D points.
        MalformedAttribute(key: String, width: usize) {
            display("Attribute {:?} holds {} values per streamline, not a multiple of 3", key, width)
        }
    }
}
