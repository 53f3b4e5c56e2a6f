//! Private utility module
use either::Either;
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Result as IoResult};
use std::path::{Path, PathBuf};

/// A reader which may or may not be gzip-decoded.
pub type MaybeGzDecoded<T> = Either<T, GzDecoder<T>>;

/// A file reader which may or may not be gzip-decoded.
pub type MaybeGzDecodedFile = MaybeGzDecoded<BufReader<File>>;

/// Check whether the given path names a gzip-compressed file.
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Open a file for reading, decoding it on the fly if its name ends
/// with ".gz".
pub fn open_file_maybe_gz<P>(path: P) -> IoResult<MaybeGzDecodedFile>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let stream = BufReader::new(File::open(path)?);
    if is_gz_file(path) {
        Ok(Either::Right(GzDecoder::new(stream)))
    } else {
        Ok(Either::Left(stream))
    }
}

/// Strip a trailing ".gz" from the path, if any.
pub fn without_gz_extension<P>(path: P) -> PathBuf
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_gz_file(path) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

/// Read as many bytes as possible into `buf`, stopping early only at
/// end of file. Returns the number of bytes read.
pub fn read_up_to<R: Read>(mut source: R, buf: &mut [u8]) -> IoResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Decode a NUL-padded latin-1 byte field into a string, stopping at the
/// first NUL.
pub fn trim_nul_latin1(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}
