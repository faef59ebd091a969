//! PGM (binary, P5) image I/O — the controller's image-loading and
//! snapshotting collaborator.
//!
//! [`ImageSource`] and [`ImageSink`] are the interfaces the controller
//! actually calls; [`FilePgm`] is the minimum viable concrete instance
//! so the controller is runnable end to end.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Reads a named image (row-major alive/dead bytes) from storage.
pub trait ImageSource {
    /// Read `width * height` bytes for the image named `name`.
    fn read(&self, name: &str, width: usize, height: usize) -> Result<Vec<u8>>;
}

/// Writes a named image (row-major alive/dead bytes) to storage.
pub trait ImageSink {
    /// Write `bytes` (row-major, `width * height` long) under `name`.
    fn write(&self, name: &str, width: usize, height: usize, bytes: &[u8]) -> Result<()>;
}

/// Binary-PGM (P5) files in a directory, named `{W}x{H}` for input and
/// `{W}x{H}x{turn}` for output, with no extension appended.
#[derive(Debug, Clone)]
pub struct FilePgm {
    dir: PathBuf,
}

impl FilePgm {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ImageSource for FilePgm {
    fn read(&self, name: &str, width: usize, height: usize) -> Result<Vec<u8>> {
        let path = self.path(name);
        let bytes = fs::read(&path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        let body = strip_pgm_header(&bytes, &path)?;
        if body.len() != width * height {
            return Err(Error::SizeMismatch {
                path: path.display().to_string(),
                expected: width * height,
                actual: body.len(),
            });
        }
        Ok(body.to_vec())
    }
}

impl ImageSink for FilePgm {
    fn write(&self, name: &str, width: usize, height: usize, bytes: &[u8]) -> Result<()> {
        debug_assert_eq!(bytes.len(), width * height);
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let path = self.path(name);
        let mut file = fs::File::create(&path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        write!(file, "P5\n{width} {height}\n255\n").map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

/// Strip a binary-PGM header (`P5\n<width> <height>\n<maxval>\n`),
/// returning the raw pixel bytes that follow.
fn strip_pgm_header<'a>(bytes: &'a [u8], path: &Path) -> Result<&'a [u8]> {
    let text_prefix_len = bytes.len().min(64);
    let header_region = std::str::from_utf8(&bytes[..text_prefix_len]).unwrap_or("");
    if !header_region.starts_with("P5") {
        return Err(Error::BadHeader {
            path: path.display().to_string(),
        });
    }

    // Walk past three whitespace-delimited tokens after the magic number:
    // width, height, maxval, each followed by a single whitespace byte.
    let mut pos = 2usize; // past "P5"
    for _ in 0..3 {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err(Error::BadHeader {
                path: path.display().to_string(),
            });
        }
        pos += 1; // consume the single whitespace byte terminating the token
    }

    Ok(&bytes[pos..])
}
