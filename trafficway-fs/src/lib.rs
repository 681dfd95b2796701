//! Capability-based file helpers built on `cap-std` and `camino`.
//!
//! Every function opens the parent directory with ambient authority and then
//! works relative to that capability, so callers never touch `std::fs`
//! directly.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, BufReader};

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open `path` for line-oriented reading.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_buffered(path: &Utf8Path) -> io::Result<BufReader<fs_utf8::File>> {
    open_utf8_file(path).map(BufReader::new)
}

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
///
/// Fails when `path` has no file name or its parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether `path` exists and is a regular file.
///
/// # Errors
///
/// Returns [`io::ErrorKind::NotFound`] when the path or its parent is missing,
/// and other I/O errors when the metadata cannot be read.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}
