//! Random-access byte source for PE images.
//!
//! Icon extraction only ever needs two things from its input: its length, and bounds-checked
//! slices at arbitrary offsets. This module provides both through the [`crate::file::Backend`]
//! trait and the [`crate::file::File`] wrapper that the locator, the resource walker and the
//! extractor operate on.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Owned, read-only view of one PE image
//! - [`crate::file::Backend`] - Trait for different data sources
//! - [`crate::file::parser::Parser`] - Cursor for field-by-field parsing
//! - [`crate::file::io`] - Little-endian read/write primitives
//!
//! ## Backend Implementations
//! - `Physical` - Memory-mapped file on disk
//! - `Memory` - Owned in-memory buffer
//!
//! # Examples
//!
//! ```rust,no_run
//! use peicon::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("setup.exe"))?;
//! let signature = file.data_slice(0, 2)?;
//! assert_eq!(signature, b"MZ");
//! # Ok::<(), peicon::Error>(())
//! ```
//!
//! # Resource Discipline
//!
//! A [`crate::file::File`] owns its backend. For disk files that is a read-only memory map
//! which keeps the handle open; both are released when the `File` is dropped, so a `File`
//! created inside an extraction call never outlives it.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::{
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use crate::{file::io::PeIO, Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of PE data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe so independent files can be
/// processed on worker threads.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds or if
    /// `offset + len` overflows.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded, read-only PE image.
///
/// Unlike a full PE parser, `File` performs no validation when it is created beyond rejecting
/// empty input. Header validation is the job of [`crate::pe::locator::ResourceLocator`], which
/// reports a typed error for every structural problem it finds.
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl File {
    /// Loads a PE file from the given path by memory-mapping it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and
    /// [`crate::Error::Empty`] if it has no content.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] if the buffer is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::{Error, File};
    ///
    /// assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    ///
    /// let file = File::from_mem(b"MZ".to_vec())?;
    /// assert_eq!(file.len(), 2);
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Loads a PE file from any seekable reader.
    ///
    /// The reader is rewound to its start and read completely into memory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if seeking or reading fails, and
    /// [`crate::Error::Empty`] if the stream has no content.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<File> {
        reader.seek(SeekFrom::Start(0))?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        Self::from_mem(data)
    }

    /// Internal loader for any backend.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the raw data of the loaded file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range is outside the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Reads a little-endian value of type `T` at a file offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the value does not fit inside the file.
    pub fn read_le<T: PeIO>(&self, offset: usize) -> Result<T> {
        let bytes = self.data_slice(offset, std::mem::size_of::<T>())?;
        io::read_le::<T>(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Cursor;

    #[test]
    fn from_mem_rejects_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn read_le_at_file_offsets() {
        let mut data = vec![0u8; 0x40];
        data[0..2].copy_from_slice(b"MZ");
        data[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());

        let file = File::from_mem(data).unwrap();
        assert_eq!(file.read_le::<u16>(0).unwrap(), 0x5A4D);
        assert_eq!(file.read_le::<u32>(0x3C).unwrap(), 0x80);
        assert!(matches!(file.read_le::<u32>(0x3D), Err(Error::OutOfBounds)));
        assert!(matches!(
            file.read_le::<u16>(usize::MAX),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn from_reader_rewinds() {
        let mut cursor = Cursor::new(vec![0x4D, 0x5A, 0x00, 0x01]);
        cursor.set_position(3);

        let file = File::from_reader(cursor).unwrap();
        assert_eq!(file.len(), 4);
        assert_eq!(file.data_slice(0, 2).unwrap(), b"MZ");
    }

    #[test]
    fn from_reader_empty() {
        let cursor = Cursor::new(Vec::<u8>::new());
        assert!(matches!(File::from_reader(cursor), Err(Error::Empty)));
    }

    #[test]
    fn from_file_missing() {
        let result = File::from_file(Path::new("/nonexistent/peicon/missing.exe"));
        assert!(matches!(result, Err(Error::FileError(_))));
    }
}
