//! Byte-level access to class file data.
//!
//! This module is the foundation the structural codec is built on. It provides the
//! [`crate::file::File`] abstraction over the two ways class bytes reach the library
//! (memory-mapped from disk, or an in-memory buffer handed over by a classloading hook),
//! plus the shared big-endian I/O primitives ([`crate::file::io`]) and the bounds-checked
//! cursor ([`crate::file::parser::Parser`]) used by every decoder in the crate.

pub(crate) mod io;
pub mod parser;

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error, Result};

/// Backing storage for raw class file bytes.
///
/// Classes arriving from disk are memory-mapped to avoid copying them before the decode
/// pass; classes arriving from a classloading hook are already resident and are wrapped
/// as-is. Both variants expose the same borrowed byte slice to the codec.
///
/// # Examples
///
/// ```rust,no_run
/// use classweave::File;
///
/// let file = File::from_file("Widget.class".as_ref())?;
/// println!("{} bytes", file.data().len());
/// # Ok::<(), classweave::Error>(())
/// ```
pub enum File {
    /// A memory-mapped file on disk
    Physical(Mmap),
    /// An in-memory byte buffer
    Memory(Vec<u8>),
}

impl File {
    /// Memory-map a class file from disk.
    ///
    /// # Arguments
    /// * `path` - Path of the file to map
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and
    /// [`crate::Error::Empty`] for zero-length files.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;

        // SAFETY: the mapping is read-only and the backing file is not mutated by this
        // process while the map is alive.
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.is_empty() {
            return Err(Error::Empty);
        }

        Ok(File::Physical(mmap))
    }

    /// Wrap an in-memory byte buffer.
    ///
    /// # Arguments
    /// * `data` - The raw class bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if the buffer holds no bytes.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        Ok(File::Memory(data))
    }

    /// Borrow the underlying bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match self {
            File::Physical(mmap) => mmap,
            File::Memory(buffer) => buffer,
        }
    }

    /// Returns the length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if there is no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mem_wraps_buffer() {
        let file = File::from_mem(vec![0xCA, 0xFE]).unwrap();
        assert_eq!(file.data(), &[0xCA, 0xFE]);
        assert_eq!(file.len(), 2);
        assert!(!file.is_empty());
    }

    #[test]
    fn from_mem_rejects_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn from_file_missing_path() {
        assert!(File::from_file("does/not/exist.class".as_ref()).is_err());
    }
}
