//! Cursor based byte parser for PE and resource structures.
//!
//! [`crate::file::parser::Parser`] keeps a position inside a borrowed byte slice and offers
//! bounds-checked, little-endian reads on top of [`crate::file::io`]. It is used wherever a
//! structure is consumed field by field: resource directory nodes and their entries, group
//! icon directories, and UTF-16 resource names.
//!
//! # Usage Examples
//!
//! ```rust
//! use peicon::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! let first = parser.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! parser.seek(6)?;
//! assert_eq!(parser.read_le::<u16>()?, 0x0807);
//! # Ok::<(), peicon::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, PeIO},
    Result,
};

/// A cursor over a byte slice with bounds-checked little-endian reads.
///
/// All navigation and read operations validate data availability first, so a truncated
/// or hostile input results in [`crate::Error::OutOfBounds`] instead of a panic.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.seek(2)?;
    /// assert_eq!(parser.read_le::<u8>()?, 0x03);
    /// assert!(parser.seek(4).is_err());
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// Advancing to exactly the end of the data is allowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(out_of_bounds_error!()),
        }
    }

    /// Read a value of type `T` in little-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    pub fn read_le<T: PeIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        let Some(bytes) = self.data.get(self.position..end) else {
            return Err(out_of_bounds_error!());
        };

        self.position = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn sequential_reads() {
        let data = [0x4D, 0x5A, 0x50, 0x45, 0x00, 0x00];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u16>().unwrap(), 0x5A4D);
        assert_eq!(parser.read_le::<u32>().unwrap(), 0x0000_4550);
        assert!(matches!(parser.read_le::<u8>(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn seek_bounds() {
        let data = [0x00, 0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);

        assert!(parser.seek(3).is_ok());
        assert!(matches!(parser.seek(4), Err(Error::OutOfBounds)));
        assert_eq!(parser.read_le::<u8>().unwrap(), 0x03);
    }

    #[test]
    fn advance_to_end_and_beyond() {
        let data = [0x00; 12];
        let mut parser = Parser::new(&data);

        parser.advance_by(12).unwrap();
        assert!(parser.read_le::<u8>().is_err());
        assert!(parser.advance_by(1).is_err());

        let data = [0x00, 0x00, 0x5A, 0x4D];
        let mut parser = Parser::new(&data);
        parser.advance_by(2).unwrap();
        assert!(parser.advance_by(usize::MAX).is_err());
        assert_eq!(parser.read_le::<u16>().unwrap(), 0x4D5A);
    }

    #[test]
    fn read_bytes_slices() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        parser.advance_by(1).unwrap();
        assert_eq!(parser.read_bytes(3).unwrap(), &[0x02, 0x03, 0x04]);
        assert!(parser.read_bytes(2).is_err());
        assert_eq!(parser.read_bytes(1).unwrap(), &[0x05]);
        assert!(parser.read_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn empty_parser() {
        let mut parser = Parser::new(&[]);
        assert!(matches!(parser.read_le::<u8>(), Err(Error::OutOfBounds)));
        assert!(parser.seek(0).is_err());
        assert!(parser.read_bytes(0).unwrap().is_empty());
    }
}
