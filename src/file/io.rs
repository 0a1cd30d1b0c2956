//! Low-level little-endian reading and writing utilities for PE parsing.
//!
//! Every multi-byte field of a PE image (DOS header, COFF header, optional header, section
//! table, resource directory) and of the ICO container is little-endian. This module provides
//! the bounds-checked primitives the rest of the crate is built on: a value is either read
//! completely from the buffer, or the call fails with [`crate::Error::OutOfBounds`]. No read
//! ever indexes past the end of the input.
//!
//! # Key Components
//!
//! - [`crate::file::io::PeIO`] - Trait tying a primitive type to its fixed-size byte array
//! - [`crate::file::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//! - [`crate::file::io::write_le_at`] - Write a value at an offset and advance the offset
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use peicon::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x5A4D_u16)?;
//! write_le_at(&mut data, &mut offset, 0x0000_4550_u32)?;
//!
//! offset = 0;
//! let dos: u16 = read_le_at(&data, &mut offset)?;
//! let pe: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((dos, pe, offset), (0x5A4D, 0x4550, 6));
//! # Ok::<(), peicon::Error>(())
//! ```

use crate::Result;

/// Trait for implementing type-specific safe binary data reading and writing.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array for that type (e.g. `[u8; 4]` for `u32`), so the reading functions know how
/// many bytes to consume.
pub trait PeIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_pe_io {
    ($($ty:ty => $n:literal),* $(,)?) => {
        $(
            impl PeIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_pe_io!(u8 => 1, u16 => 2, u32 => 4);

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `size_of::<T>()`.
pub fn read_le<T: PeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`.
///
/// On success `offset` is advanced by the size of `T`; on failure it is left untouched.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `offset + size_of::<T>()` exceeds the buffer.
pub fn read_le_at<T: PeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };

    let Some(slice) = data.get(*offset..end) else {
        return Err(out_of_bounds_error!());
    };

    let Ok(bytes) = T::Bytes::try_from(slice) else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(bytes))
}

/// Safely writes `value` in little-endian byte order at `offset`.
///
/// On success `offset` is advanced by the size of `T`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small to hold the value.
pub fn write_le_at<T: PeIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();

    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(out_of_bounds_error!());
    };

    let Some(target) = data.get_mut(*offset..end) else {
        return Err(out_of_bounds_error!());
    };

    target.copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u8() {
        let result = read_le::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_le_u16() {
        let result = read_le::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_le_u32() {
        let result = read_le::<u32>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0403_0201);
    }

    #[test]
    fn read_le_at_advances() {
        let mut offset = 2;
        let first = read_le_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        let second = read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap();

        assert_eq!(first, 0x0403);
        assert_eq!(second, 0x0807_0605);
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_le_at_out_of_bounds_keeps_offset() {
        let mut offset = 6;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);

        assert!(matches!(result, Err(Error::OutOfBounds)));
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_le_at_offset_overflow() {
        let mut offset = usize::MAX - 1;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds)));
    }

    #[test]
    fn read_le_empty() {
        assert!(read_le::<u8>(&[]).is_err());
    }

    #[test]
    fn write_le_at_sequence() {
        let mut data = [0u8; 8];
        let mut offset = 0;

        write_le_at(&mut data, &mut offset, 0x0201_u16).unwrap();
        write_le_at(&mut data, &mut offset, 0x0605_0403_u32).unwrap();
        write_le_at(&mut data, &mut offset, 0x07_u8).unwrap();

        assert_eq!(offset, 7);
        assert_eq!(data, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x00]);
    }

    #[test]
    fn write_le_at_too_small() {
        let mut data = [0u8; 3];
        let mut offset = 0;

        let result = write_le_at(&mut data, &mut offset, 0xDEAD_BEEF_u32);
        assert!(matches!(result, Err(Error::OutOfBounds)));
        assert_eq!(offset, 0);
        assert_eq!(data, [0, 0, 0]);
    }
}
