use super::Backend;
use crate::{Error::OutOfBounds, Result};

/// Input backed by an owned byte buffer.
///
/// Used for [`crate::File::from_mem`] and [`crate::File::from_reader`], and by the tests that
/// synthesize PE images in memory.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create a new memory backend that takes ownership of `data`.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(OutOfBounds)
    }

    fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_header_slices() {
        let mut data = vec![0x00_u8; 0x200];
        data[0] = b'M';
        data[1] = b'Z';
        data[0x3C] = 0x80;
        data[0x80..0x84].copy_from_slice(b"PE\0\0");

        let memory = Memory::new(data);

        assert_eq!(memory.len(), 0x200);
        assert_eq!(memory.data_slice(0, 2).unwrap(), b"MZ");
        assert_eq!(memory.data_slice(0x80, 4).unwrap(), b"PE\0\0");
        assert!(memory.data_slice(0x1FF, 2).is_err());
    }

    #[test]
    fn test_memory_empty_buffer() {
        let memory = Memory::new(vec![]);

        assert_eq!(memory.len(), 0);
        assert_eq!(memory.data().len(), 0);

        assert!(memory.data_slice(0, 1).is_err());
        assert!(memory.data_slice(1, 0).is_err());
        let empty_slice: &[u8] = &[];
        assert_eq!(memory.data_slice(0, 0).unwrap(), empty_slice);
    }

    #[test]
    fn test_memory_offset_overflow() {
        let memory = Memory::new(vec![0x00; 100]);

        let result = memory.data_slice(usize::MAX, 1);
        assert!(matches!(result.unwrap_err(), OutOfBounds));

        let result = memory.data_slice(100, 1);
        assert!(matches!(result.unwrap_err(), OutOfBounds));

        let result = memory.data_slice(99, 2);
        assert!(matches!(result.unwrap_err(), OutOfBounds));
    }
}
