//! The RT_GROUP_ICON payload (GRPICONDIR).
//!
//! A group icon resource does not contain pixels. It lists the RT_ICON resources that make up
//! one logical icon, one 14-byte record per image:
//!
//! ```text
//! GRPICONDIR       reserved u16, type u16 (1 = icon), count u16
//! GRPICONDIRENTRY  width u8, height u8, colors u8, reserved u8,
//!                  planes u16, bit_count u16, bytes_in_res u32, id u16
//! ```
//!
//! The layout matches an ICO file's directory except that the trailing field is an RT_ICON
//! id instead of a file offset, which is why records are 14 bytes instead of 16.

use crate::{file::parser::Parser, Result};

/// Size of the GRPICONDIR header.
pub const GROUP_HEADER_SIZE: usize = 6;
/// Size of one GRPICONDIRENTRY.
pub const GROUP_ENTRY_SIZE: usize = 14;
/// Value of the `type` field for icons (cursors use 2).
pub const GROUP_TYPE_ICON: u16 = 1;

/// One image listed by a group icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupIconEntry {
    /// Width in pixels, 0 means 256
    pub width: u8,
    /// Height in pixels, 0 means 256
    pub height: u8,
    /// Palette size, 0 for true color
    pub color_count: u8,
    /// Reserved
    pub reserved: u8,
    /// Color planes
    pub planes: u16,
    /// Bits per pixel
    pub bit_count: u16,
    /// Size of the RT_ICON resource in bytes
    pub bytes_in_res: u32,
    /// Id of the RT_ICON resource holding the image
    pub id: u16,
}

impl GroupIconEntry {
    /// Width in pixels with the 0 = 256 convention applied.
    #[must_use]
    pub fn real_width(&self) -> u32 {
        if self.width == 0 {
            256
        } else {
            u32::from(self.width)
        }
    }

    /// Height in pixels with the 0 = 256 convention applied.
    #[must_use]
    pub fn real_height(&self) -> u32 {
        if self.height == 0 {
            256
        } else {
            u32::from(self.height)
        }
    }
}

/// A parsed GRPICONDIR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIconDir {
    /// Reserved, zero
    pub reserved: u16,
    /// Resource type, [`GROUP_TYPE_ICON`] for icon groups
    pub kind: u16,
    /// Listed images, in on-disk order
    pub entries: Vec<GroupIconEntry>,
}

impl GroupIconDir {
    /// Parse a group icon payload.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the type field is not [`GROUP_TYPE_ICON`], and
    /// [`crate::Error::OutOfBounds`] if `data` is shorter than its entry count requires.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::resources::group::GroupIconDir;
    ///
    /// #[rustfmt::skip]
    /// let data = [
    ///     0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    ///     0x30, 0x30, 0x00, 0x00, 0x01, 0x00, 0x20, 0x00, 0xA8, 0x25, 0x00, 0x00, 0x05, 0x00,
    /// ];
    ///
    /// let group = GroupIconDir::parse(&data)?;
    /// assert_eq!(group.entries.len(), 1);
    /// assert_eq!(group.entries[0].real_width(), 48);
    /// assert_eq!(group.first_icon_id(), Some(5));
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn parse(data: &[u8]) -> Result<GroupIconDir> {
        let mut parser = Parser::new(data);

        let reserved = parser.read_le::<u16>()?;
        let kind = parser.read_le::<u16>()?;
        if kind != GROUP_TYPE_ICON {
            return Err(malformed_error!(
                "Group resource has type {} instead of {}",
                kind,
                GROUP_TYPE_ICON
            ));
        }

        let count = parser.read_le::<u16>()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            entries.push(GroupIconEntry {
                width: parser.read_le::<u8>()?,
                height: parser.read_le::<u8>()?,
                color_count: parser.read_le::<u8>()?,
                reserved: parser.read_le::<u8>()?,
                planes: parser.read_le::<u16>()?,
                bit_count: parser.read_le::<u16>()?,
                bytes_in_res: parser.read_le::<u32>()?,
                id: parser.read_le::<u16>()?,
            });
        }

        Ok(GroupIconDir {
            reserved,
            kind,
            entries,
        })
    }

    /// The RT_ICON id of the first listed image.
    #[must_use]
    pub fn first_icon_id(&self) -> Option<u16> {
        self.entries.first().map(|entry| entry.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::group_icon_dir, Error};

    #[test]
    fn multiple_entries() {
        let data = group_icon_dir(&[(16, 16, 32, 1128, 2), (0, 0, 32, 270_376, 7)]);
        let group = GroupIconDir::parse(&data).unwrap();

        assert_eq!(group.kind, GROUP_TYPE_ICON);
        assert_eq!(group.entries.len(), 2);
        assert_eq!(group.first_icon_id(), Some(2));

        let large = &group.entries[1];
        assert_eq!(large.real_width(), 256);
        assert_eq!(large.real_height(), 256);
        assert_eq!(large.bit_count, 32);
        assert_eq!(large.bytes_in_res, 270_376);
        assert_eq!(large.id, 7);
    }

    #[test]
    fn zero_entries() {
        let data = group_icon_dir(&[]);
        let group = GroupIconDir::parse(&data).unwrap();

        assert!(group.entries.is_empty());
        assert_eq!(group.first_icon_id(), None);
    }

    #[test]
    fn cursor_group_rejected() {
        let mut data = group_icon_dir(&[(32, 32, 1, 308, 1)]);
        data[2] = 2;

        assert!(matches!(
            GroupIconDir::parse(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated() {
        let data = group_icon_dir(&[(32, 32, 32, 4264, 1)]);

        assert!(matches!(
            GroupIconDir::parse(&data[..GROUP_HEADER_SIZE + GROUP_ENTRY_SIZE - 1]),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(GroupIconDir::parse(&data[..3]), Err(Error::OutOfBounds)));
    }
}
