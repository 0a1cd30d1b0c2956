//! Reconstruction of a standalone ICO file from an RT_ICON payload.
//!
//! RT_ICON resources store one image without any container: a `BITMAPINFOHEADER`-prefixed DIB
//! (XOR bitmap followed by the AND mask) or, for large icons, a complete PNG. An ICO file is
//! that payload behind a 6-byte header and one 16-byte directory entry:
//!
//! ```text
//! 00 00 01 00 01 00                       reserved, type = 1 (icon), count = 1
//! 00 00 00 00 01 00 20 00 <size> <22>     width, height, colors, reserved, planes,
//!                                         bit count, bytes in resource, image offset
//! <payload>
//! ```
//!
//! [`crate::ico::reconstruct`] writes width and height as 0 (256) and the bit count as 32
//! regardless of the payload. Decoders that check the directory entry against the image reject
//! such a file unless the image really is 256x256, so
//! [`crate::ico::reconstruct_with`] takes an [`crate::ico::IcoImageInfo`] read from the
//! payload's own header (`BITMAPINFOHEADER` or PNG `IHDR`) instead.
//!
//! # Examples
//!
//! ```rust
//! let payload = vec![0x28; 766];
//! let ico = peicon::ico::reconstruct(&payload)?;
//!
//! assert_eq!(ico.len(), 788);
//! assert_eq!(&ico[..6], &[0x00, 0x00, 0x01, 0x00, 0x01, 0x00]);
//! assert_eq!(&ico[22..], &payload[..]);
//! # Ok::<(), peicon::Error>(())
//! ```

use crate::{
    file::{io::write_le_at, parser::Parser},
    resources::group::GroupIconEntry,
    Result,
};

/// Size of the ICONDIR header.
pub const ICO_HEADER_SIZE: usize = 6;
/// Size of one ICONDIRENTRY.
pub const ICO_DIR_ENTRY_SIZE: usize = 16;
/// Offset of the image data in a single-image ICO file.
pub const ICO_IMAGE_OFFSET: usize = ICO_HEADER_SIZE + ICO_DIR_ENTRY_SIZE;
/// The eight-byte signature every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// Smallest `biSize` of a `BITMAPINFOHEADER`.
pub const BITMAPINFOHEADER_SIZE: u32 = 40;
/// `biSize` of a `BITMAPV5HEADER`, the largest DIB header.
pub const BITMAPV5HEADER_SIZE: u32 = 124;

/// `true` if `data` starts with the PNG signature.
#[must_use]
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// The ICONDIR header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoHeader {
    /// Reserved, zero
    pub reserved: u16,
    /// 1 for icons, 2 for cursors
    pub kind: u16,
    /// Number of directory entries that follow
    pub count: u16,
}

impl IcoHeader {
    /// Header of an icon file holding `count` images.
    #[must_use]
    pub fn icon(count: u16) -> Self {
        IcoHeader {
            reserved: 0,
            kind: 1,
            count,
        }
    }

    /// Serialize into `data` at `offset`, advancing it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too small.
    pub fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.reserved)?;
        write_le_at(data, offset, self.kind)?;
        write_le_at(data, offset, self.count)
    }
}

/// One ICONDIRENTRY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoDirEntry {
    /// Width in pixels, 0 means 256
    pub width: u8,
    /// Height in pixels, 0 means 256
    pub height: u8,
    /// Palette size, 0 for true color
    pub color_count: u8,
    /// Reserved, zero
    pub reserved: u8,
    /// Color planes
    pub planes: u16,
    /// Bits per pixel
    pub bit_count: u16,
    /// Size of the image data
    pub bytes_in_res: u32,
    /// File offset of the image data
    pub image_offset: u32,
}

impl IcoDirEntry {
    /// Serialize into `data` at `offset`, advancing it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too small.
    pub fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        write_le_at(data, offset, self.width)?;
        write_le_at(data, offset, self.height)?;
        write_le_at(data, offset, self.color_count)?;
        write_le_at(data, offset, self.reserved)?;
        write_le_at(data, offset, self.planes)?;
        write_le_at(data, offset, self.bit_count)?;
        write_le_at(data, offset, self.bytes_in_res)?;
        write_le_at(data, offset, self.image_offset)
    }
}

/// The image properties an ICONDIRENTRY describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Palette size, 0 for true color
    pub color_count: u8,
    /// Bits per pixel
    pub bit_count: u16,
}

impl IcoImageInfo {
    /// What [`reconstruct`] writes for every payload: 256x256, true color, 32 bpp.
    pub const FIXED: IcoImageInfo = IcoImageInfo {
        width: 256,
        height: 256,
        color_count: 0,
        bit_count: 32,
    };

    /// Read the size and depth from the payload's own header.
    ///
    /// PNG payloads are described by their `IHDR` chunk, DIB payloads by their
    /// `BITMAPINFOHEADER`, whose height covers the XOR bitmap and the AND mask and is halved.
    /// Returns `None` if neither header can be read.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::ico::IcoImageInfo;
    ///
    /// let mut dib = vec![0u8; 40];
    /// dib[0] = 40;
    /// dib[4] = 16;
    /// dib[8] = 32;
    /// dib[12] = 1;
    /// dib[14] = 4;
    ///
    /// let info = IcoImageInfo::from_payload(&dib).unwrap();
    /// assert_eq!((info.width, info.height, info.bit_count, info.color_count), (16, 16, 4, 16));
    /// ```
    #[must_use]
    pub fn from_payload(image: &[u8]) -> Option<IcoImageInfo> {
        if is_png(image) {
            return Self::from_png(image);
        }
        Self::from_dib(image).ok()
    }

    /// The size and depth a group icon record lists for its image.
    #[must_use]
    pub fn from_group(entry: &GroupIconEntry) -> IcoImageInfo {
        IcoImageInfo {
            width: entry.real_width(),
            height: entry.real_height(),
            color_count: entry.color_count,
            bit_count: entry.bit_count,
        }
    }

    fn from_png(image: &[u8]) -> Option<IcoImageInfo> {
        // Signature, IHDR length and tag, then big-endian width and height
        let ihdr = image.get(8..24)?;
        if &ihdr[4..8] != b"IHDR" {
            return None;
        }

        Some(IcoImageInfo {
            width: u32::from_be_bytes([ihdr[8], ihdr[9], ihdr[10], ihdr[11]]),
            height: u32::from_be_bytes([ihdr[12], ihdr[13], ihdr[14], ihdr[15]]),
            color_count: 0,
            bit_count: 32,
        })
    }

    fn from_dib(image: &[u8]) -> Result<IcoImageInfo> {
        let mut parser = Parser::new(image);

        let header_size = parser.read_le::<u32>()?;
        if !(BITMAPINFOHEADER_SIZE..=BITMAPV5HEADER_SIZE).contains(&header_size) {
            return Err(malformed_error!(
                "Unsupported DIB header size {}",
                header_size
            ));
        }

        let width = parser.read_le::<u32>()? as i32;
        let height = parser.read_le::<u32>()? as i32;
        let _planes = parser.read_le::<u16>()?;
        let bit_count = parser.read_le::<u16>()?;

        let color_count = match bit_count {
            1 | 2 | 4 => 1_u8 << bit_count,
            _ => 0,
        };

        Ok(IcoImageInfo {
            width: width.unsigned_abs(),
            height: height.unsigned_abs() / 2,
            color_count,
            bit_count,
        })
    }
}

/// An ICONDIRENTRY size byte: 0 stands for 256 and anything larger.
fn size_byte(pixels: u32) -> u8 {
    u8::try_from(pixels).unwrap_or(0)
}

/// Wrap one RT_ICON payload into a single-image ICO file.
///
/// The output is `22 + image.len()` bytes: the fixed header, one directory entry with
/// `bytes_in_res = image.len()` and `image_offset = 22`, then `image` unchanged.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `image` is larger than an ICO entry can describe.
pub fn reconstruct(image: &[u8]) -> Result<Vec<u8>> {
    reconstruct_with(image, &IcoImageInfo::FIXED)
}

/// [`reconstruct`] with a directory entry describing `info` instead of the fixed values.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `image` is larger than an ICO entry can describe.
pub fn reconstruct_with(image: &[u8], info: &IcoImageInfo) -> Result<Vec<u8>> {
    let Ok(bytes_in_res) = u32::try_from(image.len()) else {
        return Err(malformed_error!(
            "Icon payload of {} bytes does not fit an ICO entry",
            image.len()
        ));
    };

    let entry = IcoDirEntry {
        width: size_byte(info.width),
        height: size_byte(info.height),
        color_count: info.color_count,
        reserved: 0,
        planes: 1,
        bit_count: info.bit_count,
        bytes_in_res,
        image_offset: ICO_IMAGE_OFFSET as u32,
    };

    let mut ico = vec![0_u8; ICO_IMAGE_OFFSET + image.len()];
    let mut offset = 0_usize;
    IcoHeader::icon(1).write(&mut ico, &mut offset)?;
    entry.write(&mut ico, &mut offset)?;
    ico[offset..].copy_from_slice(image);

    Ok(ico)
}
