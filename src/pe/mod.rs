//! PE header structures needed to reach the resource table.
//!
//! Only the subset of the PE/COFF format that leads to `.rsrc` is modelled here: the DOS
//! header's `e_lfanew`, the PE signature and COFF header, the optional header magic and its
//! data directory array, and the section table. Everything is read through
//! [`crate::File::read_le`], so a truncated header surfaces as
//! [`crate::Error::OutOfBounds`].
//!
//! # Layout
//!
//! ```text
//! 0x00        DOS header ("MZ")            e_lfanew at 0x3C
//! e_lfanew    "PE\0\0"                     4 bytes
//!   +4        COFF header                  20 bytes, NumberOfSections at +2
//!   +24       optional header              SizeOfOptionalHeader bytes
//!     +96/112   data directories           8 bytes each, resources at index 2
//!   +24+SizeOfOptionalHeader
//!             section table                40 bytes per section
//! ```
//!
//! # Key Components
//!
//! - [`crate::pe::DosHeader`], [`crate::pe::PeHeader`] - Signatures and header offsets
//! - [`crate::pe::OptionalHeaderKind`] - PE32 / PE32+ variant selection
//! - [`crate::pe::DataDirectory`] - RVA + size of a data directory entry
//! - [`crate::pe::SectionHeader`] - One section table record
//! - [`crate::pe::rva`] - RVA to file offset translation
//! - [`crate::pe::locator`] - Finds the resource table

pub mod locator;
pub mod rva;

use bitflags::bitflags;

use crate::{Error, File, Result};

/// "MZ"
pub const DOS_SIGNATURE: u16 = 0x5A4D;
/// "PE\0\0"
pub const PE_SIGNATURE: u32 = 0x0000_4550;
/// Offset of `e_lfanew` inside the DOS header.
pub const DOS_PE_OFFSET_FIELD: usize = 0x3C;
/// Size of the COFF file header that follows the PE signature.
pub const COFF_HEADER_SIZE: usize = 20;
/// Size of the PE signature plus the COFF file header.
pub const NT_HEADERS_PREFIX_SIZE: usize = 4 + COFF_HEADER_SIZE;
/// Optional header magic of 32-bit images.
pub const PE32_MAGIC: u16 = 0x10B;
/// Optional header magic of 64-bit images.
pub const PE32_PLUS_MAGIC: u16 = 0x20B;
/// Size of one data directory entry.
pub const DATA_DIRECTORY_SIZE: usize = 8;
/// Index of the resource table in the data directory array.
pub const RESOURCE_DIRECTORY_INDEX: usize = 2;
/// Size of one section table record.
pub const SECTION_HEADER_SIZE: usize = 40;

/// The legacy MZ header. Only the signature and `e_lfanew` are of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosHeader {
    /// Must equal [`DOS_SIGNATURE`]
    pub signature: u16,
    /// File offset of the PE signature (`e_lfanew`)
    pub pe_header_offset: u32,
}

impl DosHeader {
    /// Read and validate the DOS header at the start of `file`.
    ///
    /// # Errors
    /// Returns [`Error::NotAPeFile`] if the file does not start with `MZ`, or
    /// [`Error::OutOfBounds`] if it is too short to hold `e_lfanew`.
    pub fn read(file: &File) -> Result<Self> {
        let signature = file.read_le::<u16>(0)?;
        if signature != DOS_SIGNATURE {
            return Err(Error::NotAPeFile);
        }

        let pe_header_offset = file.read_le::<u32>(DOS_PE_OFFSET_FIELD)?;

        Ok(DosHeader {
            signature,
            pe_header_offset,
        })
    }
}

/// PE signature and the COFF header fields the locator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeHeader {
    /// File offset of the PE signature
    pub offset: usize,
    /// `Machine` field of the COFF header
    pub machine: u16,
    /// Number of records in the section table
    pub number_of_sections: u16,
    /// Size of the optional header, which locates the section table
    pub size_of_optional_header: u16,
}

impl PeHeader {
    /// Read and validate the PE signature and COFF header at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::NotAPeFile`] on a signature mismatch, or [`Error::OutOfBounds`] if
    /// the header lies outside the file.
    pub fn read(file: &File, offset: usize) -> Result<Self> {
        if file.read_le::<u32>(offset)? != PE_SIGNATURE {
            return Err(Error::NotAPeFile);
        }

        let coff = offset.checked_add(4).ok_or(Error::OutOfBounds)?;

        Ok(PeHeader {
            offset,
            machine: file.read_le::<u16>(coff)?,
            number_of_sections: file.read_le::<u16>(coff + 2)?,
            size_of_optional_header: file.read_le::<u16>(coff + 16)?,
        })
    }

    /// File offset of the optional header.
    #[must_use]
    pub fn optional_header_offset(&self) -> usize {
        self.offset + NT_HEADERS_PREFIX_SIZE
    }

    /// File offset of the first section table record.
    #[must_use]
    pub fn section_table_offset(&self) -> usize {
        self.optional_header_offset() + usize::from(self.size_of_optional_header)
    }
}

/// The two optional header layouts, selected by the header's magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OptionalHeaderKind {
    /// 32-bit image, magic `0x10B`
    #[strum(serialize = "PE32")]
    Pe32,
    /// 64-bit image, magic `0x20B`
    #[strum(serialize = "PE32+")]
    Pe32Plus,
}

impl OptionalHeaderKind {
    /// Select the variant for an optional header magic.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedOptionalHeader`] for any other magic (e.g. ROM images).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::pe::OptionalHeaderKind;
    ///
    /// assert_eq!(OptionalHeaderKind::from_magic(0x20B)?, OptionalHeaderKind::Pe32Plus);
    /// assert!(OptionalHeaderKind::from_magic(0x107).is_err());
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn from_magic(magic: u16) -> Result<Self> {
        match magic {
            PE32_MAGIC => Ok(OptionalHeaderKind::Pe32),
            PE32_PLUS_MAGIC => Ok(OptionalHeaderKind::Pe32Plus),
            other => Err(Error::UnsupportedOptionalHeader(other)),
        }
    }

    /// Offset of the data directory array from the start of the optional header.
    #[must_use]
    pub fn data_directory_offset(self) -> usize {
        match self {
            OptionalHeaderKind::Pe32 => 96,
            OptionalHeaderKind::Pe32Plus => 112,
        }
    }

    /// Offset of `NumberOfRvaAndSizes` from the start of the optional header.
    #[must_use]
    pub fn rva_and_sizes_offset(self) -> usize {
        self.data_directory_offset() - 4
    }
}

/// RVA and size of one data directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataDirectory {
    /// RVA of the table
    pub virtual_address: u32,
    /// Size of the table in bytes
    pub size: u32,
}

impl DataDirectory {
    /// Read a data directory entry at a file offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the entry lies outside the file.
    pub fn read(file: &File, offset: usize) -> Result<Self> {
        Ok(DataDirectory {
            virtual_address: file.read_le::<u32>(offset)?,
            size: file.read_le::<u32>(offset.checked_add(4).ok_or(Error::OutOfBounds)?)?,
        })
    }

    /// `true` if either the RVA or the size is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.virtual_address == 0 || self.size == 0
    }
}

bitflags! {
    /// Section `Characteristics` flags relevant for inspecting a resource section.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionCharacteristics: u32 {
        /// The section contains executable code
        const CNT_CODE = 0x0000_0020;
        /// The section contains initialized data
        const CNT_INITIALIZED_DATA = 0x0000_0040;
        /// The section contains uninitialized data
        const CNT_UNINITIALIZED_DATA = 0x0000_0080;
        /// The section can be discarded as needed
        const MEM_DISCARDABLE = 0x0200_0000;
        /// The section can be shared in memory
        const MEM_SHARED = 0x1000_0000;
        /// The section can be executed as code
        const MEM_EXECUTE = 0x2000_0000;
        /// The section can be read
        const MEM_READ = 0x4000_0000;
        /// The section can be written to
        const MEM_WRITE = 0x8000_0000;
    }
}

/// One 40-byte section table record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Raw, NUL padded section name
    pub name: [u8; 8],
    /// Size of the section once loaded
    pub virtual_size: u32,
    /// RVA of the first byte of the section
    pub virtual_address: u32,
    /// Size of the section's data on disk
    pub size_of_raw_data: u32,
    /// File offset of the section's data
    pub pointer_to_raw_data: u32,
    /// Section flags
    pub characteristics: SectionCharacteristics,
}

impl SectionHeader {
    /// Read a section table record at a file offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the record lies outside the file.
    pub fn read(file: &File, offset: usize) -> Result<Self> {
        let record = file.data_slice(offset, SECTION_HEADER_SIZE)?;
        let mut parser = crate::Parser::new(record);

        let mut name = [0_u8; 8];
        name.copy_from_slice(parser.read_bytes(8)?);

        let virtual_size = parser.read_le::<u32>()?;
        let virtual_address = parser.read_le::<u32>()?;
        let size_of_raw_data = parser.read_le::<u32>()?;
        let pointer_to_raw_data = parser.read_le::<u32>()?;

        // PointerToRelocations, PointerToLinenumbers, NumberOfRelocations, NumberOfLinenumbers
        parser.advance_by(12)?;
        let characteristics = SectionCharacteristics::from_bits_retain(parser.read_le::<u32>()?);

        Ok(SectionHeader {
            name,
            virtual_size,
            virtual_address,
            size_of_raw_data,
            pointer_to_raw_data,
            characteristics,
        })
    }

    /// Section name with trailing NUL padding removed.
    #[must_use]
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Number of RVA bytes the section covers.
    ///
    /// Some linkers leave `VirtualSize` at zero; the raw size is used for those sections.
    #[must_use]
    pub fn extent(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.virtual_size
        }
    }

    /// `true` if `rva` lies in `[virtual_address, virtual_address + extent)`.
    #[must_use]
    pub fn contains_rva(&self, rva: u32) -> bool {
        let start = u64::from(self.virtual_address);
        let end = start + u64::from(self.extent());
        (start..end).contains(&u64::from(rva))
    }
}

/// Read `count` consecutive section records starting at `offset`.
///
/// # Errors
/// Returns [`Error::OutOfBounds`] if the table extends past the end of the file.
pub fn read_section_table(file: &File, offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    let table_len = usize::from(count) * SECTION_HEADER_SIZE;
    // One range check for the whole table before reading records one by one.
    file.data_slice(offset, table_len)?;

    (0..usize::from(count))
        .map(|index| SectionHeader::read(file, offset + index * SECTION_HEADER_SIZE))
        .collect()
}
