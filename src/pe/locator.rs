//! Locates the resource table of a PE image.
//!
//! [`crate::pe::locator::ResourceLocator`] validates the DOS and PE signatures, selects the
//! optional header variant, reads the resource entry (index 2) of the data directory array and
//! finds the section that contains it. The resulting
//! [`crate::pe::locator::ResourceLocation`] carries everything the resource walker needs:
//! the file offset of the resource table, the base RVA of its section, and the section table
//! for translating the RVAs stored in leaf entries.
//!
//! # Failure Modes
//!
//! | Condition | Error |
//! |---|---|
//! | No `MZ` or no `PE\0\0` | [`crate::Error::NotAPeFile`] |
//! | Magic neither `0x10B` nor `0x20B` | [`crate::Error::UnsupportedOptionalHeader`] |
//! | Fewer than 3 data directories, or resource RVA/size is zero | [`crate::Error::NoResourcesPresent`] |
//! | No section covers the resource RVA | [`crate::Error::ResourceSectionNotFound`] |
//! | Any header outside the file | [`crate::Error::OutOfBounds`] |

use log::debug;

use crate::{
    pe::{
        read_section_table, rva::RvaTranslator, DataDirectory, DosHeader, OptionalHeaderKind,
        PeHeader, SectionHeader, DATA_DIRECTORY_SIZE, RESOURCE_DIRECTORY_INDEX,
    },
    Error, File, Result,
};

/// Where the resource table lives, in both address spaces.
#[derive(Debug, Clone)]
pub struct ResourceLocation {
    /// Optional header variant of the image
    pub kind: OptionalHeaderKind,
    /// RVA and size of the resource table, from the data directory
    pub directory: DataDirectory,
    /// File offset of the resource table (the root resource directory node)
    pub table_offset: usize,
    /// RVA of the section that contains the resource table
    pub section_rva: u32,
    /// File offset of the section that contains the resource table
    pub section_offset: usize,
    /// The image's section table
    pub sections: Vec<SectionHeader>,
}

impl ResourceLocation {
    /// A translator over the image's section table.
    #[must_use]
    pub fn translator(&self) -> RvaTranslator<'_> {
        RvaTranslator::new(&self.sections)
    }
}

/// Finds the resource table in a PE image.
pub struct ResourceLocator;

impl ResourceLocator {
    /// Validate the headers of `file` and locate its resource table.
    ///
    /// # Errors
    /// See the module level table of failure modes.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use peicon::{pe::locator::ResourceLocator, File};
    /// use std::path::Path;
    ///
    /// let file = File::from_file(Path::new("setup.exe"))?;
    /// let location = ResourceLocator::locate(&file)?;
    /// println!(
    ///     "{} image, resources at file offset 0x{:X} ({} bytes)",
    ///     location.kind, location.table_offset, location.directory.size
    /// );
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn locate(file: &File) -> Result<ResourceLocation> {
        let dos = DosHeader::read(file)?;
        let pe = PeHeader::read(file, dos.pe_header_offset as usize)?;

        let optional_header = pe.optional_header_offset();
        let kind = OptionalHeaderKind::from_magic(file.read_le::<u16>(optional_header)?)?;

        let directory_count =
            file.read_le::<u32>(optional_header + kind.rva_and_sizes_offset())?;
        if directory_count as usize <= RESOURCE_DIRECTORY_INDEX {
            return Err(Error::NoResourcesPresent);
        }

        let directory = DataDirectory::read(
            file,
            optional_header
                + kind.data_directory_offset()
                + RESOURCE_DIRECTORY_INDEX * DATA_DIRECTORY_SIZE,
        )?;
        if directory.is_empty() {
            return Err(Error::NoResourcesPresent);
        }

        let sections = read_section_table(file, pe.section_table_offset(), pe.number_of_sections)?;

        let section = RvaTranslator::new(&sections)
            .section_for(directory.virtual_address)
            .ok_or(Error::ResourceSectionNotFound(directory.virtual_address))?;

        let section_rva = section.virtual_address;
        let section_offset = section.pointer_to_raw_data as usize;
        let table_offset = section_offset
            .checked_add((directory.virtual_address - section_rva) as usize)
            .ok_or(Error::OutOfBounds)?;

        debug!(
            "{} image with {} sections, resource table at RVA 0x{:X} ({} bytes) in section '{}' [{:?}], file offset 0x{:X}",
            kind,
            sections.len(),
            directory.virtual_address,
            directory.size,
            section.name(),
            section.characteristics,
            table_offset
        );

        Ok(ResourceLocation {
            kind,
            directory,
            table_offset,
            section_rva,
            section_offset,
            sections,
        })
    }
}
