//! RVA to file offset translation.
//!
//! Every address stored in PE metadata after the data directory (resource table, leaf data
//! entries) is a relative virtual address. On disk, such an address only exists inside the
//! section that covers it, at `PointerToRawData + (rva - VirtualAddress)`. An RVA that no
//! section covers is a malformed file and is reported as [`crate::Error::RvaOutOfRange`];
//! there is no identity-mapping fallback.

use crate::{pe::SectionHeader, Error, Result};

/// Maps RVAs to file offsets using a section table.
///
/// # Examples
///
/// ```rust
/// use peicon::pe::{rva::RvaTranslator, SectionCharacteristics, SectionHeader};
///
/// let sections = [SectionHeader {
///     name: *b".rsrc\0\0\0",
///     virtual_size: 0x1000,
///     virtual_address: 0x3000,
///     size_of_raw_data: 0x1000,
///     pointer_to_raw_data: 0x1200,
///     characteristics: SectionCharacteristics::MEM_READ,
/// }];
///
/// let translator = RvaTranslator::new(&sections);
/// assert_eq!(translator.file_offset(0x3000)?, 0x1200);
/// assert_eq!(translator.file_offset(0x3010)?, 0x1210);
/// assert!(translator.file_offset(0x4000).is_err());
/// # Ok::<(), peicon::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RvaTranslator<'a> {
    sections: &'a [SectionHeader],
}

impl<'a> RvaTranslator<'a> {
    /// Create a translator over a section table.
    #[must_use]
    pub fn new(sections: &'a [SectionHeader]) -> Self {
        RvaTranslator { sections }
    }

    /// The first section whose RVA range contains `rva`.
    #[must_use]
    pub fn section_for(&self, rva: u32) -> Option<&'a SectionHeader> {
        self.sections.iter().find(|section| section.contains_rva(rva))
    }

    /// Translate `rva` into a file offset.
    ///
    /// # Errors
    /// Returns [`Error::RvaOutOfRange`] if no section contains `rva`.
    pub fn file_offset(&self, rva: u32) -> Result<usize> {
        let section = self.section_for(rva).ok_or(Error::RvaOutOfRange(rva))?;

        let delta = rva - section.virtual_address;
        let offset = u64::from(section.pointer_to_raw_data) + u64::from(delta);

        usize::try_from(offset).map_err(|_| Error::RvaOutOfRange(rva))
    }
}

/// Translate `rva` into a file offset against `sections`.
///
/// Convenience wrapper around [`RvaTranslator::file_offset`].
///
/// # Errors
/// Returns [`Error::RvaOutOfRange`] if no section contains `rva`.
pub fn file_offset(rva: u32, sections: &[SectionHeader]) -> Result<usize> {
    RvaTranslator::new(sections).file_offset(rva)
}
