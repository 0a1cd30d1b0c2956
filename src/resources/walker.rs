//! Walks the resource tree down to the icon payload.
//!
//! The walk visits the three tree levels with the generic node reader:
//!
//! 1. Type level: both `RT_GROUP_ICON` and `RT_ICON` must be present as subdirectories.
//! 2. `RT_GROUP_ICON`: the first name/ID entry, its first language, its leaf. The leaf holds a
//!    GRPICONDIR whose first record names the RT_ICON id to use.
//! 3. `RT_ICON`: the entry with that id (or the first entry if the group cannot be used), its
//!    first language, its leaf. The leaf's bytes are the icon payload.
//!
//! Every choice is "first encountered, depth-first"; there is no ranking by size or depth.

use log::{debug, warn};

use crate::{
    ico,
    pe::locator::ResourceLocation,
    resources::{
        directory::{ResourceDataEntry, ResourceDirectory, ResourceEntry, ResourceId, ResourceLevel},
        group::{GroupIconDir, GroupIconEntry},
        types::ResourceType,
    },
    Error, File, Result,
};

/// Leaf resources larger than this are rejected unless configured otherwise.
pub const DEFAULT_MAX_RESOURCE_SIZE: u32 = 16 * 1024 * 1024;

/// The RT_ICON resource selected by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResource {
    /// Raw payload: a headerless DIB, or a PNG stream
    pub data: Vec<u8>,
    /// Name or id of the RT_ICON entry
    pub id: ResourceId,
    /// Language of the RT_ICON entry
    pub language: ResourceId,
    /// The leaf data entry the payload was read from
    pub entry: ResourceDataEntry,
    /// Name or id of the RT_GROUP_ICON entry that was walked
    pub group: ResourceId,
    /// The group record describing this image, if the group was resolved to it
    pub group_entry: Option<GroupIconEntry>,
}

impl IconResource {
    /// `true` if the payload is a PNG stream rather than a DIB.
    #[must_use]
    pub fn is_png(&self) -> bool {
        ico::is_png(&self.data)
    }

    /// The payload as a standalone ICO file, see [`crate::ico::reconstruct`].
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the payload does not fit an ICO entry.
    pub fn to_ico(&self) -> Result<Vec<u8>> {
        ico::reconstruct(&self.data)
    }

    /// The payload as an ICO file whose directory entry describes the actual image.
    ///
    /// Size and depth come from the payload's own header, then from the group record, and
    /// fall back to the fixed values of [`crate::ico::reconstruct`]. Decoders that check the
    /// entry against the image accept this file for any icon size.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the payload does not fit an ICO entry.
    pub fn to_sized_ico(&self) -> Result<Vec<u8>> {
        let info = ico::IcoImageInfo::from_payload(&self.data)
            .or_else(|| self.group_entry.as_ref().map(ico::IcoImageInfo::from_group))
            .unwrap_or(ico::IcoImageInfo::FIXED);

        ico::reconstruct_with(&self.data, &info)
    }

    /// Bytes a standard image decoder accepts: PNG payloads as-is, DIB payloads wrapped into
    /// an ICO file.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a DIB payload does not fit an ICO entry.
    pub fn to_image_bytes(&self) -> Result<Vec<u8>> {
        if self.is_png() {
            Ok(self.data.clone())
        } else {
            self.to_ico()
        }
    }
}

/// Walks the resource tree of one located image.
pub struct IconWalker<'a> {
    file: &'a File,
    location: &'a ResourceLocation,
    table: &'a [u8],
    resolve_group: bool,
    max_resource_size: u32,
}

impl<'a> IconWalker<'a> {
    /// Create a walker over the resource table found by the locator.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the resource table starts past the end of `file`.
    pub fn new(file: &'a File, location: &'a ResourceLocation) -> Result<Self> {
        let remaining = file
            .len()
            .checked_sub(location.table_offset)
            .ok_or(Error::OutOfBounds)?;
        let table = file.data_slice(location.table_offset, remaining)?;

        Ok(IconWalker {
            file,
            location,
            table,
            resolve_group: true,
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
        })
    }

    /// Follow the group's first record into RT_ICON (default), or take the first RT_ICON entry.
    #[must_use]
    pub fn with_group_resolution(mut self, resolve: bool) -> Self {
        self.resolve_group = resolve;
        self
    }

    /// Reject leaf resources larger than `limit` bytes.
    #[must_use]
    pub fn with_size_limit(mut self, limit: u32) -> Self {
        self.max_resource_size = limit;
        self
    }

    /// Walk the tree and read the selected icon.
    ///
    /// # Errors
    /// - [`Error::IconResourceNotFound`] if a required type is missing or a level is empty
    /// - [`Error::RvaOutOfRange`] if a leaf RVA is not covered by any section
    /// - [`Error::OutOfBounds`] if a node, leaf or payload lies outside the file
    /// - [`Error::Malformed`] for entries pointing the wrong way, or oversized payloads
    pub fn find_icon(&self) -> Result<IconResource> {
        let root = self.directory(0, ResourceLevel::Type)?;

        let groups_offset = Self::type_subdirectory(&root, ResourceType::GroupIcon)?;
        let icons_offset = Self::type_subdirectory(&root, ResourceType::Icon)?;

        let groups = self.directory(groups_offset, ResourceLevel::Name)?;
        let group = groups.first().ok_or(Error::IconResourceNotFound)?;
        let (_, group_leaf) = self.first_leaf(group)?;

        let icons = self.directory(icons_offset, ResourceLevel::Name)?;
        if icons.is_empty() {
            return Err(Error::IconResourceNotFound);
        }

        let group_id = group.id(self.table)?;
        let (icon, group_entry) = if self.resolve_group {
            self.resolve(&group_id, &group_leaf, &icons)
        } else {
            (icons.first().ok_or(Error::IconResourceNotFound)?, None)
        };

        let (language, leaf) = self.first_leaf(icon)?;
        let data = self.read_leaf(&leaf)?.to_vec();
        let icon_id = icon.id(self.table)?;

        debug!(
            "Selected {} {} (language {}) from {} {}: {} bytes at RVA 0x{:X}",
            ResourceType::Icon,
            icon_id,
            language,
            ResourceType::GroupIcon,
            group_id,
            data.len(),
            leaf.data_rva
        );

        Ok(IconResource {
            data,
            id: icon_id,
            language,
            entry: leaf,
            group: group_id,
            group_entry,
        })
    }

    /// Pick the RT_ICON entry named by the group, falling back to the first one.
    fn resolve<'d>(
        &self,
        group: &ResourceId,
        group_leaf: &ResourceDataEntry,
        icons: &'d ResourceDirectory,
    ) -> (&'d ResourceEntry, Option<GroupIconEntry>) {
        let resolved = self
            .read_leaf(group_leaf)
            .and_then(GroupIconDir::parse)
            .and_then(|dir| {
                let record = dir.entries.first().copied().ok_or_else(|| {
                    malformed_error!("Group icon {} lists no images", group)
                })?;
                let entry = icons.find_id(record.id).ok_or_else(|| {
                    malformed_error!("Group icon {} refers to missing icon #{}", group, record.id)
                })?;
                Ok((entry, Some(record)))
            });

        match resolved {
            Ok(found) => found,
            Err(error) => {
                warn!(
                    "Unusable {} {} ({}), using the first {} entry",
                    ResourceType::GroupIcon,
                    group,
                    error,
                    ResourceType::Icon
                );
                // `icons` was checked to be non-empty by the caller
                (&icons.entries[0], None)
            }
        }
    }

    fn directory(&self, offset: u32, level: ResourceLevel) -> Result<ResourceDirectory> {
        let directory = ResourceDirectory::read(self.table, offset as usize, level)?;
        debug!(
            "{} level node at 0x{:X}: {} named, {} id entries",
            level, offset, directory.named_entries, directory.id_entries
        );
        Ok(directory)
    }

    fn type_subdirectory(root: &ResourceDirectory, kind: ResourceType) -> Result<u32> {
        root.find_id(kind.id())
            .and_then(ResourceEntry::subdirectory)
            .ok_or(Error::IconResourceNotFound)
    }

    /// From a name-level entry: first language, then its leaf.
    fn first_leaf(&self, entry: &ResourceEntry) -> Result<(ResourceId, ResourceDataEntry)> {
        let Some(languages_offset) = entry.subdirectory() else {
            return Err(malformed_error!(
                "Resource {} points to a leaf instead of a language directory",
                entry.key
            ));
        };

        let languages = self.directory(languages_offset, ResourceLevel::Language)?;
        let language = languages.first().ok_or(Error::IconResourceNotFound)?;

        let Some(leaf_offset) = language.leaf() else {
            return Err(malformed_error!(
                "Language {} of resource {} points to a directory instead of a leaf",
                language.key,
                entry.key
            ));
        };

        let leaf = ResourceDataEntry::read(self.table, leaf_offset as usize)?;
        Ok((language.id(self.table)?, leaf))
    }

    /// The bytes a leaf describes.
    fn read_leaf(&self, leaf: &ResourceDataEntry) -> Result<&'a [u8]> {
        if leaf.size == 0 {
            return Err(malformed_error!(
                "Resource at RVA 0x{:X} is empty",
                leaf.data_rva
            ));
        }
        if leaf.size > self.max_resource_size {
            return Err(malformed_error!(
                "Resource at RVA 0x{:X} is {} bytes, limit is {}",
                leaf.data_rva,
                leaf.size,
                self.max_resource_size
            ));
        }

        let offset = self.location.translator().file_offset(leaf.data_rva)?;
        self.file.data_slice(offset, leaf.size as usize)
    }
}
