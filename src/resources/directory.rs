//! Generic reader for resource directory nodes and leaf data entries.
//!
//! A resource tree has three levels (type, name/ID, language) that all share one node layout:
//!
//! ```text
//! +0   Characteristics        u32
//! +4   TimeDateStamp          u32
//! +8   MajorVersion           u16
//! +10  MinorVersion           u16
//! +12  NumberOfNamedEntries   u16
//! +14  NumberOfIdEntries      u16
//! +16  entries                8 bytes each, named entries first
//! ```
//!
//! Each entry is a name field and a target field. If the high bit of the name field is set,
//! the low 31 bits are the offset of a length-prefixed UTF-16 string; otherwise the low 16 bits
//! are an integer id. If the high bit of the target field is set, the low 31 bits are the offset
//! of another directory node; otherwise they are the offset of a 16-byte
//! [`crate::resources::directory::ResourceDataEntry`]. All offsets are relative to the start of
//! the resource table.
//!
//! Entry names are not decoded while a node is read. [`crate::resources::directory::EntryKey`]
//! keeps the offset of the string, and [`crate::resources::directory::ResourceEntry::id`]
//! decodes it on request, so only the entries a walk selects pay for their names.

use std::fmt;

use widestring::U16String;

use crate::{file::parser::Parser, Result};

/// Size of the fixed node header, including the two entry counts.
pub const DIRECTORY_HEADER_SIZE: usize = 16;
/// Size of one directory entry.
pub const DIRECTORY_ENTRY_SIZE: usize = 8;
/// Size of a leaf data entry.
pub const DATA_ENTRY_SIZE: usize = 16;

const HIGH_BIT: u32 = 0x8000_0000;

/// The level of the resource tree a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ResourceLevel {
    /// Root, keyed by resource type
    Type,
    /// Keyed by resource name or integer id
    Name,
    /// Keyed by language id, entries point to leaves
    Language,
}

/// The key of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// Integer id (resource type, resource id, or language id depending on the level)
    Id(u16),
    /// Named entry
    Name(String),
}

impl ResourceId {
    /// The integer id, if this is not a named entry.
    #[must_use]
    pub fn as_id(&self) -> Option<u16> {
        match self {
            ResourceId::Id(id) => Some(*id),
            ResourceId::Name(_) => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "#{}", id),
            ResourceId::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

/// The key of a directory entry as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
    /// Integer id
    Id(u16),
    /// Named entry, offset of its length-prefixed UTF-16 string in the resource table
    Name(u32),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Id(id) => write!(f, "#{}", id),
            EntryKey::Name(offset) => write!(f, "name@0x{:X}", offset),
        }
    }
}

/// Where a directory entry points, as an offset relative to the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTarget {
    /// Another directory node
    Directory(u32),
    /// A leaf [`ResourceDataEntry`]
    Data(u32),
}

/// One entry of a directory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Type, name/id, or language of this entry
    pub key: EntryKey,
    /// Subdirectory or leaf this entry points to
    pub target: EntryTarget,
}

impl ResourceEntry {
    /// The key of this entry, with a name decoded from `table`.
    ///
    /// Invalid UTF-16 code units are replaced.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the name extends past the end of `table`.
    pub fn id(&self, table: &[u8]) -> Result<ResourceId> {
        match self.key {
            EntryKey::Id(id) => Ok(ResourceId::Id(id)),
            EntryKey::Name(offset) => Ok(ResourceId::Name(read_name(table, offset as usize)?)),
        }
    }

    /// The subdirectory offset, or `None` if this entry points to a leaf.
    #[must_use]
    pub fn subdirectory(&self) -> Option<u32> {
        match self.target {
            EntryTarget::Directory(offset) => Some(offset),
            EntryTarget::Data(_) => None,
        }
    }

    /// The leaf offset, or `None` if this entry points to a subdirectory.
    #[must_use]
    pub fn leaf(&self) -> Option<u32> {
        match self.target {
            EntryTarget::Data(offset) => Some(offset),
            EntryTarget::Directory(_) => None,
        }
    }
}

/// A parsed directory node.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    /// Level of the tree this node was read at
    pub level: ResourceLevel,
    /// Reserved, usually zero
    pub characteristics: u32,
    /// Creation time written by the resource compiler
    pub time_date_stamp: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Number of entries keyed by name
    pub named_entries: u16,
    /// Number of entries keyed by integer id
    pub id_entries: u16,
    /// All entries, in on-disk order
    pub entries: Vec<ResourceEntry>,
}

impl ResourceDirectory {
    /// Read the node at `offset` of the resource table `table`, tagging it with `level`.
    ///
    /// Names of named entries are left undecoded, see [`ResourceEntry::id`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the node or one of its entries extends past the
    /// end of `table`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use peicon::resources::directory::{EntryKey, EntryTarget, ResourceDirectory, ResourceLevel};
    ///
    /// // Root with a single id entry: RT_ICON (3) -> subdirectory at 0x18
    /// let mut table = vec![0u8; 24];
    /// table[14] = 1;
    /// table[16] = 3;
    /// table[20..24].copy_from_slice(&0x8000_0018_u32.to_le_bytes());
    ///
    /// let root = ResourceDirectory::read(&table, 0, ResourceLevel::Type)?;
    /// assert_eq!(root.entries[0].key, EntryKey::Id(3));
    /// assert_eq!(root.entries[0].target, EntryTarget::Directory(0x18));
    /// # Ok::<(), peicon::Error>(())
    /// ```
    pub fn read(table: &[u8], offset: usize, level: ResourceLevel) -> Result<ResourceDirectory> {
        let mut parser = Parser::new(table);
        parser.seek(offset)?;

        let characteristics = parser.read_le::<u32>()?;
        let time_date_stamp = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let named_entries = parser.read_le::<u16>()?;
        let id_entries = parser.read_le::<u16>()?;

        let count = usize::from(named_entries) + usize::from(id_entries);
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let name = parser.read_le::<u32>()?;
            let target = parser.read_le::<u32>()?;

            let key = if name & HIGH_BIT != 0 {
                EntryKey::Name(name & !HIGH_BIT)
            } else {
                EntryKey::Id(name as u16)
            };

            let target = if target & HIGH_BIT != 0 {
                EntryTarget::Directory(target & !HIGH_BIT)
            } else {
                EntryTarget::Data(target)
            };

            entries.push(ResourceEntry { key, target });
        }

        Ok(ResourceDirectory {
            level,
            characteristics,
            time_date_stamp,
            major_version,
            minor_version,
            named_entries,
            id_entries,
            entries,
        })
    }

    /// `true` if the node has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry in on-disk order.
    #[must_use]
    pub fn first(&self) -> Option<&ResourceEntry> {
        self.entries.first()
    }

    /// The first entry with integer id `id`.
    #[must_use]
    pub fn find_id(&self, id: u16) -> Option<&ResourceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key == EntryKey::Id(id))
    }
}

/// Length-prefixed UTF-16LE string at `offset`.
fn read_name(table: &[u8], offset: usize) -> Result<String> {
    let mut parser = Parser::new(table);
    parser.seek(offset)?;

    let length = parser.read_le::<u16>()?;
    let mut units = Vec::with_capacity(usize::from(length));
    for _ in 0..length {
        units.push(parser.read_le::<u16>()?);
    }

    Ok(U16String::from_vec(units).to_string_lossy())
}

/// A leaf of the resource tree: where the resource bytes are and how many there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDataEntry {
    /// RVA of the resource bytes (an RVA, unlike every other offset in the tree)
    pub data_rva: u32,
    /// Size of the resource in bytes
    pub size: u32,
    /// Code page used to decode code point values in the resource
    pub code_page: u32,
    /// Reserved, must be zero
    pub reserved: u32,
}

impl ResourceDataEntry {
    /// Read the leaf at `offset` of the resource table `table`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the 16-byte entry does not fit in `table`.
    pub fn read(table: &[u8], offset: usize) -> Result<ResourceDataEntry> {
        let mut parser = Parser::new(table);
        parser.seek(offset)?;

        Ok(ResourceDataEntry {
            data_rva: parser.read_le::<u32>()?,
            size: parser.read_le::<u32>()?,
            code_page: parser.read_le::<u32>()?,
            reserved: parser.read_le::<u32>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::directory_node, Error};

    #[test]
    fn id_entries() {
        let table = directory_node(0, 2, &[(3, 0x8000_0020), (14, 0x8000_0040)]);
        let root = ResourceDirectory::read(&table, 0, ResourceLevel::Type).unwrap();

        assert_eq!(root.level, ResourceLevel::Type);
        assert_eq!(root.named_entries, 0);
        assert_eq!(root.id_entries, 2);
        assert_eq!(root.entries.len(), 2);
        assert_eq!(root.find_id(14).unwrap().subdirectory(), Some(0x40));
        assert_eq!(root.find_id(3).unwrap().subdirectory(), Some(0x20));
        assert!(root.find_id(24).is_none());
    }

    #[test]
    fn leaf_entries() {
        let table = directory_node(0, 1, &[(0x0409, 0x30)]);
        let languages = ResourceDirectory::read(&table, 0, ResourceLevel::Language).unwrap();

        let first = languages.first().unwrap();
        assert_eq!(first.key, EntryKey::Id(0x0409));
        assert_eq!(first.leaf(), Some(0x30));
        assert_eq!(first.subdirectory(), None);
    }

    #[test]
    fn named_entries() {
        let mut table = directory_node(1, 1, &[(0x8000_0020, 0x8000_0040), (1, 0x8000_0060)]);
        table.resize(0x20, 0);
        // "APP" as a counted UTF-16 string
        table.extend_from_slice(&[0x03, 0x00, b'A', 0x00, b'P', 0x00, b'P', 0x00]);

        let names = ResourceDirectory::read(&table, 0, ResourceLevel::Name).unwrap();
        assert_eq!(names.entries[0].key, EntryKey::Name(0x20));
        assert_eq!(names.entries[0].key.to_string(), "name@0x20");

        let named = names.entries[0].id(&table).unwrap();
        let numbered = names.entries[1].id(&table).unwrap();
        assert_eq!(named, ResourceId::Name("APP".to_string()));
        assert_eq!(named.as_id(), None);
        assert_eq!(numbered.as_id(), Some(1));
        assert_eq!(named.to_string(), "\"APP\"");
        assert_eq!(numbered.to_string(), "#1");
    }

    #[test]
    fn empty_node() {
        let table = directory_node(0, 0, &[]);
        let node = ResourceDirectory::read(&table, 0, ResourceLevel::Name).unwrap();

        assert!(node.is_empty());
        assert!(node.first().is_none());
    }

    #[test]
    fn node_at_offset() {
        let mut table = vec![0xFF; 0x10];
        table.extend(directory_node(0, 1, &[(7, 0x8000_0000)]));

        let node = ResourceDirectory::read(&table, 0x10, ResourceLevel::Name).unwrap();
        assert_eq!(node.first().unwrap().key, EntryKey::Id(7));
    }

    #[test]
    fn truncated_entries() {
        // Claims two entries, carries one
        let mut table = directory_node(0, 2, &[(3, 0x8000_0020)]);
        table.truncate(DIRECTORY_HEADER_SIZE + DIRECTORY_ENTRY_SIZE);

        assert!(matches!(
            ResourceDirectory::read(&table, 0, ResourceLevel::Type),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn node_past_end() {
        let table = directory_node(0, 0, &[]);
        assert!(matches!(
            ResourceDirectory::read(&table, 0x100, ResourceLevel::Type),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            ResourceDirectory::read(&table, 8, ResourceLevel::Type),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn name_past_end() {
        let table = directory_node(1, 0, &[(0x8000_1000, 0x8000_0000)]);
        let node = ResourceDirectory::read(&table, 0, ResourceLevel::Name).unwrap();

        assert_eq!(node.first().unwrap().key, EntryKey::Name(0x1000));
        assert!(matches!(
            node.first().unwrap().id(&table),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn shared_long_name_is_not_decoded() {
        // 4000 named entries, all pointing at one string of 0xFFFF code units
        let count = 4000_u16;
        let name_offset =
            (DIRECTORY_HEADER_SIZE + usize::from(count) * DIRECTORY_ENTRY_SIZE) as u32;
        let entries: Vec<(u32, u32)> = (0..count)
            .map(|_| (name_offset | HIGH_BIT, 0x8000_0000))
            .collect();

        let mut table = directory_node(count, 0, &entries);
        table.extend_from_slice(&0xFFFF_u16.to_le_bytes());
        table.resize(table.len() + 0xFFFF * 2, 0);

        let root = ResourceDirectory::read(&table, 0, ResourceLevel::Type).unwrap();
        assert_eq!(root.entries.len(), 4000);
        assert!(root
            .entries
            .iter()
            .all(|entry| entry.key == EntryKey::Name(name_offset)));
        assert!(root.find_id(3).is_none());

        match root.entries[3999].id(&table).unwrap() {
            ResourceId::Name(name) => assert_eq!(name.chars().count(), 0xFFFF),
            ResourceId::Id(_) => panic!("expected a named entry"),
        }
    }

    #[test]
    fn data_entry() {
        #[rustfmt::skip]
        let table: [u8; 20] = [
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x30, 0x00, 0x00,
            0xFE, 0x02, 0x00, 0x00,
            0xE4, 0x04, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let entry = ResourceDataEntry::read(&table, 4).unwrap();
        assert_eq!(entry.data_rva, 0x3000);
        assert_eq!(entry.size, 766);
        assert_eq!(entry.code_page, 1252);
        assert_eq!(entry.reserved, 0);

        assert!(matches!(
            ResourceDataEntry::read(&table, 8),
            Err(Error::OutOfBounds)
        ));
    }
}
