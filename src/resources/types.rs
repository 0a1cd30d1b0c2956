//! Predefined resource type ids.
//!
//! The type level of a resource tree keys its entries by these integer ids. Applications may
//! also define named types, which never match any [`crate::resources::types::ResourceType`].

use strum::{Display, EnumCount, EnumIter, FromRepr};

/// The predefined resource types (`RT_*`) that can appear at the type level of a resource tree.
///
/// The numeric values are the integer ids stored in type-level directory entries. Only
/// [`ResourceType::Icon`] and [`ResourceType::GroupIcon`] are consumed by the walker; the others
/// exist so type-level entries can be named in diagnostics.
///
/// ## Icon resources
/// - **`Icon`** (3): one image each, as a headerless DIB or a complete PNG
/// - **`GroupIcon`** (14): a GRPICONDIR listing the RT_ICON ids that form one logical icon
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, EnumIter, EnumCount, Display, FromRepr,
)]
#[repr(u16)]
pub enum ResourceType {
    /// Hardware-dependent cursor image
    #[strum(serialize = "RT_CURSOR")]
    Cursor = 1,
    /// Bitmap
    #[strum(serialize = "RT_BITMAP")]
    Bitmap = 2,
    /// Hardware-dependent icon image
    #[strum(serialize = "RT_ICON")]
    Icon = 3,
    /// Menu
    #[strum(serialize = "RT_MENU")]
    Menu = 4,
    /// Dialog box
    #[strum(serialize = "RT_DIALOG")]
    Dialog = 5,
    /// String table entry
    #[strum(serialize = "RT_STRING")]
    String = 6,
    /// Font directory
    #[strum(serialize = "RT_FONTDIR")]
    FontDir = 7,
    /// Font
    #[strum(serialize = "RT_FONT")]
    Font = 8,
    /// Accelerator table
    #[strum(serialize = "RT_ACCELERATOR")]
    Accelerator = 9,
    /// Application-defined raw data
    #[strum(serialize = "RT_RCDATA")]
    RcData = 10,
    /// Message table entry
    #[strum(serialize = "RT_MESSAGETABLE")]
    MessageTable = 11,
    /// Hardware-independent cursor group
    #[strum(serialize = "RT_GROUP_CURSOR")]
    GroupCursor = 12,
    /// Hardware-independent icon group
    #[strum(serialize = "RT_GROUP_ICON")]
    GroupIcon = 14,
    /// Version information
    #[strum(serialize = "RT_VERSION")]
    Version = 16,
    /// Dialog include file name
    #[strum(serialize = "RT_DLGINCLUDE")]
    DlgInclude = 17,
    /// Plug and Play resource
    #[strum(serialize = "RT_PLUGPLAY")]
    PlugPlay = 19,
    /// VXD
    #[strum(serialize = "RT_VXD")]
    Vxd = 20,
    /// Animated cursor
    #[strum(serialize = "RT_ANICURSOR")]
    AniCursor = 21,
    /// Animated icon
    #[strum(serialize = "RT_ANIICON")]
    AniIcon = 22,
    /// HTML resource
    #[strum(serialize = "RT_HTML")]
    Html = 23,
    /// Side-by-side assembly manifest
    #[strum(serialize = "RT_MANIFEST")]
    Manifest = 24,
}

impl ResourceType {
    /// The integer id used in type-level directory entries.
    #[must_use]
    pub fn id(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn icon_ids() {
        assert_eq!(ResourceType::Icon.id(), 3);
        assert_eq!(ResourceType::GroupIcon.id(), 14);
        assert_eq!(ResourceType::from_repr(14), Some(ResourceType::GroupIcon));
        assert_eq!(ResourceType::from_repr(13), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(ResourceType::Icon.to_string(), "RT_ICON");
        assert_eq!(ResourceType::GroupIcon.to_string(), "RT_GROUP_ICON");
    }

    #[test]
    fn ids_roundtrip() {
        assert_eq!(ResourceType::iter().count(), ResourceType::COUNT);
        for kind in ResourceType::iter() {
            assert_eq!(ResourceType::from_repr(kind.id()), Some(kind));
        }
    }
}
