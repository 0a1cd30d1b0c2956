//! Resource tree parsing.
//!
//! The resource table of a PE image is a three-level tree (type, name/ID, language) of
//! directory nodes whose leaves describe where the actual resource bytes are. This module
//! reads nodes generically and walks the tree to the icon the image presents in Explorer.
//!
//! # Key Components
//!
//! - [`crate::resources::types::ResourceType`] - The predefined `RT_*` type ids
//! - [`crate::resources::directory::ResourceDirectory`] - One directory node, read at any level
//! - [`crate::resources::directory::ResourceDataEntry`] - A leaf: RVA and size of the bytes
//! - [`crate::resources::group::GroupIconDir`] - The RT_GROUP_ICON payload
//! - [`crate::resources::walker::IconWalker`] - Selects and reads the icon payload
//!
//! # Examples
//!
//! ```rust,no_run
//! use peicon::{pe::locator::ResourceLocator, resources::walker::IconWalker, File};
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("setup.exe"))?;
//! let location = ResourceLocator::locate(&file)?;
//! let icon = IconWalker::new(&file, &location)?.find_icon()?;
//!
//! println!("icon {} ({} bytes, png: {})", icon.id, icon.data.len(), icon.is_png());
//! # Ok::<(), peicon::Error>(())
//! ```

pub mod directory;
pub mod group;
pub mod types;
pub mod walker;
