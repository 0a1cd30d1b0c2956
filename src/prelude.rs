//! # peicon Prelude
//!
//! The types and functions most icon extraction code needs, in one import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The error type for all peicon operations
pub use crate::Error;

/// The result type used throughout peicon
pub use crate::Result;

// ================================================================================================
// Entry Points
// ================================================================================================

/// Typed extraction and its options
pub use crate::extractor::{ExtractOptions, IconExtractor};

/// `Option`-returning convenience functions
pub use crate::extractor::{extract_icon, extract_icon_image, extract_icons};

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Pipeline Stages
// ================================================================================================

/// Resource table location
pub use crate::pe::locator::{ResourceLocation, ResourceLocator};

/// RVA translation
pub use crate::pe::rva::RvaTranslator;

/// Resource tree walk
pub use crate::resources::walker::{IconResource, IconWalker};

/// Resource tree nodes
pub use crate::resources::directory::{ResourceDataEntry, ResourceDirectory, ResourceId};

/// Resource type ids
pub use crate::resources::types::ResourceType;

/// ICO reconstruction
pub use crate::ico::{reconstruct, reconstruct_with, IcoImageInfo};
