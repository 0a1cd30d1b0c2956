//! Icon extraction entry points.
//!
//! [`crate::extractor::IconExtractor`] runs the whole pipeline on one image (locate the
//! resource table, walk it, read the payload) and reports failures as typed
//! [`crate::Error`]s. The free functions [`crate::extractor::extract_icon`],
//! [`crate::extractor::extract_icon_image`] and [`crate::extractor::extract_icons`] wrap it for
//! callers that only care whether an icon is available: every failure becomes `None` and is
//! logged at debug level.
//!
//! Extraction never retries. The structures it reads are static, so a second attempt on the
//! same bytes cannot produce a different outcome.
//!
//! # Examples
//!
//! ```rust,no_run
//! use peicon::extractor::{extract_icon, IconExtractor};
//!
//! // Fire and forget
//! if let Some(ico) = extract_icon("setup.exe") {
//!     std::fs::write("setup.ico", ico)?;
//! }
//!
//! // With error details
//! let icon = IconExtractor::new().extract_path("setup.exe")?;
//! let image = IconExtractor::new().decode(&icon)?;
//! println!("{}x{}", image.width(), image.height());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use log::debug;
use rayon::prelude::*;

use crate::{
    pe::locator::ResourceLocator,
    resources::walker::{IconResource, IconWalker, DEFAULT_MAX_RESOURCE_SIZE},
    Error, File, Result,
};

type Attempt = std::result::Result<DynamicImage, String>;

/// Tunables for [`IconExtractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Try the raw payload before the reconstructed ICO when decoding
    pub decode_raw_first: bool,
    /// Largest leaf resource that will be read, in bytes
    pub max_resource_size: u32,
    /// Follow the group icon's first record into RT_ICON instead of taking the first RT_ICON
    pub resolve_group: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            decode_raw_first: true,
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            resolve_group: true,
        }
    }
}

impl ExtractOptions {
    /// Options that ignore the group icon and return the first RT_ICON entry of the tree.
    #[must_use]
    pub fn first_entry() -> Self {
        Self {
            resolve_group: false,
            ..Self::default()
        }
    }
}

/// Extracts the first usable icon from PE images.
///
/// The extractor holds no state besides its options and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct IconExtractor {
    options: ExtractOptions,
}

impl IconExtractor {
    /// An extractor with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor with custom options.
    #[must_use]
    pub fn with_options(options: ExtractOptions) -> Self {
        IconExtractor { options }
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the icon of an already loaded image.
    ///
    /// # Errors
    /// Any error of [`ResourceLocator::locate`] or [`IconWalker::find_icon`].
    pub fn extract(&self, file: &File) -> Result<IconResource> {
        let location = ResourceLocator::locate(file)?;

        IconWalker::new(file, &location)?
            .with_group_resolution(self.options.resolve_group)
            .with_size_limit(self.options.max_resource_size)
            .find_icon()
    }

    /// Extract the icon of the image at `path`.
    ///
    /// The file is memory-mapped for the duration of the call only.
    ///
    /// # Errors
    /// [`Error::FileError`] or [`Error::Empty`] if the file cannot be loaded, otherwise as
    /// [`IconExtractor::extract`].
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<IconResource> {
        let file = File::from_file(path.as_ref())?;
        self.extract(&file)
    }

    /// Extract the icon of an image held in memory.
    ///
    /// # Errors
    /// [`Error::Empty`] for an empty buffer, otherwise as [`IconExtractor::extract`].
    pub fn extract_mem(&self, data: Vec<u8>) -> Result<IconResource> {
        let file = File::from_mem(data)?;
        self.extract(&file)
    }

    /// Decode an extracted icon into pixels.
    ///
    /// Two byte streams are tried in the order given by
    /// [`ExtractOptions::decode_raw_first`]: the raw payload (which decodes directly when it is
    /// a PNG) and the payload wrapped into an ICO file sized after the image, see
    /// [`IconResource::to_sized_ico`].
    ///
    /// # Errors
    /// Returns [`Error::DecodeFailure`] if both attempts are rejected by the decoder.
    pub fn decode(&self, icon: &IconResource) -> Result<DynamicImage> {
        let raw = || image::load_from_memory(&icon.data).map_err(|e| e.to_string());
        let ico = || {
            let container = icon.to_sized_ico().map_err(|e| e.to_string())?;
            image::load_from_memory_with_format(&container, ImageFormat::Ico)
                .map_err(|e| e.to_string())
        };

        let (first, second): (&dyn Fn() -> Attempt, &dyn Fn() -> Attempt) =
            if self.options.decode_raw_first {
                (&raw, &ico)
            } else {
                (&ico, &raw)
            };

        let first_error = match first() {
            Ok(image) => {
                debug!(
                    "Decoded icon {} on the first attempt ({}x{})",
                    icon.id,
                    image.width(),
                    image.height()
                );
                return Ok(image);
            }
            Err(error) => error,
        };

        match second() {
            Ok(image) => {
                debug!(
                    "Decoded icon {} on the second attempt ({}x{}), first attempt: {}",
                    icon.id,
                    image.width(),
                    image.height(),
                    first_error
                );
                Ok(image)
            }
            Err(second_error) => Err(Error::DecodeFailure(format!(
                "{}; {}",
                first_error, second_error
            ))),
        }
    }

    /// Extract and decode the icon of the image at `path`.
    ///
    /// # Errors
    /// As [`IconExtractor::extract_path`] and [`IconExtractor::decode`].
    pub fn extract_image(&self, path: impl AsRef<Path>) -> Result<DynamicImage> {
        let icon = self.extract_path(path)?;
        self.decode(&icon)
    }
}

/// Extract the icon of the image at `path` as bytes a standard decoder accepts.
///
/// DIB payloads are returned as a reconstructed ICO file, PNG payloads unchanged. Any failure
/// yields `None`.
pub fn extract_icon(path: impl AsRef<Path>) -> Option<Vec<u8>> {
    let path = path.as_ref();

    match IconExtractor::new()
        .extract_path(path)
        .and_then(|icon| icon.to_image_bytes())
    {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            debug!("No icon for '{}': {}", path.display(), error);
            None
        }
    }
}

/// Extract and decode the icon of the image at `path`. Any failure yields `None`.
pub fn extract_icon_image(path: impl AsRef<Path>) -> Option<DynamicImage> {
    let path = path.as_ref();

    match IconExtractor::new().extract_image(path) {
        Ok(image) => Some(image),
        Err(error) => {
            debug!("No icon image for '{}': {}", path.display(), error);
            None
        }
    }
}

/// [`extract_icon`] for many files, processed in parallel. Results are in input order.
pub fn extract_icons<P>(paths: &[P]) -> Vec<Option<Vec<u8>>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(extract_icon).collect()
}
