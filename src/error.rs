use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which covers every failure the icon extraction pipeline can report.
///
/// Each stage of the pipeline (locating the resource table, walking the resource directory,
/// reading the icon payload, decoding it) maps its failure onto one of these variants. The
/// `Option` returning entry points in [`crate::extractor`] collapse all of them into "no icon".
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::NotAPeFile`] - DOS or PE signature mismatch
/// - [`Error::UnsupportedOptionalHeader`] - Optional header magic is neither PE32 nor PE32+
/// - [`Error::Malformed`] - Corrupted or invalid structure
///
/// ## Resource Errors
/// - [`Error::NoResourcesPresent`] - The resource data directory is empty
/// - [`Error::ResourceSectionNotFound`] - No section contains the resource table
/// - [`Error::RvaOutOfRange`] - An RVA could not be mapped to a file offset
/// - [`Error::IconResourceNotFound`] - No usable icon in the resource tree
///
/// ## I/O and External Errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the input
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::DecodeFailure`] - The image decoder rejected both candidate byte streams
///
/// # Examples
///
/// ```rust,no_run
/// use peicon::{Error, IconExtractor};
/// use std::path::Path;
///
/// match IconExtractor::new().extract_path(Path::new("setup.exe")) {
///     Ok(icon) => println!("icon payload: {} bytes", icon.data.len()),
///     Err(Error::NotAPeFile) => eprintln!("not an executable"),
///     Err(Error::NoResourcesPresent | Error::IconResourceNotFound) => eprintln!("no icon"),
///     Err(e) => eprintln!("extraction failed: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The DOS (`MZ`) or PE (`PE\0\0`) signature does not match.
    #[error("Not a PE file")]
    NotAPeFile,

    /// The optional header magic is neither `0x10B` (PE32) nor `0x20B` (PE32+).
    #[error("Unsupported optional header magic - 0x{0:04X}")]
    UnsupportedOptionalHeader(u16),

    /// The resource data directory entry has a zero RVA or a zero size.
    #[error("The file has no resource table")]
    NoResourcesPresent,

    /// No section covers the RVA of the resource table.
    #[error("No section contains the resource table at RVA 0x{0:08X}")]
    ResourceSectionNotFound(u32),

    /// An RVA encountered while walking resources is not covered by any section.
    #[error("RVA 0x{0:08X} is not covered by any section")]
    RvaOutOfRange(u32),

    /// `RT_GROUP_ICON` or `RT_ICON` is missing, or a directory level has no entries.
    #[error("No icon resource found")]
    IconResourceNotFound,

    /// The file is damaged and could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Neither the raw payload nor the reconstructed ICO could be decoded.
    #[error("Failed to decode icon - {0}")]
    DecodeFailure(String),
}
