// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # peicon
//!
//! Extracts the application icon embedded in a Windows Portable Executable (PE32 or PE32+)
//! and turns it into bytes a standard image decoder accepts. Built in pure Rust, `peicon`
//! walks the PE headers, the section table and the three-level resource tree itself, on any
//! platform, without Windows APIs.
//!
//! ## Features
//!
//! - **Memory-mapped input** - Files are mapped read-only for the duration of one extraction
//! - **Bounds-checked parsing** - Every read is checked; malformed input yields a typed error
//! - **PE32 and PE32+** - 32-bit and 64-bit images, resource tables anywhere in their section
//! - **ICO reconstruction** - Headerless RT_ICON bitmaps are wrapped into a valid ICO file
//! - **Decoding** - Optional decoding to pixels through the `image` crate
//! - **Batch extraction** - Independent files processed in parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use peicon::prelude::*;
//!
//! // Bytes of a standalone .ico (or .png for PNG-compressed icons), or None
//! if let Some(icon) = extract_icon("setup.exe") {
//!     std::fs::write("setup.ico", icon)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Typed API
//!
//! ```rust,no_run
//! use peicon::{Error, IconExtractor};
//!
//! match IconExtractor::new().extract_path("setup.exe") {
//!     Ok(icon) => println!("icon {}: {} bytes", icon.id, icon.data.len()),
//!     Err(Error::NotAPeFile) => println!("not an executable"),
//!     Err(Error::NoResourcesPresent | Error::IconResourceNotFound) => println!("no icon"),
//!     Err(e) => println!("extraction failed: {}", e),
//! }
//! ```
//!
//! ## Architecture
//!
//! Extraction is a single synchronous pipeline. Nothing is cached between calls.
//!
//! - [`pe::locator`] - Validates the headers and finds the resource table
//! - [`resources`] - Reads directory nodes and walks them to the icon payload
//! - [`ico`] - Wraps a payload into a single-image ICO file
//! - [`pe::rva`] - RVA to file offset translation, shared by the stages above
//! - [`extractor`] - Entry points and decoding
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Selection Policy
//!
//! The icon returned is the first RT_ICON image listed by the first RT_GROUP_ICON resource,
//! in its first language. No attempt is made to pick the largest or best image.
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run extractor --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust,no_run
/// use peicon::prelude::*;
///
/// let icon = IconExtractor::new().extract_path("setup.exe")?;
/// # Ok::<(), Error>(())
/// ```
pub mod prelude;

/// PE header parsing up to the resource table.
pub mod pe;

/// Resource tree parsing and the icon walk.
pub mod resources;

/// Standalone ICO reconstruction.
pub mod ico;

/// Extraction entry points.
pub mod extractor;

/// `peicon` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `peicon` Error type.
///
/// See [`Error`] for the categories of failures extraction can report.
pub use error::Error;

/// Main entry point for icon extraction.
pub use extractor::{ExtractOptions, IconExtractor};

/// Low-level file access and parsing.
///
/// ```rust
/// use peicon::{File, Parser};
///
/// let file = File::from_mem(vec![0x4D, 0x5A, 0x90, 0x00])?;
/// let mut parser = Parser::new(file.data());
/// assert_eq!(parser.read_le::<u16>()?, 0x5A4D);
/// # Ok::<(), peicon::Error>(())
/// ```
pub use file::{parser::Parser, File};
