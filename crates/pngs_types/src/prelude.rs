//! Prelude module for `pngs_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use pngs_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let sequence = PngsFile::new();
//! let config = SaveConfig::fast();
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// PNG types
	ColorType,
	CompressionLevel,
	DecodeConfig,

	FileType,

	// PNGS types
	Frame,
	MetadataTable,
	PngsError,
	PngsFile,
	PngsHeader,

	RasterDescriptor,
	SaveConfig,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
