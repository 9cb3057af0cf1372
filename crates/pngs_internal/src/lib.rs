//! This module is separated into its own crate so the root crate stays a thin facade, and should not be used directly.

/// `use pngs_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export pngs_types for convenience
pub use pngs_types;

// Re-export commonly used types at crate root
pub use pngs_types::file::{
	CompressionLevel, DecodeConfig, FileType, Frame, MetadataTable, PngsError, PngsFile,
	PngsHeader, RasterDescriptor, SaveConfig, lz4, png, pngs,
};
