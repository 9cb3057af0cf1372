//! File type support for `pngs-rs` project.

mod error;

pub mod lz4;
pub mod png;
pub mod pngs;

// Re-export unified error type
pub use error::{FileType, PngsError};

// Re-export main file types
pub use lz4::CompressionLevel;
pub use png::{
	ColorType, CompressionMethod, DecodeConfig, FilterMethod, InterlaceMethod, RasterDescriptor,
};
pub use pngs::{File as PngsFile, Frame, Header as PngsHeader, MetadataTable, SaveConfig};
