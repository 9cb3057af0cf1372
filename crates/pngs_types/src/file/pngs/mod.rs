//! `.pngs` file format support for `pngs-rs` project.
//!
//! A `.pngs` file bundles a sequence of still images with per-frame timing and
//! free-form metadata. Every frame is stored as canonical 8-bit RGBA pixels
//! compressed with the [`lz4`](crate::file::lz4) block compressor; a single
//! header descriptor describes how frames are re-encoded to PNG.
//!
//! # File Structure Overview
//!
//! - **Header (0x00-0x19):** signature, revision, raster descriptor, loop count
//! - **Metadata block (0x1A+):** `$MET`, entry count and length-prefixed ASCII strings
//! - **Frame records:** `$SEQ` records repeated until end of file
//!
//! ## Header (26 bytes)
//!
//! ```text
//! Offset  Size  Field               Description
//! ------  ----  ------------------  ---------------------------------------
//! 0x00    5     signature           "$PNGS"
//! 0x05    4     revision            f32, little-endian (currently 1.0)
//! 0x09    4     width               u32, big-endian
//! 0x0D    4     height              u32, big-endian
//! 0x11    4     loop_count          i32, little-endian (-1 = forever)
//! 0x15    1     bit_depth           PNG bit depth
//! 0x16    1     color_type          PNG color type tag
//! 0x17    1     compression_method  PNG compression method tag
//! 0x18    1     filter_method       PNG filter method tag
//! 0x19    1     interlace_method    PNG interlace method tag
//! ```
//!
//! ## Metadata Block
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  ---------------------------------------
//! +0x00   4     "$MET"    Block signature
//! +0x04   4     count     u32, big-endian
//! repeated `count` times:
//!         4     length    u32, big-endian
//!         n     entry     `length` ASCII bytes
//! ```
//!
//! ## Frame Record
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  ---------------------------------------
//! +0x00   4     "$SEQ"    Record signature
//! +0x04   4     length    Compressed payload size, u32 big-endian
//! +0x08   4     duration  Milliseconds, u32 big-endian, never 0
//! +0x0C   n     payload   Size-prefixed LZ4 block of RGBA pixels
//! ```
//!
//! # Loading
//!
//! Loading walks the file with an explicit state machine:
//! `TopSignature → HeaderFields → MetadataSignature → MetadataEntries →
//! [FrameSignature → FrameFields → Payload]* → EndOfStream`. Any failure stops
//! the walk and nothing is returned; format errors carry the byte offset at
//! which they were detected.
//!
//! # Usage Examples
//!
//! ```
//! use pngs_types::file::pngs::{File, Frame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pngs = File::from_frames(
//! 	false,
//! 	[Frame::placeholder(8, 8, 100)?, Frame::placeholder(8, 8, 150)?],
//! );
//! pngs.add_metadata("source=placeholder")?;
//!
//! let bytes = pngs.to_bytes()?;
//! let loaded = File::from_bytes(&bytes)?;
//! assert_eq!(loaded.frame_count(), 2);
//! assert_eq!(loaded.total_duration(), 250);
//! assert!(loaded.contains_metadata("source=placeholder"));
//! # Ok(())
//! # }
//! ```

mod codec;
pub mod constants;
mod file;
mod frame;
mod header;
mod metadata;
mod save_config;

pub use file::File;
pub use frame::Frame;
pub use header::{Header, is_supported_revision};
pub use metadata::MetadataTable;
pub use save_config::SaveConfig;
