//! This crate provides core data types and file format support for the `pngs-rs` project.
//!
//! # File Formats
//!
//! - **PNGS**: Sequence container bundling RGBA frames, per-frame durations and metadata
//! - **PNG**: Decoder normalizing any non-interlaced 8-bit-or-less PNG to RGBA, plus a minimal encoder
//! - **LZ4**: Size-prefixed block compressor used for frame payloads
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use pngs_types::prelude::*;
//!
//! # fn main() -> Result<(), PngsError> {
//! let mut sequence = PngsFile::new();
//! sequence.add_frame(Frame::from_path("idle_0.png", 120)?);
//! sequence.add_frame(Frame::from_path("idle_1.png", 120)?);
//! sequence.save_with_config("idle.pngs", &SaveConfig::maximized())?;
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use pngs_types::file::{png, pngs};
//!
//! # fn main() -> Result<(), pngs_types::file::PngsError> {
//! let sequence = pngs::File::open("idle.pngs")?;
//! let (descriptor, rgba) = png::normalize(&sequence.encode_frame_png(0)?)?;
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use pngs_types::prelude::*;` to import commonly used items.
pub mod prelude;
