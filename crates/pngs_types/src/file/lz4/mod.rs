//! LZ4 block compressor for frame payloads.
//!
//! Frame pixel buffers are stored as a single LZ4 block preceded by the
//! uncompressed size, the same framing `lz4_flex::compress_prepend_size` uses:
//!
//! ```text
//! Offset  Size  Field        Description
//! ------  ----  -----------  -----------------------------------------
//! 0x00    4     raw_len      Uncompressed size (little-endian u32)
//! 0x04    n     block        LZ4 block (token, literals, offset, match)
//! ```
//!
//! Two effort levels are available. [`CompressionLevel::Fast`] keeps one
//! candidate per hash bucket; [`CompressionLevel::High`] walks bounded hash
//! chains for longer matches. Both produce standard blocks and decode with the
//! same decoder.
//!
//! # Examples
//!
//! ```
//! use pngs_types::file::lz4::{self, CompressionLevel};
//!
//! let pixels = vec![0x7Fu8; 4096];
//! let packed = lz4::compress(&pixels, CompressionLevel::High)?;
//! assert!(packed.len() < pixels.len());
//!
//! let unpacked = lz4::decompress(&packed, Some(pixels.len()))?;
//! assert_eq!(unpacked, pixels);
//! # Ok::<(), pngs_types::file::PngsError>(())
//! ```

mod decode;
mod encode;

use std::fmt::Display;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::file::{FileType, PngsError};

/// Size of the length prefix in bytes
pub const SIZE_PREFIX_LEN: usize = 4;

/// Shortest match the format can express
pub(crate) const MIN_MATCH: usize = 4;

/// The final bytes of a block are always literals
pub(crate) const LAST_LITERALS: usize = 5;

/// A match may not start within this many bytes of the end
pub(crate) const MF_LIMIT: usize = 12;

/// Largest back-reference distance
pub(crate) const MAX_DISTANCE: usize = 65_535;

/// Compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
	/// Single-probe hash table
	Fast,
	/// Bounded hash-chain search
	#[default]
	High,
}

impl Display for CompressionLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CompressionLevel::Fast => write!(f, "fast"),
			CompressionLevel::High => write!(f, "high"),
		}
	}
}

/// Upper bound of [`compress`] output for `len` input bytes, prefix included.
pub fn max_compressed_len(len: usize) -> usize {
	SIZE_PREFIX_LEN + len + len / 255 + 16
}

/// Compresses `data` into a size-prefixed LZ4 block.
///
/// # Errors
///
/// Returns [`PngsError::Argument`] if `data` is longer than `u32::MAX` bytes.
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>, PngsError> {
	let raw_len = u32::try_from(data.len()).map_err(|_| {
		PngsError::argument(format!("{} bytes exceed the LZ4 size prefix", data.len()))
	})?;

	let mut out = Vec::with_capacity(max_compressed_len(data.len()));
	out.extend_from_slice(&raw_len.to_le_bytes());
	encode::compress_block(data, level, &mut out);

	trace!("LZ4 {level}: {} -> {} bytes", data.len(), out.len());
	Ok(out)
}

/// Decompresses a size-prefixed LZ4 block.
///
/// When `expected_len` is given the prefix must agree with it.
///
/// # Errors
///
/// Returns [`PngsError::Integrity`] for a missing or mismatched prefix, an
/// implausible expansion ratio, or any malformed sequence in the block.
pub fn decompress(data: &[u8], expected_len: Option<usize>) -> Result<Vec<u8>, PngsError> {
	let Some((prefix, block)) = data.split_first_chunk::<SIZE_PREFIX_LEN>() else {
		return Err(PngsError::integrity(
			FileType::Lz4,
			format!("{} bytes is too short for the size prefix", data.len()),
		));
	};
	let raw_len = u32::from_le_bytes(*prefix) as usize;

	if let Some(expected) = expected_len
		&& expected != raw_len
	{
		return Err(PngsError::integrity(
			FileType::Lz4,
			format!("size prefix says {raw_len} bytes, expected {expected}"),
		));
	}

	// Every input byte yields at most 255 output bytes
	if raw_len > block.len().saturating_mul(255).saturating_add(16) {
		return Err(PngsError::integrity(
			FileType::Lz4,
			format!("{} byte block cannot expand to {raw_len} bytes", block.len()),
		));
	}

	decode::decompress_block(block, raw_len)
}
