//! Error types for file format parsing and manipulation.

use std::fmt::Display;

use thiserror::Error;

/// The format a failure was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// A PNG byte stream handed to the pixel codec
	Png,
	/// A `.pngs` sequence container
	Pngs,
	/// An LZ4 block payload
	Lz4,
}

impl Display for FileType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileType::Png => write!(f, "PNG"),
			FileType::Pngs => write!(f, "PNGS"),
			FileType::Lz4 => write!(f, "LZ4"),
		}
	}
}

/// Unified error type for every operation in this crate.
#[derive(Debug, Error)]
pub enum PngsError {
	/// Structural violation: bad signature, truncated record, unexpected value
	#[error("{file_type} format error at byte {offset}: {message}")]
	Format {
		/// Format being read
		file_type: FileType,
		/// Byte offset where the violation was detected
		offset: usize,
		/// Human readable description
		message: String,
	},

	/// Checksum mismatch or a corrupt compressed stream
	#[error("{file_type} integrity error: {message}")]
	Integrity {
		/// Format being read
		file_type: FileType,
		/// Human readable description
		message: String,
	},

	/// Recognized but unhandled feature, e.g. Adam7 interlacing
	#[error("{file_type} unsupported feature: {message}")]
	UnsupportedFeature {
		/// Format being read or written
		file_type: FileType,
		/// Human readable description
		message: String,
	},

	/// Out-of-range frame or metadata index
	#[error("Index {index} out of range (valid range: 0..{len})")]
	Index {
		/// Requested index
		index: usize,
		/// Number of addressable elements
		len: usize,
	},

	/// Invalid caller-supplied value
	#[error("Invalid argument: {message}")]
	Argument {
		/// Human readable description
		message: String,
	},

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl PngsError {
	/// Creates a [`PngsError::Format`] error.
	pub fn format(file_type: FileType, offset: usize, message: impl Into<String>) -> Self {
		Self::Format {
			file_type,
			offset,
			message: message.into(),
		}
	}

	/// Creates a [`PngsError::Integrity`] error.
	pub fn integrity(file_type: FileType, message: impl Into<String>) -> Self {
		Self::Integrity {
			file_type,
			message: message.into(),
		}
	}

	/// Creates a [`PngsError::UnsupportedFeature`] error.
	pub fn unsupported(file_type: FileType, message: impl Into<String>) -> Self {
		Self::UnsupportedFeature {
			file_type,
			message: message.into(),
		}
	}

	/// Creates a [`PngsError::Index`] error.
	pub fn index(index: usize, len: usize) -> Self {
		Self::Index {
			index,
			len,
		}
	}

	/// Creates a [`PngsError::Argument`] error.
	pub fn argument(message: impl Into<String>) -> Self {
		Self::Argument {
			message: message.into(),
		}
	}

	/// Returns the byte offset carried by a format error.
	pub fn offset(&self) -> Option<usize> {
		match self {
			Self::Format {
				offset,
				..
			} => Some(*offset),
			_ => None,
		}
	}

	/// Returns `true` for errors the caller can recover from without reloading data.
	///
	/// Index and argument errors leave the target untouched; everything else
	/// aborts the operation that produced it.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::Index { .. } | Self::Argument { .. })
	}
}
