//! PNG codec used to normalize input images for `.pngs` containers.
//!
//! This is not a general purpose PNG library. It does exactly what the sequence
//! container needs: parse the chunk stream of an arbitrary non-interlaced PNG,
//! undo the scanline filters, expand every color type to 8-bit RGBA, and write
//! the canonical form back out as a minimal PNG.
//!
//! # Chunk Layout
//!
//! ```text
//! Offset  Size  Field       Description
//! ------  ----  ----------  ------------------------------------------
//! 0x00    8     signature   89 50 4E 47 0D 0A 1A 0A
//! 0x08    4     length      Payload length (big-endian)
//! 0x0C    4     type        ASCII chunk tag (IHDR, PLTE, tRNS, IDAT, IEND, ...)
//! 0x10    n     payload     `length` bytes
//! +n      4     crc         CRC-32 over type + payload (big-endian)
//! ```
//!
//! # Supported Input
//!
//! | Color type        | Bit depths  | Expansion                               |
//! |-------------------|-------------|-----------------------------------------|
//! | Grayscale (0)     | 1, 2, 4, 8  | gray replicated, alpha 255 (or tRNS key)|
//! | Truecolor (2)     | 8           | RGB copied, alpha 255 (or tRNS key)     |
//! | Indexed (3)       | 1, 2, 4, 8  | palette lookup, alpha from tRNS         |
//! | Grayscale+A (4)   | 8           | gray replicated, alpha carried          |
//! | Truecolor+A (6)   | 8           | copied as-is                            |
//!
//! 16-bit samples and Adam7 interlacing are rejected with
//! [`PngsError::UnsupportedFeature`](crate::file::PngsError::UnsupportedFeature).
//!
//! # Examples
//!
//! ```no_run
//! use pngs_types::file::png;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("input.png")?;
//!
//! // Canonical RGBA pixels plus the matching descriptor
//! let (descriptor, rgba) = png::normalize(&data)?;
//! assert_eq!(Some(rgba.len()), descriptor.canonical_len());
//!
//! // Write them back as a minimal PNG
//! let encoded = png::encode(&descriptor, &rgba)?;
//! std::fs::write("output.png", encoded)?;
//! # Ok(())
//! # }
//! ```

mod chunk;
mod decode;
mod encode;
mod filter;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::file::{FileType, PngsError};

pub use self::chunk::{Chunk, ChunkReader, MAX_CHUNK_LEN, crc32, write_chunk};
pub use self::decode::{RawImage, decode, decode_with_config};
pub use self::encode::encode;
pub use self::filter::FilterType;

/// PNG file signature
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Bit depth of the canonical raster
pub const CANONICAL_BIT_DEPTH: u8 = 8;

/// Bytes per pixel of the canonical raster (RGBA)
pub const CANONICAL_BYTES_PER_PIXEL: usize = 4;

/// PNG color type tag.
///
/// Variants are declared in ascending tag order so the derived ordering is the
/// ordinal ordering used when summarizing descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColorType {
	/// Grayscale samples
	Grayscale = 0,
	/// RGB triples
	Truecolor = 2,
	/// Palette indices
	Indexed = 3,
	/// Grayscale + alpha
	GrayscaleAlpha = 4,
	/// RGBA quadruples
	TruecolorAlpha = 6,
}

impl ColorType {
	/// Number of samples per pixel.
	pub fn components(self) -> usize {
		match self {
			ColorType::Grayscale | ColorType::Indexed => 1,
			ColorType::GrayscaleAlpha => 2,
			ColorType::Truecolor => 3,
			ColorType::TruecolorAlpha => 4,
		}
	}

	/// Returns `true` if `bit_depth` is legal for this color type.
	pub fn allows_bit_depth(self, bit_depth: u8) -> bool {
		match self {
			ColorType::Grayscale => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
			ColorType::Indexed => matches!(bit_depth, 1 | 2 | 4 | 8),
			ColorType::Truecolor | ColorType::GrayscaleAlpha | ColorType::TruecolorAlpha => {
				matches!(bit_depth, 8 | 16)
			}
		}
	}
}

impl TryFrom<u8> for ColorType {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(ColorType::Grayscale),
			2 => Ok(ColorType::Truecolor),
			3 => Ok(ColorType::Indexed),
			4 => Ok(ColorType::GrayscaleAlpha),
			6 => Ok(ColorType::TruecolorAlpha),
			other => Err(other),
		}
	}
}

impl Display for ColorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ColorType::Grayscale => write!(f, "Grayscale"),
			ColorType::Truecolor => write!(f, "Truecolor"),
			ColorType::Indexed => write!(f, "Indexed"),
			ColorType::GrayscaleAlpha => write!(f, "GrayscaleAlpha"),
			ColorType::TruecolorAlpha => write!(f, "TruecolorAlpha"),
		}
	}
}

/// PNG compression method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionMethod {
	/// zlib deflate
	Deflate = 0,
}

impl TryFrom<u8> for CompressionMethod {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(CompressionMethod::Deflate),
			other => Err(other),
		}
	}
}

/// PNG filter method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterMethod {
	/// Adaptive filtering with the five basic filter types
	Adaptive = 0,
}

impl TryFrom<u8> for FilterMethod {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(FilterMethod::Adaptive),
			other => Err(other),
		}
	}
}

/// PNG interlace method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InterlaceMethod {
	/// Sequential scanlines
	None = 0,
	/// Adam7 (recognized, not decoded)
	Adam7 = 1,
}

impl TryFrom<u8> for InterlaceMethod {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(InterlaceMethod::None),
			1 => Ok(InterlaceMethod::Adam7),
			other => Err(other),
		}
	}
}

/// Width, height and sample format of a raster, as carried by an `IHDR` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterDescriptor {
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Bits per sample (or per palette index)
	pub bit_depth: u8,
	/// Color type
	pub color_type: ColorType,
	/// Compression method
	pub compression_method: CompressionMethod,
	/// Filter method
	pub filter_method: FilterMethod,
	/// Interlace method
	pub interlace_method: InterlaceMethod,
}

impl Default for RasterDescriptor {
	fn default() -> Self {
		Self::canonical(0, 0)
	}
}

impl RasterDescriptor {
	/// Size of the `IHDR` payload in bytes
	pub const SIZE: usize = 13;

	/// Creates a non-interlaced descriptor with the given geometry and sample format.
	pub fn new(width: u32, height: u32, bit_depth: u8, color_type: ColorType) -> Self {
		Self {
			width,
			height,
			bit_depth,
			color_type,
			compression_method: CompressionMethod::Deflate,
			filter_method: FilterMethod::Adaptive,
			interlace_method: InterlaceMethod::None,
		}
	}

	/// Creates the descriptor of a canonical 8-bit RGBA raster.
	pub fn canonical(width: u32, height: u32) -> Self {
		Self::new(width, height, CANONICAL_BIT_DEPTH, ColorType::TruecolorAlpha)
	}

	/// Returns `true` if this describes an 8-bit, non-interlaced RGBA raster.
	pub fn is_canonical(&self) -> bool {
		self.bit_depth == CANONICAL_BIT_DEPTH
			&& self.color_type == ColorType::TruecolorAlpha
			&& self.interlace_method == InterlaceMethod::None
	}

	/// Bits occupied by one pixel.
	pub fn bits_per_pixel(&self) -> usize {
		self.color_type.components() * self.bit_depth as usize
	}

	/// Bytes per pixel used by the scanline filters, `ceil(bits_per_pixel / 8)`.
	pub fn filter_bytes_per_pixel(&self) -> usize {
		self.bits_per_pixel().div_ceil(8).max(1)
	}

	/// Bytes in one unfiltered scanline, or `None` if that overflows `usize`.
	pub fn row_bytes(&self) -> Option<usize> {
		(self.width as usize)
			.checked_mul(self.bits_per_pixel())
			.map(|bits| bits.div_ceil(8))
	}

	/// Bytes in the whole unfiltered raster, or `None` on overflow.
	pub fn raw_len(&self) -> Option<usize> {
		self.row_bytes()?.checked_mul(self.height as usize)
	}

	/// Bytes in the raster once expanded to canonical RGBA, or `None` on overflow.
	pub fn canonical_len(&self) -> Option<usize> {
		(self.width as usize)
			.checked_mul(self.height as usize)?
			.checked_mul(CANONICAL_BYTES_PER_PIXEL)
	}

	/// Parses an `IHDR` payload.
	///
	/// `offset` is the absolute position of the payload, used for error reporting.
	pub fn from_ihdr(data: &[u8], offset: usize) -> Result<Self, PngsError> {
		if data.len() != Self::SIZE {
			return Err(PngsError::format(
				FileType::Png,
				offset,
				format!("IHDR must be {} bytes, got {}", Self::SIZE, data.len()),
			));
		}

		let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
		let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
		let bit_depth = data[8];
		let color_type = ColorType::try_from(data[9]).map_err(|v| {
			PngsError::unsupported(FileType::Png, format!("color type {v}"))
		})?;
		let compression_method = CompressionMethod::try_from(data[10]).map_err(|v| {
			PngsError::unsupported(FileType::Png, format!("compression method {v}"))
		})?;
		let filter_method = FilterMethod::try_from(data[11])
			.map_err(|v| PngsError::unsupported(FileType::Png, format!("filter method {v}")))?;
		let interlace_method = InterlaceMethod::try_from(data[12]).map_err(|v| {
			PngsError::unsupported(FileType::Png, format!("interlace method {v}"))
		})?;

		Ok(Self {
			width,
			height,
			bit_depth,
			color_type,
			compression_method,
			filter_method,
			interlace_method,
		})
	}

	/// Serializes the descriptor as an `IHDR` payload.
	pub fn to_ihdr(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
		bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
		bytes[8] = self.bit_depth;
		bytes[9] = self.color_type as u8;
		bytes[10] = self.compression_method as u8;
		bytes[11] = self.filter_method as u8;
		bytes[12] = self.interlace_method as u8;
		bytes
	}

	/// Summarizes several descriptors into one, field by field.
	///
	/// Every field (including the enum tags, by ordinal) is reduced independently
	/// with `max` when `prefer_maximized` is set and `min` otherwise, so the result
	/// need not match any single input. Returns `None` for an empty input.
	pub fn summarize<'a, I>(descriptors: I, prefer_maximized: bool) -> Option<Self>
	where
		I: IntoIterator<Item = &'a RasterDescriptor>,
	{
		fn pick<T: Ord>(prefer_maximized: bool, a: T, b: T) -> T {
			if prefer_maximized {
				a.max(b)
			} else {
				a.min(b)
			}
		}

		let mut iter = descriptors.into_iter();
		let first = *iter.next()?;
		Some(iter.fold(first, |acc, d| Self {
			width: pick(prefer_maximized, acc.width, d.width),
			height: pick(prefer_maximized, acc.height, d.height),
			bit_depth: pick(prefer_maximized, acc.bit_depth, d.bit_depth),
			color_type: pick(prefer_maximized, acc.color_type, d.color_type),
			compression_method: pick(
				prefer_maximized,
				acc.compression_method,
				d.compression_method,
			),
			filter_method: pick(prefer_maximized, acc.filter_method, d.filter_method),
			interlace_method: pick(prefer_maximized, acc.interlace_method, d.interlace_method),
		}))
	}
}

impl Display for RasterDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}x{} {} @ {} bit (compression {}, filter {}, interlace {})",
			self.width,
			self.height,
			self.color_type,
			self.bit_depth,
			self.compression_method as u8,
			self.filter_method as u8,
			self.interlace_method as u8,
		)
	}
}

/// Configuration for decoding PNG input.
///
/// # Examples
///
/// ```
/// use pngs_types::file::png::DecodeConfig;
///
/// // CRC mismatches are integrity errors
/// let strict = DecodeConfig::default();
/// assert!(strict.verify_crc);
///
/// // CRC fields are consumed but not checked
/// let lenient = DecodeConfig::lenient();
/// assert!(!lenient.verify_crc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
	/// Verify every chunk CRC and fail on mismatch
	pub verify_crc: bool,
}

impl Default for DecodeConfig {
	fn default() -> Self {
		Self {
			verify_crc: true,
		}
	}
}

impl DecodeConfig {
	/// Create a lenient configuration that skips CRC verification.
	pub fn lenient() -> Self {
		Self {
			verify_crc: false,
		}
	}
}

/// Decodes `data` and expands it to canonical 8-bit RGBA.
///
/// Returns the canonical descriptor (same width and height as the input) and
/// `width * height * 4` bytes of row-major RGBA.
pub fn normalize(data: &[u8]) -> Result<(RasterDescriptor, Vec<u8>), PngsError> {
	normalize_with_config(data, &DecodeConfig::default())
}

/// [`normalize`] with an explicit [`DecodeConfig`].
pub fn normalize_with_config(
	data: &[u8],
	config: &DecodeConfig,
) -> Result<(RasterDescriptor, Vec<u8>), PngsError> {
	let image = decode_with_config(data, config)?;
	let rgba = image.to_rgba()?;
	let descriptor = RasterDescriptor::canonical(image.descriptor.width, image.descriptor.height);
	Ok((descriptor, rgba))
}

/// Converts any supported PNG into a canonical RGBA PNG byte stream.
pub fn to_truecolor_alpha(data: &[u8]) -> Result<Vec<u8>, PngsError> {
	let (descriptor, rgba) = normalize(data)?;
	encode(&descriptor, &rgba)
}
