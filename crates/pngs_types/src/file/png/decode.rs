//! PNG decoding and RGBA expansion.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::{debug, warn};

use super::filter::unfilter;
use super::{ChunkReader, ColorType, DecodeConfig, InterlaceMethod, RasterDescriptor};
use crate::file::{FileType, PngsError};

/// A decoded but not yet expanded PNG raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
	/// Descriptor from the `IHDR` chunk
	pub descriptor: RasterDescriptor,
	/// Unfiltered scanlines, `descriptor.raw_len()` bytes with no filter bytes
	pub pixels: Vec<u8>,
	/// `PLTE` payload (RGB triples), if present
	pub palette: Option<Vec<u8>>,
	/// `tRNS` payload, if present
	pub transparency: Option<Vec<u8>>,
	palette_offset: usize,
}

fn too_large(descriptor: &RasterDescriptor) -> PngsError {
	PngsError::unsupported(FileType::Png, format!("image too large: {descriptor}"))
}

/// Decodes a PNG byte stream with strict CRC checking.
pub fn decode(data: &[u8]) -> Result<RawImage, PngsError> {
	decode_with_config(data, &DecodeConfig::default())
}

/// Decodes a PNG byte stream into its descriptor and unfiltered scanlines.
///
/// # Errors
///
/// - [`PngsError::Format`] for a bad signature, truncated or misplaced chunks,
///   a missing `IHDR`/`IDAT`/`IEND`, an illegal bit depth or a missing palette
/// - [`PngsError::Integrity`] for a CRC mismatch (when verified) or a corrupt
///   or short zlib stream
/// - [`PngsError::UnsupportedFeature`] for 16-bit samples, Adam7 interlacing,
///   or unknown compression/filter methods
pub fn decode_with_config(data: &[u8], config: &DecodeConfig) -> Result<RawImage, PngsError> {
	let mut descriptor: Option<(RasterDescriptor, usize)> = None;
	let mut palette: Option<(Vec<u8>, usize)> = None;
	let mut transparency: Option<Vec<u8>> = None;
	let mut idat = Vec::new();
	let mut idat_offset: Option<usize> = None;

	for chunk in ChunkReader::new(data)? {
		let chunk = chunk?;

		if config.verify_crc && !chunk.crc_matches() {
			return Err(PngsError::integrity(
				FileType::Png,
				format!("CRC mismatch in {} chunk at byte {}", chunk.kind_str(), chunk.offset),
			));
		}

		let needs_header = |name: &str| {
			PngsError::format(FileType::Png, chunk.offset, format!("{name} before IHDR"))
		};

		match &chunk.kind {
			b"IHDR" => {
				if descriptor.is_some() {
					return Err(PngsError::format(FileType::Png, chunk.offset, "duplicate IHDR"));
				}
				let parsed = RasterDescriptor::from_ihdr(chunk.data, chunk.data_offset())?;
				descriptor = Some((parsed, chunk.data_offset()));
			}
			b"PLTE" => {
				if descriptor.is_none() {
					return Err(needs_header("PLTE"));
				}
				if chunk.data.is_empty() || chunk.data.len() % 3 != 0 || chunk.data.len() > 256 * 3 {
					return Err(PngsError::format(
						FileType::Png,
						chunk.data_offset(),
						format!("invalid palette length {}", chunk.data.len()),
					));
				}
				palette = Some((chunk.data.to_vec(), chunk.data_offset()));
			}
			b"tRNS" => {
				if descriptor.is_none() {
					return Err(needs_header("tRNS"));
				}
				transparency = Some(chunk.data.to_vec());
			}
			b"IDAT" => {
				if descriptor.is_none() {
					return Err(needs_header("IDAT"));
				}
				idat_offset.get_or_insert(chunk.data_offset());
				idat.extend_from_slice(chunk.data);
			}
			b"IEND" => {}
			_ if chunk.is_critical() => {
				warn!("Skipping unknown critical PNG chunk {}", chunk.kind_str());
			}
			_ => {}
		}
	}

	let Some((descriptor, ihdr_offset)) = descriptor else {
		return Err(PngsError::format(FileType::Png, 8, "missing IHDR chunk"));
	};
	let Some(idat_offset) = idat_offset else {
		return Err(PngsError::format(FileType::Png, data.len(), "missing IDAT chunk"));
	};

	validate(&descriptor, ihdr_offset)?;

	let palette = match (descriptor.color_type, palette) {
		(ColorType::Indexed, None) => {
			return Err(PngsError::format(
				FileType::Png,
				idat_offset,
				"indexed image without PLTE chunk",
			));
		}
		(_, palette) => palette,
	};

	let height = descriptor.height as usize;
	let row_bytes = descriptor.row_bytes().ok_or_else(|| too_large(&descriptor))?;
	// One filter-type byte leads every scanline
	let filtered_len = row_bytes
		.checked_add(1)
		.and_then(|stride| stride.checked_mul(height))
		.ok_or_else(|| too_large(&descriptor))?;

	let mut filtered = Vec::new();
	ZlibDecoder::new(idat.as_slice())
		.take(filtered_len as u64 + 1)
		.read_to_end(&mut filtered)
		.map_err(|e| PngsError::integrity(FileType::Png, format!("corrupt IDAT stream: {e}")))?;

	if filtered.len() < filtered_len {
		return Err(PngsError::integrity(
			FileType::Png,
			format!(
				"IDAT stream inflated to {} bytes, expected {}",
				filtered.len(),
				filtered_len
			),
		));
	}
	if filtered.len() > filtered_len {
		warn!("Ignoring trailing data after {filtered_len} bytes of image data");
	}

	let pixels = unfilter(
		&filtered,
		height,
		row_bytes,
		descriptor.filter_bytes_per_pixel(),
		idat_offset,
	)?;

	debug!("Decoded PNG: {descriptor}");

	let (palette, palette_offset) = match palette {
		Some((entries, offset)) => (Some(entries), offset),
		None => (None, idat_offset),
	};

	Ok(RawImage {
		descriptor,
		pixels,
		palette,
		transparency,
		palette_offset,
	})
}

fn validate(descriptor: &RasterDescriptor, offset: usize) -> Result<(), PngsError> {
	if descriptor.width == 0 || descriptor.height == 0 {
		return Err(PngsError::format(
			FileType::Png,
			offset,
			format!("zero image dimension {}x{}", descriptor.width, descriptor.height),
		));
	}
	if !descriptor.color_type.allows_bit_depth(descriptor.bit_depth) {
		return Err(PngsError::format(
			FileType::Png,
			offset + 8,
			format!(
				"bit depth {} is not valid for {}",
				descriptor.bit_depth, descriptor.color_type
			),
		));
	}
	if descriptor.bit_depth == 16 {
		return Err(PngsError::unsupported(FileType::Png, "16-bit samples"));
	}
	if descriptor.interlace_method == InterlaceMethod::Adam7 {
		return Err(PngsError::unsupported(FileType::Png, "Adam7 interlacing"));
	}
	Ok(())
}

/// Reads sample `x` of a packed scanline.
#[inline]
fn sample(row: &[u8], x: usize, bit_depth: u8) -> u8 {
	match bit_depth {
		8 => row[x],
		depth => {
			let depth = depth as usize;
			let bit = x * depth;
			let shift = 8 - depth - bit % 8;
			(row[bit / 8] >> shift) & ((1u8 << depth) - 1)
		}
	}
}

fn key_u16(bytes: &[u8], index: usize) -> Option<u16> {
	let pair = bytes.get(index * 2..index * 2 + 2)?;
	Some(u16::from_be_bytes([pair[0], pair[1]]))
}

impl RawImage {
	/// Expands the raster to `width * height * 4` bytes of 8-bit RGBA.
	///
	/// Sub-byte grayscale is scaled to the full 0..=255 range. Palette entries
	/// take their alpha from `tRNS` (255 when absent); grayscale and truecolor
	/// pixels matching a `tRNS` color key become fully transparent.
	pub fn to_rgba(&self) -> Result<Vec<u8>, PngsError> {
		let d = &self.descriptor;
		let width = d.width as usize;
		let (Some(row_bytes), Some(canonical_len)) = (d.row_bytes(), d.canonical_len()) else {
			return Err(too_large(d));
		};
		let mut out = Vec::with_capacity(canonical_len);

		match d.color_type {
			ColorType::Grayscale => {
				let max = (1u16 << d.bit_depth) - 1;
				let scale = (255 / max) as u8;
				let key = self.transparency.as_deref().and_then(|t| key_u16(t, 0));
				for row in self.pixels.chunks_exact(row_bytes) {
					for x in 0..width {
						let v = sample(row, x, d.bit_depth);
						let alpha = if key == Some(v as u16) { 0 } else { 255 };
						let gray = v * scale;
						out.extend_from_slice(&[gray, gray, gray, alpha]);
					}
				}
			}
			ColorType::Truecolor => {
				let key = self.transparency.as_deref().and_then(|t| {
					Some([key_u16(t, 0)?, key_u16(t, 1)?, key_u16(t, 2)?])
				});
				for rgb in self.pixels.chunks_exact(3) {
					let matches_key = key
						.is_some_and(|k| k == [rgb[0] as u16, rgb[1] as u16, rgb[2] as u16]);
					let alpha = if matches_key { 0 } else { 255 };
					out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
				}
			}
			ColorType::Indexed => {
				let palette = self.palette.as_deref().ok_or_else(|| {
					PngsError::format(
						FileType::Png,
						self.palette_offset,
						"indexed image without PLTE chunk",
					)
				})?;
				let entries = palette.len() / 3;
				let alphas = self.transparency.as_deref().unwrap_or(&[]);
				for row in self.pixels.chunks_exact(row_bytes) {
					for x in 0..width {
						let index = sample(row, x, d.bit_depth) as usize;
						if index >= entries {
							return Err(PngsError::format(
								FileType::Png,
								self.palette_offset,
								format!("palette index {index} out of range ({entries} entries)"),
							));
						}
						let rgb = &palette[index * 3..index * 3 + 3];
						let alpha = alphas.get(index).copied().unwrap_or(255);
						out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
					}
				}
			}
			ColorType::GrayscaleAlpha => {
				for ga in self.pixels.chunks_exact(2) {
					out.extend_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
				}
			}
			ColorType::TruecolorAlpha => out.extend_from_slice(&self.pixels),
		}

		Ok(out)
	}
}
