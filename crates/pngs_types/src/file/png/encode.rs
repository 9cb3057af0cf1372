//! Minimal PNG writer.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use log::trace;

use super::filter::filter_none;
use super::{
	CANONICAL_BIT_DEPTH, ColorType, CompressionMethod, FilterMethod, InterlaceMethod,
	MAX_CHUNK_LEN, RasterDescriptor, SIGNATURE, write_chunk,
};
use crate::file::{FileType, PngsError};

/// Encodes raw scanlines as a PNG.
///
/// The zlib stream goes into one `IDAT` chunk unless it exceeds [`MAX_CHUNK_LEN`].
///
/// The output always declares compression, filter and interlace method 0,
/// whatever `descriptor` says. Only 8-bit non-indexed rasters can be written.
///
/// # Arguments
///
/// * `descriptor` - Geometry and sample format of `pixels`
/// * `pixels` - Row-major samples, exactly `descriptor.raw_len()` bytes
///
/// # Errors
///
/// - [`PngsError::UnsupportedFeature`] for indexed color or a bit depth other than 8
/// - [`PngsError::Argument`] for a zero dimension, a raster too large to address
///   or a buffer of the wrong length
///
/// # Examples
///
/// ```
/// use pngs_types::file::png::{self, RasterDescriptor};
///
/// let descriptor = RasterDescriptor::canonical(2, 1);
/// let bytes = png::encode(&descriptor, &[255, 0, 0, 255, 0, 0, 255, 128])?;
///
/// let (decoded, rgba) = png::normalize(&bytes)?;
/// assert_eq!(decoded, descriptor);
/// assert_eq!(rgba, [255, 0, 0, 255, 0, 0, 255, 128]);
/// # Ok::<(), pngs_types::file::PngsError>(())
/// ```
pub fn encode(descriptor: &RasterDescriptor, pixels: &[u8]) -> Result<Vec<u8>, PngsError> {
	if descriptor.bit_depth != CANONICAL_BIT_DEPTH {
		return Err(PngsError::unsupported(
			FileType::Png,
			format!("encoding {}-bit samples", descriptor.bit_depth),
		));
	}
	if descriptor.color_type == ColorType::Indexed {
		return Err(PngsError::unsupported(FileType::Png, "encoding indexed color"));
	}
	if descriptor.width == 0 || descriptor.height == 0 {
		return Err(PngsError::argument(format!(
			"cannot encode a {}x{} image",
			descriptor.width, descriptor.height
		)));
	}
	let (Some(row_bytes), Some(raw_len)) = (descriptor.row_bytes(), descriptor.raw_len()) else {
		return Err(PngsError::argument(format!("{descriptor} is too large to encode")));
	};
	if pixels.len() != raw_len {
		return Err(PngsError::argument(format!(
			"pixel buffer is {} bytes, {} expects {}",
			pixels.len(),
			descriptor,
			raw_len
		)));
	}

	let header = RasterDescriptor {
		compression_method: CompressionMethod::Deflate,
		filter_method: FilterMethod::Adaptive,
		interlace_method: InterlaceMethod::None,
		..*descriptor
	};

	let filtered = filter_none(pixels, row_bytes);
	let mut encoder = ZlibEncoder::new(Vec::with_capacity(filtered.len() / 2), Compression::default());
	encoder.write_all(&filtered)?;
	let idat = encoder.finish()?;

	let mut out = Vec::with_capacity(SIGNATURE.len() + idat.len() + 3 * 12 + RasterDescriptor::SIZE);
	out.extend_from_slice(&SIGNATURE);
	write_chunk(&mut out, b"IHDR", &header.to_ihdr())?;
	for part in idat.chunks(MAX_CHUNK_LEN) {
		write_chunk(&mut out, b"IDAT", part)?;
	}
	write_chunk(&mut out, b"IEND", &[])?;

	trace!("Encoded PNG: {} ({} bytes)", header, out.len());
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::super::{decode, normalize};
	use super::*;

	#[test]
	fn test_encode_layout() {
		let png = encode(&RasterDescriptor::canonical(1, 1), &[9, 8, 7, 6]).unwrap();
		assert_eq!(&png[..8], &SIGNATURE);
		assert_eq!(&png[8..16], b"\0\0\0\x0DIHDR");
		assert_eq!(&png[png.len() - 12..], b"\0\0\0\0IEND\xAE\x42\x60\x82");
	}

	#[test]
	fn test_encode_forces_zero_methods() {
		let mut descriptor = RasterDescriptor::new(2, 2, 8, ColorType::GrayscaleAlpha);
		descriptor.interlace_method = InterlaceMethod::Adam7;
		let png = encode(&descriptor, &[10, 20, 30, 40, 50, 60, 70, 80]).unwrap();

		let image = decode(&png).unwrap();
		assert_eq!(image.descriptor.interlace_method, InterlaceMethod::None);
		assert_eq!(image.pixels, vec![10, 20, 30, 40, 50, 60, 70, 80]);
	}

	#[test]
	fn test_encode_then_normalize_truecolor() {
		let descriptor = RasterDescriptor::new(2, 1, 8, ColorType::Truecolor);
		let png = encode(&descriptor, &[1, 2, 3, 4, 5, 6]).unwrap();
		let (canonical, rgba) = normalize(&png).unwrap();
		assert!(canonical.is_canonical());
		assert_eq!(rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
	}

	#[test]
	fn test_encode_rejects_bad_input() {
		let indexed = RasterDescriptor::new(1, 1, 8, ColorType::Indexed);
		assert!(matches!(encode(&indexed, &[0]), Err(PngsError::UnsupportedFeature { .. })));

		let low_depth = RasterDescriptor::new(8, 1, 1, ColorType::Grayscale);
		assert!(matches!(encode(&low_depth, &[0]), Err(PngsError::UnsupportedFeature { .. })));

		let canonical = RasterDescriptor::canonical(2, 2);
		assert!(matches!(encode(&canonical, &[0; 15]), Err(PngsError::Argument { .. })));
		assert!(matches!(
			encode(&RasterDescriptor::canonical(0, 1), &[]),
			Err(PngsError::Argument { .. })
		));
	}

	#[test]
	fn test_encode_oversized_descriptor_is_argument_error() {
		let huge = RasterDescriptor::canonical(u32::MAX, u32::MAX);
		assert!(matches!(encode(&huge, &[0; 16]), Err(PngsError::Argument { .. })));
	}
}
