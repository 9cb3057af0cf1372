//! Frames: decoded RGBA pixels plus a display duration.

use std::path::Path;
use std::sync::Arc;

use crate::file::PngsError;
use crate::file::png::{self, DecodeConfig, RasterDescriptor};

/// One image of a sequence.
///
/// A frame always holds its pixels decompressed, as row-major 8-bit RGBA, and
/// a duration in milliseconds that is never zero.
///
/// # Identity
///
/// Frames are compared by identity, not by content. Cloning a `Frame` yields
/// another handle to the *same* frame, so a container treats the clone as
/// already present. Use [`Frame::duplicate`] for an independent copy.
///
/// # Examples
///
/// ```
/// use pngs_types::file::pngs::Frame;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let frame = Frame::placeholder(4, 4, 100)?;
/// let handle = frame.clone();
/// let copy = frame.duplicate();
///
/// assert!(frame.is_same(&handle));
/// assert!(!frame.is_same(&copy));
/// assert_eq!(frame.pixels(), copy.pixels());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Frame {
	identity: Arc<()>,
	descriptor: RasterDescriptor,
	pixels: Vec<u8>,
	duration: u32,
}

fn check_duration(duration: u32) -> Result<(), PngsError> {
	if duration == 0 {
		return Err(PngsError::argument("frame duration must be greater than zero"));
	}
	Ok(())
}

fn canonical_len(descriptor: &RasterDescriptor) -> Result<usize, PngsError> {
	descriptor.canonical_len().ok_or_else(|| {
		PngsError::argument(format!(
			"{}x{} frame is too large to address",
			descriptor.width, descriptor.height
		))
	})
}

/// Reads a whole file, rejecting an empty path up front.
pub(super) fn read_path(path: &Path) -> Result<Vec<u8>, PngsError> {
	if path.as_os_str().is_empty() {
		return Err(PngsError::argument("path is empty"));
	}
	Ok(std::fs::read(path)?)
}

impl Frame {
	/// Decodes `png` into a new frame shown for `duration` milliseconds.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] for a zero duration, or any error of
	/// [`png::normalize`].
	pub fn new(png: &[u8], duration: u32) -> Result<Self, PngsError> {
		Self::with_config(png, duration, &DecodeConfig::default())
	}

	/// [`Frame::new`] with an explicit [`DecodeConfig`].
	pub fn with_config(png: &[u8], duration: u32, config: &DecodeConfig) -> Result<Self, PngsError> {
		check_duration(duration)?;
		let (descriptor, pixels) = png::normalize_with_config(png, config)?;
		Ok(Self::from_parts(descriptor, pixels, duration))
	}

	/// Reads and decodes the PNG file at `path`.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] for an empty path, [`PngsError::Io`] if
	/// the file cannot be read, or any error of [`Frame::new`].
	pub fn from_path(path: impl AsRef<Path>, duration: u32) -> Result<Self, PngsError> {
		let data = read_path(path.as_ref())?;
		Self::new(&data, duration)
	}

	/// Wraps already decoded RGBA pixels.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] if `descriptor` is empty or not canonical
	/// RGBA, if `pixels` is not `width * height * 4` bytes, or if `duration` is zero.
	pub fn from_raw(
		descriptor: RasterDescriptor,
		pixels: Vec<u8>,
		duration: u32,
	) -> Result<Self, PngsError> {
		check_duration(duration)?;
		if descriptor.width == 0 || descriptor.height == 0 {
			return Err(PngsError::argument("frame dimensions must be non-zero"));
		}
		if !descriptor.is_canonical() {
			return Err(PngsError::argument(format!(
				"frame pixels must be 8-bit RGBA, got {descriptor}"
			)));
		}
		let expected = canonical_len(&descriptor)?;
		if pixels.len() != expected {
			return Err(PngsError::argument(format!(
				"expected {} bytes of RGBA for {}x{}, got {}",
				expected,
				descriptor.width,
				descriptor.height,
				pixels.len()
			)));
		}
		Ok(Self::from_parts(descriptor, pixels, duration))
	}

	/// Creates a fully transparent frame.
	pub fn placeholder(width: u32, height: u32, duration: u32) -> Result<Self, PngsError> {
		let descriptor = RasterDescriptor::canonical(width, height);
		Self::from_raw(descriptor, vec![0; canonical_len(&descriptor)?], duration)
	}

	pub(super) fn from_parts(descriptor: RasterDescriptor, pixels: Vec<u8>, duration: u32) -> Self {
		Self {
			identity: Arc::new(()),
			descriptor,
			pixels,
			duration,
		}
	}

	/// Returns a copy of this frame with its own identity.
	pub fn duplicate(&self) -> Self {
		Self::from_parts(self.descriptor, self.pixels.clone(), self.duration)
	}

	/// Returns `true` if both handles refer to the same frame.
	pub fn is_same(&self, other: &Frame) -> bool {
		Arc::ptr_eq(&self.identity, &other.identity)
	}

	/// Descriptor of the pixels.
	///
	/// Frames read from a container carry the container header's descriptor.
	pub fn descriptor(&self) -> &RasterDescriptor {
		&self.descriptor
	}

	/// Row-major RGBA pixels.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Mutable access to the pixels. The buffer length cannot change.
	pub fn pixels_mut(&mut self) -> &mut [u8] {
		&mut self.pixels
	}

	/// Display duration in milliseconds.
	pub fn duration(&self) -> u32 {
		self.duration
	}

	/// Sets the display duration.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] for zero; the frame keeps its old duration.
	pub fn set_duration(&mut self, duration: u32) -> Result<(), PngsError> {
		check_duration(duration)?;
		self.duration = duration;
		Ok(())
	}

	/// Replaces the pixels with those decoded from `png`.
	///
	/// The frame is untouched if decoding fails.
	pub fn swap_png(&mut self, png: &[u8]) -> Result<(), PngsError> {
		let (descriptor, pixels) = png::normalize(png)?;
		self.descriptor = descriptor;
		self.pixels = pixels;
		Ok(())
	}

	/// Replaces the pixels with those of the PNG file at `path`.
	pub fn swap_png_path(&mut self, path: impl AsRef<Path>) -> Result<(), PngsError> {
		let data = read_path(path.as_ref())?;
		self.swap_png(&data)
	}

	/// Encodes the pixels as a PNG described by `descriptor`.
	///
	/// Containers pass their header descriptor here; the pixel buffer must match
	/// its size.
	pub fn encode_png(&self, descriptor: &RasterDescriptor) -> Result<Vec<u8>, PngsError> {
		png::encode(descriptor, &self.pixels)
	}

	/// Encodes the pixels with the frame's own descriptor.
	pub fn to_png(&self) -> Result<Vec<u8>, PngsError> {
		self.encode_png(&self.descriptor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn red_png(width: u32, height: u32) -> Vec<u8> {
		let descriptor = RasterDescriptor::new(width, height, 8, png::ColorType::Truecolor);
		let pixels: Vec<u8> = (0..width * height).flat_map(|_| [255, 0, 0]).collect();
		png::encode(&descriptor, &pixels).unwrap()
	}

	#[test]
	fn test_new_normalizes() {
		let frame = Frame::new(&red_png(3, 2), 40).unwrap();
		assert!(frame.descriptor().is_canonical());
		assert_eq!(frame.pixels().len(), 24);
		assert_eq!(&frame.pixels()[..4], &[255, 0, 0, 255]);
		assert_eq!(frame.duration(), 40);
	}

	#[test]
	fn test_zero_duration_rejected() {
		assert!(matches!(Frame::new(&red_png(1, 1), 0), Err(PngsError::Argument { .. })));

		let mut frame = Frame::placeholder(1, 1, 10).unwrap();
		assert!(frame.set_duration(0).is_err());
		assert_eq!(frame.duration(), 10);
	}

	#[test]
	fn test_from_raw_validates() {
		let descriptor = RasterDescriptor::canonical(2, 2);
		assert!(Frame::from_raw(descriptor, vec![0; 15], 1).is_err());

		let gray = RasterDescriptor::new(2, 2, 8, png::ColorType::Grayscale);
		assert!(Frame::from_raw(gray, vec![0; 16], 1).is_err());

		assert!(Frame::from_raw(descriptor, vec![0; 16], 1).is_ok());
	}

	#[test]
	fn test_oversized_frame_is_argument_error() {
		assert!(matches!(
			Frame::placeholder(u32::MAX, u32::MAX, 1),
			Err(PngsError::Argument { .. })
		));
		let huge = RasterDescriptor::canonical(u32::MAX, u32::MAX);
		assert!(matches!(Frame::from_raw(huge, vec![0; 4], 1), Err(PngsError::Argument { .. })));
	}

	#[test]
	fn test_empty_path_is_argument_error() {
		assert!(matches!(Frame::from_path("", 10), Err(PngsError::Argument { .. })));

		let mut frame = Frame::placeholder(1, 1, 10).unwrap();
		assert!(matches!(frame.swap_png_path(""), Err(PngsError::Argument { .. })));
		assert_eq!(frame.pixels(), &[0; 4]);
	}

	#[test]
	fn test_swap_png_keeps_identity_and_rolls_back() {
		let mut frame = Frame::placeholder(1, 1, 10).unwrap();
		let handle = frame.clone();

		frame.swap_png(&red_png(2, 2)).unwrap();
		assert!(frame.is_same(&handle));
		assert_eq!(frame.descriptor().width, 2);

		assert!(frame.swap_png(b"not a png").is_err());
		assert_eq!(frame.pixels().len(), 16);
	}

	#[test]
	fn test_encode_png_with_mismatched_descriptor() {
		let frame = Frame::placeholder(2, 2, 10).unwrap();
		assert!(frame.to_png().is_ok());
		let larger = RasterDescriptor::canonical(3, 3);
		assert!(matches!(frame.encode_png(&larger), Err(PngsError::Argument { .. })));
	}
}
