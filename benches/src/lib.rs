//! Benchmark helper utilities for pngs-rs
//!
//! This module provides generators for synthetic frames and PNG inputs used by
//! the benchmark suite. Everything is generated in memory so the benchmarks
//! run without fixture files.

use pngs_types::file::png::{self, ColorType, RasterDescriptor};
use pngs_types::file::pngs::{File, Frame};

/// Generates RGBA pixels resembling a rendered sprite frame.
///
/// Smooth gradients with a moving disc give the block compressor realistic
/// runs without being trivially compressible.
pub fn generate_frame_pixels(width: u32, height: u32, phase: u32) -> Vec<u8> {
	let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
	let (cx, cy) = ((width / 2 + phase * 3) % width.max(1), height / 2);
	let radius = (width.min(height) / 4).max(1);

	for y in 0..height {
		for x in 0..width {
			let dx = x.abs_diff(cx);
			let dy = y.abs_diff(cy);
			let inside = dx * dx + dy * dy <= radius * radius;
			let r = (x * 255 / width.max(1)) as u8;
			let g = (y * 255 / height.max(1)) as u8;
			let b = if inside { 255 } else { (phase * 16) as u8 };
			let a = if inside { 255 } else { 192 };
			pixels.extend_from_slice(&[r, g, b, a]);
		}
	}
	pixels
}

/// Generates a PNG of the given color type (8-bit) for decode benchmarks.
pub fn generate_test_png(width: u32, height: u32, color_type: ColorType) -> Vec<u8> {
	let rgba = generate_frame_pixels(width, height, 0);
	let raw: Vec<u8> = match color_type {
		ColorType::Grayscale => rgba.chunks_exact(4).map(|p| p[0]).collect(),
		ColorType::GrayscaleAlpha => rgba.chunks_exact(4).flat_map(|p| [p[0], p[3]]).collect(),
		ColorType::Truecolor => rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
		ColorType::TruecolorAlpha | ColorType::Indexed => rgba,
	};
	let color_type = match color_type {
		ColorType::Indexed => ColorType::TruecolorAlpha,
		other => other,
	};
	let descriptor = RasterDescriptor::new(width, height, 8, color_type);
	png::encode(&descriptor, &raw).unwrap_or_default()
}

/// Generates a container with `frames` animated frames of the given size.
pub fn generate_test_sequence(width: u32, height: u32, frames: u32) -> File {
	let frames = (0..frames).filter_map(|phase| {
		let descriptor = RasterDescriptor::canonical(width, height);
		Frame::from_raw(descriptor, generate_frame_pixels(width, height, phase), 40).ok()
	});
	File::from_frames(true, frames)
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny frame: 64x64 (4,096 pixels)
	pub const TINY: (u32, u32) = (64, 64);
	/// Small frame: 256x256 (65,536 pixels)
	pub const SMALL: (u32, u32) = (256, 256);
	/// Medium frame: 512x512 (262,144 pixels)
	pub const MEDIUM: (u32, u32) = (512, 512);
	/// HD frame: 1280x720 (921,600 pixels)
	pub const HD: (u32, u32) = (1280, 720);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_frame_pixels() {
		let pixels = generate_frame_pixels(16, 8, 1);
		assert_eq!(pixels.len(), 16 * 8 * 4);
	}

	#[test]
	fn test_generate_test_png_decodes() {
		for color_type in [ColorType::Grayscale, ColorType::Truecolor, ColorType::GrayscaleAlpha] {
			let data = generate_test_png(10, 6, color_type);
			let (descriptor, rgba) = png::normalize(&data).unwrap();
			assert_eq!((descriptor.width, descriptor.height), (10, 6));
			assert_eq!(rgba.len(), 240);
		}
	}

	#[test]
	fn test_generate_test_sequence() {
		let sequence = generate_test_sequence(8, 8, 3);
		assert_eq!(sequence.frame_count(), 3);
		assert!(sequence.header().is_some());
	}
}
