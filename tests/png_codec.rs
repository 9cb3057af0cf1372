//! PNG codec checks against the `image` crate.
//!
//! Fixtures are encoded with `image`'s PNG encoder, which picks its own filter
//! types per row, and decoded with both implementations.

use std::io::{Cursor, Write};

use flate2::{Compression, write::ZlibEncoder};
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use pngs_rs::png::{self, ColorType, RasterDescriptor};
use pngs_rs::{FileType, PngsError};

fn encode_with_image(img: DynamicImage) -> Vec<u8> {
	let mut out = Cursor::new(Vec::new());
	img.write_to(&mut out, ImageFormat::Png).unwrap();
	out.into_inner()
}

fn decode_with_image(data: &[u8]) -> Vec<u8> {
	image::load_from_memory_with_format(data, ImageFormat::Png)
		.unwrap()
		.to_rgba8()
		.into_raw()
}

fn gradient(width: u32, height: u32, x: u32, y: u32) -> u8 {
	((x * 251 / width.max(1) + y * 97 / height.max(1)) % 256) as u8
}

#[test]
fn test_grayscale_matches_image() {
	let img = GrayImage::from_fn(33, 17, |x, y| image::Luma([gradient(33, 17, x, y)]));
	let data = encode_with_image(DynamicImage::ImageLuma8(img));

	let (descriptor, rgba) = png::normalize(&data).unwrap();
	assert_eq!(descriptor, RasterDescriptor::canonical(33, 17));
	assert_eq!(rgba, decode_with_image(&data));
}

#[test]
fn test_grayscale_alpha_matches_image() {
	let img = GrayAlphaImage::from_fn(20, 9, |x, y| {
		image::LumaA([gradient(20, 9, x, y), (x * 12) as u8])
	});
	let data = encode_with_image(DynamicImage::ImageLumaA8(img));

	let raw = png::decode(&data).unwrap();
	assert_eq!(raw.descriptor.color_type, ColorType::GrayscaleAlpha);

	let (_, rgba) = png::normalize(&data).unwrap();
	assert_eq!(rgba, decode_with_image(&data));
}

#[test]
fn test_truecolor_matches_image() {
	let img = RgbImage::from_fn(64, 31, |x, y| {
		image::Rgb([gradient(64, 31, x, y), (y * 8) as u8, (x ^ y) as u8])
	});
	let data = encode_with_image(DynamicImage::ImageRgb8(img));

	let (_, rgba) = png::normalize(&data).unwrap();
	assert_eq!(rgba, decode_with_image(&data));
	assert!(rgba.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn test_truecolor_alpha_matches_image() {
	let img = RgbaImage::from_fn(47, 23, |x, y| {
		image::Rgba([(x * 5) as u8, (y * 11) as u8, gradient(47, 23, x, y), (x + y) as u8])
	});
	let data = encode_with_image(DynamicImage::ImageRgba8(img.clone()));

	let (_, rgba) = png::normalize(&data).unwrap();
	assert_eq!(rgba, img.into_raw());
}

#[test]
fn test_indexed_with_transparency() {
	// 4x2 image with a 3-entry palette, only the first entry made transparent
	let descriptor = RasterDescriptor::new(4, 2, 8, ColorType::Indexed);
	let scanlines = [0u8, 0, 1, 2, 1, 0, 2, 2, 0, 1];

	let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
	zlib.write_all(&scanlines).unwrap();
	let idat = zlib.finish().unwrap();

	let mut data = png::SIGNATURE.to_vec();
	png::write_chunk(&mut data, b"IHDR", &descriptor.to_ihdr()).unwrap();
	png::write_chunk(&mut data, b"PLTE", &[255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
	png::write_chunk(&mut data, b"tRNS", &[0]).unwrap();
	png::write_chunk(&mut data, b"IDAT", &idat).unwrap();
	png::write_chunk(&mut data, b"IEND", &[]).unwrap();

	let (_, rgba) = png::normalize(&data).unwrap();
	assert_eq!(rgba, decode_with_image(&data));
	assert_eq!(&rgba[..8], &[255, 0, 0, 0, 0, 255, 0, 255]);
}

#[test]
fn test_encoded_png_readable_by_image() {
	let descriptor = RasterDescriptor::new(5, 3, 8, ColorType::Truecolor);
	let pixels: Vec<u8> = (0..45).map(|i| (i * 5) as u8).collect();
	let data = png::encode(&descriptor, &pixels).unwrap();

	let decoded = image::load_from_memory_with_format(&data, ImageFormat::Png)
		.unwrap()
		.to_rgb8();
	assert_eq!(decoded.dimensions(), (5, 3));
	assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_to_truecolor_alpha_is_canonical() {
	let img = GrayImage::from_fn(6, 6, |x, _| image::Luma([(x * 40) as u8]));
	let data = encode_with_image(DynamicImage::ImageLuma8(img));

	let canonical = png::to_truecolor_alpha(&data).unwrap();
	let raw = png::decode(&canonical).unwrap();
	assert!(raw.descriptor.is_canonical());
	assert_eq!(decode_with_image(&canonical), decode_with_image(&data));
}

#[test]
fn test_sixteen_bit_is_unsupported() {
	let img = image::ImageBuffer::<image::Luma<u16>, _>::from_fn(2, 2, |x, _| {
		image::Luma([x as u16 * 1000])
	});
	let data = encode_with_image(DynamicImage::ImageLuma16(img));

	assert!(matches!(
		png::normalize(&data),
		Err(PngsError::UnsupportedFeature { file_type: FileType::Png, .. })
	));
}

#[test]
fn test_corrupt_crc_and_lenient_config() {
	let img = RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]));
	let mut data = encode_with_image(DynamicImage::ImageRgb8(img));
	// Last byte of the IHDR CRC
	data[8 + 8 + 13 + 3] ^= 0xFF;

	assert!(matches!(png::normalize(&data), Err(PngsError::Integrity { .. })));

	let (descriptor, _) =
		png::normalize_with_config(&data, &png::DecodeConfig::lenient()).unwrap();
	assert_eq!((descriptor.width, descriptor.height), (3, 3));
}

#[test]
fn test_decode_encode_decode_is_pixel_exact() {
	let fixtures = [
		DynamicImage::ImageLuma8(GrayImage::from_fn(9, 4, |x, y| image::Luma([(x * y * 7) as u8]))),
		DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(5, 5, |x, y| {
			image::LumaA([(x * 50) as u8, (y * 50) as u8])
		})),
		DynamicImage::ImageRgb8(RgbImage::from_fn(7, 3, |x, y| image::Rgb([x as u8, y as u8, 9]))),
		DynamicImage::ImageRgba8(RgbaImage::from_fn(3, 8, |x, y| {
			image::Rgba([x as u8, y as u8, 200, (x * 80) as u8])
		})),
	];

	for img in fixtures {
		let data = encode_with_image(img);
		let raw = png::decode(&data).unwrap();
		let (_, first) = png::normalize(&data).unwrap();

		let encoded = png::encode(&raw.descriptor, &raw.pixels).unwrap();
		let (descriptor, second) = png::normalize(&encoded).unwrap();
		assert_eq!((descriptor.width, descriptor.height), (raw.descriptor.width, raw.descriptor.height));
		assert_eq!(first, second);
	}
}
