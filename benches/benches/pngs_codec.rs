//! Benchmark suite for the PNG codec, the block compressor and container I/O
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pngs_benches::{generate_frame_pixels, generate_test_png, generate_test_sequence, sizes};
use pngs_types::file::lz4::{self, CompressionLevel};
use pngs_types::file::png::{self, ColorType};
use pngs_types::file::pngs::{File, SaveConfig};
use std::hint::black_box;

/// Benchmark block compression at both effort levels
fn bench_lz4_compress(c: &mut Criterion) {
	let mut group = c.benchmark_group("lz4_compress");

	for (name, (width, height)) in [("small", sizes::SMALL), ("medium", sizes::MEDIUM)] {
		let pixels = generate_frame_pixels(width, height, 3);
		group.throughput(Throughput::Bytes(pixels.len() as u64));

		for level in [CompressionLevel::Fast, CompressionLevel::High] {
			group.bench_with_input(
				BenchmarkId::new(level.to_string(), name),
				&pixels,
				|b, pixels| {
					b.iter(|| black_box(lz4::compress(black_box(pixels), level)));
				},
			);
		}
	}

	group.finish();
}

/// Benchmark block decompression
fn bench_lz4_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("lz4_decompress");

	for (name, (width, height)) in [("small", sizes::SMALL), ("hd", sizes::HD)] {
		let pixels = generate_frame_pixels(width, height, 3);
		let Ok(packed) = lz4::compress(&pixels, CompressionLevel::High) else {
			eprintln!("Warning: Could not compress {name} frame");
			continue;
		};

		group.throughput(Throughput::Bytes(pixels.len() as u64));
		group.bench_with_input(BenchmarkId::new("decompress", name), &packed, |b, packed| {
			b.iter(|| black_box(lz4::decompress(black_box(packed), Some(pixels.len()))));
		});
	}

	group.finish();
}

/// Benchmark PNG normalization per input color type
fn bench_png_normalize(c: &mut Criterion) {
	let mut group = c.benchmark_group("png_normalize");
	let (width, height) = sizes::SMALL;
	group.throughput(Throughput::Elements(width as u64 * height as u64));

	for color_type in [ColorType::Grayscale, ColorType::Truecolor, ColorType::TruecolorAlpha] {
		let data = generate_test_png(width, height, color_type);
		group.bench_with_input(
			BenchmarkId::new("normalize", color_type.to_string()),
			&data,
			|b, data| {
				b.iter(|| black_box(png::normalize(black_box(data))));
			},
		);
	}

	group.finish();
}

/// Benchmark container save and load
fn bench_container_io(c: &mut Criterion) {
	let mut group = c.benchmark_group("pngs_container");
	let (width, height) = sizes::TINY;
	let sequence = generate_test_sequence(width, height, 24);

	let Ok(bytes) = sequence.to_bytes() else {
		eprintln!("Warning: Could not serialize test sequence");
		return;
	};

	group.bench_function("save_fast", |b| {
		b.iter(|| black_box(sequence.to_bytes_with_config(&SaveConfig::fast())));
	});

	group.throughput(Throughput::Bytes(bytes.len() as u64));
	group.bench_function("load", |b| {
		b.iter(|| black_box(File::from_bytes(black_box(&bytes))));
	});

	group.finish();
}

criterion_group!(
	benches,
	bench_lz4_compress,
	bench_lz4_decompress,
	bench_png_normalize,
	bench_container_io
);
criterion_main!(benches);
