//! `.pngs` binary reader and writer.

use std::io::Write;

use log::{debug, trace};

use super::constants::{
	FRAME_RECORD_HEADER_SIZE, FRAME_SIGNATURE, HEADER_SIZE, MAX_MAJOR_REVISION, METADATA_SIGNATURE,
	SIGNATURE,
};
use super::frame::Frame;
use super::header::{Header, is_supported_revision};
use super::metadata::MetadataTable;
use crate::file::lz4::{self, CompressionLevel};
use crate::file::png::{
	ColorType, CompressionMethod, FilterMethod, InterlaceMethod, RasterDescriptor,
};
use crate::file::{FileType, PngsError};

/// Bounds-checked cursor over the input buffer.
struct ByteReader<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> ByteReader<'a> {
	fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			offset: 0,
		}
	}

	fn is_at_end(&self) -> bool {
		self.offset == self.data.len()
	}

	fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], PngsError> {
		let remaining = self.data.len() - self.offset;
		if len > remaining {
			return Err(PngsError::format(
				FileType::Pngs,
				self.offset,
				format!("truncated {what}: need {len} bytes, {remaining} left"),
			));
		}
		let bytes = &self.data[self.offset..self.offset + len];
		self.offset += len;
		Ok(bytes)
	}

	fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], PngsError> {
		let bytes = self.take(N, what)?;
		let mut array = [0u8; N];
		array.copy_from_slice(bytes);
		Ok(array)
	}

	fn u8(&mut self, what: &str) -> Result<u8, PngsError> {
		Ok(self.array::<1>(what)?[0])
	}

	fn u32_be(&mut self, what: &str) -> Result<u32, PngsError> {
		Ok(u32::from_be_bytes(self.array(what)?))
	}

	fn signature(&mut self, expected: &[u8], what: &str) -> Result<(), PngsError> {
		let start = self.offset;
		let remaining = &self.data[start..];
		if remaining.len() < expected.len() || &remaining[..expected.len()] != expected {
			return Err(PngsError::format(
				FileType::Pngs,
				start,
				format!("missing {what} signature {:?}", String::from_utf8_lossy(expected)),
			));
		}
		self.offset += expected.len();
		Ok(())
	}
}

/// Reads a descriptor byte through `TryFrom<u8>`, reporting unknown tags at `offset`.
fn tag<T: TryFrom<u8, Error = u8>>(
	reader: &mut ByteReader<'_>,
	what: &str,
) -> Result<T, PngsError> {
	let offset = reader.offset;
	let value = reader.u8(what)?;
	T::try_from(value)
		.map_err(|v| PngsError::format(FileType::Pngs, offset, format!("unknown {what} {v}")))
}

/// Steps of a load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
	TopSignature,
	HeaderFields,
	MetadataSignature,
	MetadataEntries,
	FrameSignature,
	FrameFields,
	Payload {
		record_offset: usize,
		compressed_len: usize,
		duration: u32,
	},
	EndOfStream,
}

/// Parses a complete `.pngs` byte buffer.
///
/// Returns the header and the decompressed frames, or the first error met.
/// Nothing is returned on failure.
pub(super) fn load(data: &[u8]) -> Result<(Header, Vec<Frame>), PngsError> {
	let mut reader = ByteReader::new(data);
	let mut state = LoadState::TopSignature;
	let mut header = Header::default();
	let mut frames = Vec::new();

	loop {
		trace!("PNGS load state {:?} at byte {}", state, reader.offset);

		state = match state {
			LoadState::TopSignature => {
				reader.signature(SIGNATURE, "file")?;
				LoadState::HeaderFields
			}
			LoadState::HeaderFields => {
				let revision_offset = reader.offset;
				let revision = f32::from_le_bytes(reader.array("revision")?);
				if !revision.is_finite() || revision < 0.0 {
					return Err(PngsError::format(
						FileType::Pngs,
						revision_offset,
						format!("invalid revision {revision}"),
					));
				}
				if !is_supported_revision(revision) {
					return Err(PngsError::unsupported(
						FileType::Pngs,
						format!("revision {revision} (newest readable major is {MAX_MAJOR_REVISION})"),
					));
				}

				let width = reader.u32_be("width")?;
				let height = reader.u32_be("height")?;
				let loop_count = i32::from_le_bytes(reader.array("loop count")?);
				let bit_depth = reader.u8("bit depth")?;
				let color_type: ColorType = tag(&mut reader, "color type")?;
				let compression_method: CompressionMethod = tag(&mut reader, "compression method")?;
				let filter_method: FilterMethod = tag(&mut reader, "filter method")?;
				let interlace_method: InterlaceMethod = tag(&mut reader, "interlace method")?;

				let descriptor = RasterDescriptor {
					width,
					height,
					bit_depth,
					color_type,
					compression_method,
					filter_method,
					interlace_method,
				};
				header = Header::from_parts(descriptor, loop_count, revision, MetadataTable::new());
				LoadState::MetadataSignature
			}
			LoadState::MetadataSignature => {
				reader.signature(METADATA_SIGNATURE, "metadata")?;
				LoadState::MetadataEntries
			}
			LoadState::MetadataEntries => {
				let count = reader.u32_be("metadata count")?;
				for _ in 0..count {
					let entry_offset = reader.offset;
					let len = reader.u32_be("metadata entry length")? as usize;
					let bytes = reader.take(len, "metadata entry")?;
					let entry = std::str::from_utf8(bytes)
						.ok()
						.filter(|s| s.is_ascii())
						.ok_or_else(|| {
							PngsError::format(
								FileType::Pngs,
								entry_offset,
								"metadata entry is not ASCII",
							)
						})?;
					if !header.metadata_mut().add(entry)? {
						debug!("Dropping duplicate metadata entry {entry:?}");
					}
				}
				LoadState::FrameSignature
			}
			LoadState::FrameSignature => {
				if reader.is_at_end() {
					LoadState::EndOfStream
				} else {
					reader.signature(FRAME_SIGNATURE, "frame")?;
					LoadState::FrameFields
				}
			}
			LoadState::FrameFields => {
				let record_offset = reader.offset - FRAME_SIGNATURE.len();
				let compressed_len = reader.u32_be("frame length")? as usize;
				let duration_offset = reader.offset;
				let duration = reader.u32_be("frame duration")?;
				if duration == 0 {
					return Err(PngsError::format(
						FileType::Pngs,
						duration_offset,
						"frame duration is zero",
					));
				}
				LoadState::Payload {
					record_offset,
					compressed_len,
					duration,
				}
			}
			LoadState::Payload {
				record_offset,
				compressed_len,
				duration,
			} => {
				let payload = reader.take(compressed_len, "frame payload")?;
				let pixels = lz4::decompress(payload, None).map_err(|e| {
					PngsError::integrity(
						FileType::Pngs,
						format!("frame {} at byte {record_offset}: {e}", frames.len()),
					)
				})?;
				trace!(
					"Frame {} at byte {}: {} -> {} bytes, {} ms",
					frames.len(),
					record_offset,
					compressed_len,
					pixels.len(),
					duration
				);
				frames.push(Frame::from_parts(*header.descriptor(), pixels, duration));
				LoadState::FrameSignature
			}
			LoadState::EndOfStream => break,
		};
	}

	debug!("Loaded PNGS: {} frames, {}", frames.len(), header.descriptor());
	Ok((header, frames))
}

/// Serializes a header and frames.
///
/// All output is produced in memory first, so `writer` receives either the
/// whole file or nothing when compression fails.
pub(super) fn save<W: Write>(
	header: &Header,
	frames: &[Frame],
	level: CompressionLevel,
	writer: &mut W,
) -> Result<(), PngsError> {
	let bytes = to_bytes(header, frames, level)?;
	writer.write_all(&bytes)?;
	writer.flush()?;
	Ok(())
}

/// Serializes a header and frames into a new buffer.
pub(super) fn to_bytes(
	header: &Header,
	frames: &[Frame],
	level: CompressionLevel,
) -> Result<Vec<u8>, PngsError> {
	let descriptor = header.descriptor();
	let mut out = Vec::with_capacity(HEADER_SIZE + frames.len() * FRAME_RECORD_HEADER_SIZE);

	out.extend_from_slice(SIGNATURE);
	out.extend_from_slice(&header.revision().to_le_bytes());
	out.extend_from_slice(&descriptor.width.to_be_bytes());
	out.extend_from_slice(&descriptor.height.to_be_bytes());
	out.extend_from_slice(&header.loop_count().to_le_bytes());
	out.push(descriptor.bit_depth);
	out.push(descriptor.color_type as u8);
	out.push(descriptor.compression_method as u8);
	out.push(descriptor.filter_method as u8);
	out.push(descriptor.interlace_method as u8);

	out.extend_from_slice(METADATA_SIGNATURE);
	out.extend_from_slice(&length_u32(header.metadata().len(), "metadata count")?.to_be_bytes());
	for entry in header.metadata() {
		out.extend_from_slice(&length_u32(entry.len(), "metadata entry")?.to_be_bytes());
		out.extend_from_slice(entry.as_bytes());
	}

	for (index, frame) in frames.iter().enumerate() {
		let compressed = lz4::compress(frame.pixels(), level)?;
		trace!(
			"Frame {}: {} -> {} bytes, {} ms",
			index,
			frame.pixels().len(),
			compressed.len(),
			frame.duration()
		);
		out.extend_from_slice(FRAME_SIGNATURE);
		out.extend_from_slice(&length_u32(compressed.len(), "frame payload")?.to_be_bytes());
		out.extend_from_slice(&frame.duration().to_be_bytes());
		out.extend_from_slice(&compressed);
	}

	debug!("Saved PNGS: {} frames, {} bytes ({level})", frames.len(), out.len());
	Ok(out)
}

fn length_u32(len: usize, what: &str) -> Result<u32, PngsError> {
	u32::try_from(len).map_err(|_| PngsError::argument(format!("{what} too large: {len}")))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> (Header, Vec<Frame>) {
		let mut header = Header::new(RasterDescriptor::canonical(2, 1));
		header.set_loop_count(2);
		header.metadata_mut().add("title=test").unwrap();
		let frames = vec![
			Frame::from_raw(RasterDescriptor::canonical(2, 1), vec![1; 8], 100).unwrap(),
			Frame::from_raw(RasterDescriptor::canonical(2, 1), vec![2; 8], 250).unwrap(),
		];
		(header, frames)
	}

	#[test]
	fn test_header_byte_layout() {
		let (header, frames) = sample();
		let bytes = to_bytes(&header, &frames, CompressionLevel::Fast).unwrap();

		assert_eq!(&bytes[0..5], b"$PNGS");
		// 1.0 as a little-endian f32
		assert_eq!(&bytes[5..9], &[0x00, 0x00, 0x80, 0x3F]);
		assert_eq!(&bytes[9..13], &[0, 0, 0, 2]);
		assert_eq!(&bytes[13..17], &[0, 0, 0, 1]);
		assert_eq!(&bytes[17..21], &2i32.to_le_bytes());
		assert_eq!(&bytes[21..26], &[8, 6, 0, 0, 0]);
		assert_eq!(&bytes[26..30], b"$MET");
		assert_eq!(&bytes[30..34], &[0, 0, 0, 1]);
		assert_eq!(&bytes[34..38], &[0, 0, 0, 10]);
		assert_eq!(&bytes[38..48], b"title=test");
		assert_eq!(&bytes[48..52], b"$SEQ");
		assert_eq!(&bytes[56..60], &[0, 0, 0, 100]);
	}

	#[test]
	fn test_load_roundtrip() {
		let (header, frames) = sample();
		let bytes = to_bytes(&header, &frames, CompressionLevel::High).unwrap();
		let (loaded_header, loaded) = load(&bytes).unwrap();

		assert_eq!(loaded_header, header);
		assert_eq!(loaded.len(), 2);
		assert_eq!(loaded[1].pixels(), &[2; 8]);
		assert_eq!(loaded[1].duration(), 250);
	}

	#[test]
	fn test_signature_offsets() {
		let (header, frames) = sample();
		let bytes = to_bytes(&header, &frames, CompressionLevel::Fast).unwrap();

		let err = load(b"$PNGX").unwrap_err();
		assert_eq!(err.offset(), Some(0));

		let mut bad_meta = bytes.clone();
		bad_meta[26] = b'#';
		assert_eq!(load(&bad_meta).unwrap_err().offset(), Some(26));

		let mut bad_frame = bytes.clone();
		bad_frame[48] = b'#';
		assert_eq!(load(&bad_frame).unwrap_err().offset(), Some(48));
	}

	#[test]
	fn test_truncation_and_corruption() {
		let (header, frames) = sample();
		let bytes = to_bytes(&header, &frames, CompressionLevel::Fast).unwrap();

		// Cut inside the second frame's payload
		let truncated = &bytes[..bytes.len() - 1];
		assert!(matches!(load(truncated), Err(PngsError::Format { .. })));

		// Corrupt the first payload's size prefix
		let mut corrupt = bytes.clone();
		corrupt[60] ^= 0x40;
		assert!(matches!(load(&corrupt), Err(PngsError::Integrity { .. })));
	}

	#[test]
	fn test_rejects_future_and_invalid_revisions() {
		let (header, frames) = sample();
		let mut bytes = to_bytes(&header, &frames, CompressionLevel::Fast).unwrap();

		bytes[5..9].copy_from_slice(&2.0f32.to_le_bytes());
		assert!(matches!(load(&bytes), Err(PngsError::UnsupportedFeature { .. })));

		bytes[5..9].copy_from_slice(&f32::NAN.to_le_bytes());
		assert_eq!(load(&bytes).unwrap_err().offset(), Some(5));
	}

	#[test]
	fn test_zero_duration_record() {
		let (header, frames) = sample();
		let mut bytes = to_bytes(&header, &frames, CompressionLevel::Fast).unwrap();
		bytes[56..60].copy_from_slice(&[0; 4]);
		assert_eq!(load(&bytes).unwrap_err().offset(), Some(56));
	}
}
