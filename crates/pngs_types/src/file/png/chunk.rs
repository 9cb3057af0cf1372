//! PNG chunk framing.

use log::trace;

use super::SIGNATURE;
use crate::file::{FileType, PngsError};

/// Bytes of framing around every chunk payload (length + type + CRC)
const CHUNK_OVERHEAD: usize = 12;

/// Computes the PNG CRC-32 of `kind` followed by `data`.
pub fn crc32(kind: &[u8; 4], data: &[u8]) -> u32 {
	let mut hasher = crc32fast::Hasher::new();
	hasher.update(kind);
	hasher.update(data);
	hasher.finalize()
}

/// Largest payload a chunk length field may declare.
pub const MAX_CHUNK_LEN: usize = (1 << 31) - 1;

/// Appends one framed chunk to `out`.
///
/// # Errors
///
/// Returns [`PngsError::Argument`] if `data` is longer than [`MAX_CHUNK_LEN`];
/// `out` is left untouched.
pub fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) -> Result<(), PngsError> {
	let len = u32::try_from(data.len())
		.ok()
		.filter(|&len| len as usize <= MAX_CHUNK_LEN)
		.ok_or_else(|| {
			PngsError::argument(format!(
				"{} chunk payload of {} bytes exceeds the PNG limit",
				String::from_utf8_lossy(kind),
				data.len()
			))
		})?;

	out.extend_from_slice(&len.to_be_bytes());
	out.extend_from_slice(kind);
	out.extend_from_slice(data);
	out.extend_from_slice(&crc32(kind, data).to_be_bytes());
	Ok(())
}

/// A single chunk borrowed from a PNG byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
	/// Absolute offset of the chunk's length field
	pub offset: usize,
	/// Four-byte chunk tag
	pub kind: [u8; 4],
	/// Chunk payload
	pub data: &'a [u8],
	/// CRC stored in the stream
	pub crc: u32,
}

impl Chunk<'_> {
	/// Chunk tag as text, `"????"` if it is not valid UTF-8.
	pub fn kind_str(&self) -> &str {
		std::str::from_utf8(&self.kind).unwrap_or("????")
	}

	/// Absolute offset of the payload.
	pub fn data_offset(&self) -> usize {
		self.offset + 8
	}

	/// Critical chunks have an uppercase first letter.
	pub fn is_critical(&self) -> bool {
		self.kind[0].is_ascii_uppercase()
	}

	/// Returns `true` if the stored CRC matches the chunk contents.
	pub fn crc_matches(&self) -> bool {
		crc32(&self.kind, self.data) == self.crc
	}
}

/// Iterator over the chunks of a PNG byte stream.
///
/// Yields every chunk up to and including `IEND`. A stream that ends before
/// `IEND`, or a chunk that runs past the end of the data, yields a format error
/// and stops the iteration.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
	data: &'a [u8],
	position: usize,
	finished: bool,
}

impl<'a> ChunkReader<'a> {
	/// Checks the PNG signature and positions the reader on the first chunk.
	pub fn new(data: &'a [u8]) -> Result<Self, PngsError> {
		if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
			return Err(PngsError::format(FileType::Png, 0, "invalid PNG signature"));
		}

		Ok(Self {
			data,
			position: SIGNATURE.len(),
			finished: false,
		})
	}

	/// Offset of the next chunk to be read.
	pub fn position(&self) -> usize {
		self.position
	}

	fn read_chunk(&mut self) -> Result<Chunk<'a>, PngsError> {
		let offset = self.position;
		let remaining = self.data.len() - offset;
		if remaining == 0 {
			return Err(PngsError::format(FileType::Png, offset, "missing IEND chunk"));
		}
		if remaining < CHUNK_OVERHEAD {
			return Err(PngsError::format(
				FileType::Png,
				offset,
				format!("truncated chunk header: {remaining} bytes left"),
			));
		}

		let header = &self.data[offset..offset + 8];
		let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
		let kind = [header[4], header[5], header[6], header[7]];

		if length > remaining - CHUNK_OVERHEAD {
			return Err(PngsError::format(
				FileType::Png,
				offset,
				format!(
					"chunk {} declares {} bytes but only {} remain",
					String::from_utf8_lossy(&kind),
					length,
					remaining - CHUNK_OVERHEAD
				),
			));
		}

		let data_start = offset + 8;
		let data = &self.data[data_start..data_start + length];
		let crc_bytes = &self.data[data_start + length..data_start + length + 4];
		let crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

		self.position = data_start + length + 4;

		let chunk = Chunk {
			offset,
			kind,
			data,
			crc,
		};
		trace!("PNG chunk {} at {} ({} bytes)", chunk.kind_str(), offset, length);
		Ok(chunk)
	}
}

impl<'a> Iterator for ChunkReader<'a> {
	type Item = Result<Chunk<'a>, PngsError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		match self.read_chunk() {
			Ok(chunk) => {
				if &chunk.kind == b"IEND" {
					self.finished = true;
				}
				Some(Ok(chunk))
			}
			Err(e) => {
				self.finished = true;
				Some(Err(e))
			}
		}
	}
}
