//! LZ4 block decoder.

use std::fmt::Display;

use super::MIN_MATCH;
use crate::file::{FileType, PngsError};

fn corrupt(position: usize, message: impl Display) -> PngsError {
	PngsError::integrity(FileType::Lz4, format!("corrupt block at byte {position}: {message}"))
}

/// Reads an extended length: bytes are summed until one is below 255.
fn read_length(input: &[u8], pos: &mut usize) -> Result<usize, PngsError> {
	let mut total = 0usize;
	loop {
		let byte = *input.get(*pos).ok_or_else(|| corrupt(*pos, "truncated length"))?;
		*pos += 1;
		total = total
			.checked_add(byte as usize)
			.ok_or_else(|| corrupt(*pos, "length overflow"))?;
		if byte != 255 {
			return Ok(total);
		}
	}
}

/// Decodes one LZ4 block that must expand to exactly `raw_len` bytes.
pub(super) fn decompress_block(input: &[u8], raw_len: usize) -> Result<Vec<u8>, PngsError> {
	let mut out: Vec<u8> = Vec::with_capacity(raw_len);
	let mut pos = 0;

	loop {
		let token = *input.get(pos).ok_or_else(|| corrupt(pos, "missing token"))?;
		pos += 1;

		let mut literals = (token >> 4) as usize;
		if literals == 15 {
			literals += read_length(input, &mut pos)?;
		}
		let literal_end = pos
			.checked_add(literals)
			.filter(|&end| end <= input.len())
			.ok_or_else(|| corrupt(pos, format!("{literals} literals run past the block")))?;
		if literals > raw_len - out.len() {
			return Err(corrupt(pos, "literals overflow the declared size"));
		}
		out.extend_from_slice(&input[pos..literal_end]);
		pos = literal_end;

		// The last sequence carries literals only
		if pos == input.len() {
			break;
		}

		let offset_bytes = input
			.get(pos..pos + 2)
			.ok_or_else(|| corrupt(pos, "truncated match offset"))?;
		let offset = u16::from_le_bytes([offset_bytes[0], offset_bytes[1]]) as usize;
		if offset == 0 || offset > out.len() {
			return Err(corrupt(pos, format!("match offset {offset} with {} bytes decoded", out.len())));
		}
		pos += 2;

		let mut length = (token & 0x0F) as usize;
		if length == 15 {
			length += read_length(input, &mut pos)?;
		}
		length += MIN_MATCH;
		if length > raw_len - out.len() {
			return Err(corrupt(pos, "match overflows the declared size"));
		}

		let start = out.len() - offset;
		if offset >= length {
			out.extend_from_within(start..start + length);
		} else {
			// Overlapping copy repeats the last `offset` bytes
			for i in 0..length {
				let byte = out[start + i];
				out.push(byte);
			}
		}
	}

	if out.len() != raw_len {
		return Err(PngsError::integrity(
			FileType::Lz4,
			format!("block decoded to {} bytes, expected {raw_len}", out.len()),
		));
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_overlapping_match() {
		// literal "ab", then offset 2 length 6
		let block = [0x22, b'a', b'b', 2, 0, 0x00];
		assert_eq!(decompress_block(&block, 8).unwrap(), b"abababab");
	}

	#[test]
	fn test_rejects_zero_and_far_offsets() {
		let zero = [0x10, b'a', 0, 0, 0x00];
		assert!(matches!(decompress_block(&zero, 5), Err(PngsError::Integrity { .. })));

		let far = [0x10, b'a', 9, 0, 0x00];
		assert!(matches!(decompress_block(&far, 5), Err(PngsError::Integrity { .. })));
	}

	#[test]
	fn test_rejects_truncation_and_size_mismatch() {
		assert!(decompress_block(&[], 0).is_err());
		assert!(decompress_block(&[0x50, 1, 2], 5).is_err());
		assert!(decompress_block(&[0x30, 1, 2, 3], 5).is_err());
		assert!(decompress_block(&[0x30, 1, 2, 3], 2).is_err());
		assert!(decompress_block(&[0xF0, 255, 255], 1000).is_err());
	}
}
