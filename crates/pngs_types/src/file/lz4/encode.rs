//! LZ4 block encoder.

use super::{CompressionLevel, LAST_LITERALS, MAX_DISTANCE, MF_LIMIT, MIN_MATCH};

const FAST_HASH_BITS: u32 = 12;
const HIGH_HASH_BITS: u32 = 16;
const HIGH_MAX_ATTEMPTS: usize = 64;

#[inline]
fn read_u32(input: &[u8], pos: usize) -> u32 {
	u32::from_le_bytes([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]])
}

#[inline]
fn hash(sequence: u32, bits: u32) -> usize {
	(sequence.wrapping_mul(2_654_435_761) >> (32 - bits)) as usize
}

/// Length of the common run at `candidate` and `pos`, not reaching past `limit`.
#[inline]
fn match_length(input: &[u8], candidate: usize, pos: usize, limit: usize) -> usize {
	input[pos..limit]
		.iter()
		.zip(&input[candidate..])
		.take_while(|(a, b)| a == b)
		.count()
}

/// Source of back-reference candidates.
trait MatchFinder {
	/// Returns the best earlier match `(start, length)` for `pos`, then indexes `pos`.
	fn find(&mut self, input: &[u8], pos: usize, limit: usize) -> Option<(usize, usize)>;

	/// Indexes `pos` without searching.
	fn insert(&mut self, input: &[u8], pos: usize);
}

/// One candidate per bucket; newer positions overwrite older ones.
struct HashTable {
	// Position + 1, zero marks an empty bucket
	slots: Vec<u32>,
}

impl HashTable {
	fn new() -> Self {
		Self {
			slots: vec![0; 1 << FAST_HASH_BITS],
		}
	}
}

impl MatchFinder for HashTable {
	fn find(&mut self, input: &[u8], pos: usize, limit: usize) -> Option<(usize, usize)> {
		let sequence = read_u32(input, pos);
		let slot = &mut self.slots[hash(sequence, FAST_HASH_BITS)];
		let previous = *slot as usize;
		*slot = pos as u32 + 1;

		let candidate = previous.checked_sub(1)?;
		if pos - candidate > MAX_DISTANCE || read_u32(input, candidate) != sequence {
			return None;
		}
		Some((candidate, match_length(input, candidate, pos, limit)))
	}

	fn insert(&mut self, input: &[u8], pos: usize) {
		self.slots[hash(read_u32(input, pos), FAST_HASH_BITS)] = pos as u32 + 1;
	}
}

/// Hash heads plus a 64K ring of backward deltas linking equal-hash positions.
struct HashChain {
	heads: Vec<u32>,
	deltas: Vec<u16>,
}

impl HashChain {
	fn new() -> Self {
		Self {
			heads: vec![0; 1 << HIGH_HASH_BITS],
			deltas: vec![0; MAX_DISTANCE + 1],
		}
	}
}

impl MatchFinder for HashChain {
	fn find(&mut self, input: &[u8], pos: usize, limit: usize) -> Option<(usize, usize)> {
		let sequence = read_u32(input, pos);
		let mut best: Option<(usize, usize)> = None;
		let mut next = self.heads[hash(sequence, HIGH_HASH_BITS)] as usize;

		for _ in 0..HIGH_MAX_ATTEMPTS {
			let Some(candidate) = next.checked_sub(1) else {
				break;
			};
			// Also guards against ring slots overwritten by newer positions
			if pos - candidate > MAX_DISTANCE {
				break;
			}
			if read_u32(input, candidate) == sequence {
				let length = match_length(input, candidate, pos, limit);
				if best.is_none_or(|(_, best_len)| length > best_len) {
					best = Some((candidate, length));
					if pos + length == limit {
						break;
					}
				}
			}
			let delta = self.deltas[candidate & MAX_DISTANCE] as usize;
			if delta == 0 {
				break;
			}
			next = candidate - delta + 1;
		}

		self.insert(input, pos);
		best
	}

	fn insert(&mut self, input: &[u8], pos: usize) {
		let head = &mut self.heads[hash(read_u32(input, pos), HIGH_HASH_BITS)];
		let delta = match (*head as usize).checked_sub(1) {
			Some(previous) if pos - previous <= MAX_DISTANCE => (pos - previous) as u16,
			_ => 0,
		};
		*head = pos as u32 + 1;
		self.deltas[pos & MAX_DISTANCE] = delta;
	}
}

fn write_length(out: &mut Vec<u8>, mut length: usize) {
	while length >= 255 {
		out.push(255);
		length -= 255;
	}
	out.push(length as u8);
}

fn write_literals(out: &mut Vec<u8>, token: u8, literals: &[u8]) {
	let count = literals.len();
	out.push(((count.min(15) as u8) << 4) | token);
	if count >= 15 {
		write_length(out, count - 15);
	}
	out.extend_from_slice(literals);
}

fn write_sequence(out: &mut Vec<u8>, literals: &[u8], offset: usize, length: usize) {
	let extra = length - MIN_MATCH;
	write_literals(out, extra.min(15) as u8, literals);
	out.extend_from_slice(&(offset as u16).to_le_bytes());
	if extra >= 15 {
		write_length(out, extra - 15);
	}
}

fn compress_with<F: MatchFinder>(input: &[u8], finder: &mut F, out: &mut Vec<u8>) {
	let len = input.len();
	let mut anchor = 0;

	if len > MF_LIMIT {
		let limit = len - LAST_LITERALS;
		let last_start = len - MF_LIMIT;
		let mut pos = 0;

		while pos <= last_start {
			let Some((candidate, length)) = finder.find(input, pos, limit) else {
				pos += 1;
				continue;
			};

			// Grow the match backwards over pending literals
			let (mut start, mut source, mut length) = (pos, candidate, length);
			while start > anchor && source > 0 && input[start - 1] == input[source - 1] {
				start -= 1;
				source -= 1;
				length += 1;
			}

			write_sequence(out, &input[anchor..start], start - source, length);

			let end = start + length;
			for covered in pos + 1..end.min(last_start + 1) {
				finder.insert(input, covered);
			}
			pos = end;
			anchor = end;
		}
	}

	write_literals(out, 0, &input[anchor..]);
}

/// Appends the LZ4 block encoding of `input` to `out`.
pub(super) fn compress_block(input: &[u8], level: CompressionLevel, out: &mut Vec<u8>) {
	match level {
		CompressionLevel::Fast => compress_with(input, &mut HashTable::new(), out),
		CompressionLevel::High => compress_with(input, &mut HashChain::new(), out),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_short_input_is_literal_only() {
		let mut out = Vec::new();
		compress_block(b"abcabcabcabc", CompressionLevel::High, &mut out);
		assert_eq!(out[0], 12 << 4);
		assert_eq!(&out[1..], b"abcabcabcabc");
	}

	#[test]
	fn test_long_literal_run_length_bytes() {
		let input: Vec<u8> = (0..300u32).map(|i| (i * 7 + i / 3) as u8).collect();
		let mut out = Vec::new();
		write_literals(&mut out, 0, &input);
		// 300 - 15 = 285 = 255 + 30
		assert_eq!(&out[..3], &[0xF0, 255, 30]);
		assert_eq!(out.len(), 3 + 300);
	}

	#[test]
	fn test_repeated_run_uses_overlapping_match() {
		let input = [b'x'; 64];
		let mut out = Vec::new();
		compress_block(&input, CompressionLevel::Fast, &mut out);
		// One literal, then a match at offset 1 up to the final five literals
		assert_eq!(out[0], 0x1F);
		assert_eq!(out[1], b'x');
		assert_eq!(&out[2..4], &[1, 0]);
		assert_eq!(out[4], 58 - 4 - 15);
		assert_eq!(out[5], 5 << 4);
		assert_eq!(out.len(), 11);
	}

	#[test]
	fn test_match_never_touches_last_literals() {
		let mut input = b"0123456789abcdef".repeat(8);
		input.extend_from_slice(b"0123456789abcdef");
		for level in [CompressionLevel::Fast, CompressionLevel::High] {
			let mut out = Vec::new();
			compress_block(&input, level, &mut out);
			assert_eq!(&out[out.len() - 5..], b"bcdef");
		}
	}
}
