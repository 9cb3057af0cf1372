//! Scanline filters.

use crate::file::{FileType, PngsError};

/// Per-scanline filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
	/// Raw bytes
	None = 0,
	/// Difference to the byte one pixel to the left
	Sub = 1,
	/// Difference to the byte above
	Up = 2,
	/// Difference to the mean of left and above
	Average = 3,
	/// Difference to the Paeth predictor
	Paeth = 4,
}

impl TryFrom<u8> for FilterType {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(FilterType::None),
			1 => Ok(FilterType::Sub),
			2 => Ok(FilterType::Up),
			3 => Ok(FilterType::Average),
			4 => Ok(FilterType::Paeth),
			other => Err(other),
		}
	}
}

/// Paeth predictor: whichever of left, above, upper-left is closest to `a + b - c`.
#[inline]
fn paeth(a: u8, b: u8, c: u8) -> u8 {
	let p = a as i16 + b as i16 - c as i16;
	let pa = (p - a as i16).abs();
	let pb = (p - b as i16).abs();
	let pc = (p - c as i16).abs();
	if pa <= pb && pa <= pc {
		a
	} else if pb <= pc {
		b
	} else {
		c
	}
}

fn unfilter_row(filter: FilterType, current: &mut [u8], previous: Option<&[u8]>, bpp: usize) {
	let above = |i: usize| previous.map_or(0, |p| p[i]);

	match filter {
		FilterType::None => {}
		FilterType::Sub => {
			for i in bpp..current.len() {
				current[i] = current[i].wrapping_add(current[i - bpp]);
			}
		}
		FilterType::Up => {
			if let Some(previous) = previous {
				for (byte, &up) in current.iter_mut().zip(previous) {
					*byte = byte.wrapping_add(up);
				}
			}
		}
		FilterType::Average => {
			for i in 0..current.len() {
				let left = if i >= bpp { current[i - bpp] } else { 0 };
				let mean = ((left as u16 + above(i) as u16) / 2) as u8;
				current[i] = current[i].wrapping_add(mean);
			}
		}
		FilterType::Paeth => {
			for i in 0..current.len() {
				let (left, upper_left) = if i >= bpp {
					(current[i - bpp], above(i - bpp))
				} else {
					(0, 0)
				};
				current[i] = current[i].wrapping_add(paeth(left, above(i), upper_left));
			}
		}
	}
}

/// Reverses the scanline filters of a decompressed `IDAT` stream.
///
/// `data` holds `height` rows of one filter-type byte followed by `row_bytes`
/// filtered bytes. `data_offset` is reported in errors for unknown filter types.
pub(super) fn unfilter(
	data: &[u8],
	height: usize,
	row_bytes: usize,
	bpp: usize,
	data_offset: usize,
) -> Result<Vec<u8>, PngsError> {
	let stride = row_bytes + 1;
	let mut out = vec![0u8; height * row_bytes];

	for y in 0..height {
		let src = &data[y * stride..(y + 1) * stride];
		let filter = FilterType::try_from(src[0]).map_err(|v| {
			PngsError::format(
				FileType::Png,
				data_offset,
				format!("unknown filter type {v} on scanline {y}"),
			)
		})?;

		let (done, rest) = out.split_at_mut(y * row_bytes);
		let current = &mut rest[..row_bytes];
		current.copy_from_slice(&src[1..]);
		let previous = y.checked_sub(1).map(|p| &done[p * row_bytes..]);
		unfilter_row(filter, current, previous, bpp);
	}

	Ok(out)
}

/// Prefixes every row with filter type `None`.
pub(super) fn filter_none(raw: &[u8], row_bytes: usize) -> Vec<u8> {
	if row_bytes == 0 {
		return Vec::new();
	}
	let mut out = Vec::with_capacity(raw.len() + raw.len() / row_bytes);
	for row in raw.chunks_exact(row_bytes) {
		out.push(FilterType::None as u8);
		out.extend_from_slice(row);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Forward filter, only needed to build test input.
	fn filter_row(filter: FilterType, raw: &[u8], previous: Option<&[u8]>, bpp: usize) -> Vec<u8> {
		let above = |i: usize| previous.map_or(0, |p| p[i]);
		(0..raw.len())
			.map(|i| {
				let left = if i >= bpp { raw[i - bpp] } else { 0 };
				let upper_left = if i >= bpp { above(i - bpp) } else { 0 };
				let prediction = match filter {
					FilterType::None => 0,
					FilterType::Sub => left,
					FilterType::Up => above(i),
					FilterType::Average => ((left as u16 + above(i) as u16) / 2) as u8,
					FilterType::Paeth => paeth(left, above(i), upper_left),
				};
				raw[i].wrapping_sub(prediction)
			})
			.collect()
	}

	fn filtered(raw: &[u8], row_bytes: usize, bpp: usize, filters: &[FilterType]) -> Vec<u8> {
		let mut out = Vec::new();
		for (y, row) in raw.chunks_exact(row_bytes).enumerate() {
			let previous = y.checked_sub(1).map(|p| &raw[p * row_bytes..(p + 1) * row_bytes]);
			let filter = filters[y % filters.len()];
			out.push(filter as u8);
			out.extend(filter_row(filter, row, previous, bpp));
		}
		out
	}

	#[test]
	fn test_paeth_tie_breaks() {
		assert_eq!(paeth(10, 10, 10), 10);
		// p = 20 + 10 - 10 = 20, closest to a
		assert_eq!(paeth(20, 10, 10), 20);
		// p = 10 + 20 - 10 = 20, closest to b
		assert_eq!(paeth(10, 20, 10), 20);
		// p = 0 + 0 - 255, pa = pb = 255 and pc = 510
		assert_eq!(paeth(0, 0, 255), 0);
	}

	#[test]
	fn test_unfilter_every_type() {
		let row_bytes = 12;
		let bpp = 3;
		let raw: Vec<u8> = (0..row_bytes * 6).map(|i| ((i * 37) ^ (i >> 2)) as u8).collect();
		let filters = [
			FilterType::Paeth,
			FilterType::None,
			FilterType::Sub,
			FilterType::Up,
			FilterType::Average,
			FilterType::Paeth,
		];

		let data = filtered(&raw, row_bytes, bpp, &filters);
		assert_eq!(unfilter(&data, 6, row_bytes, bpp, 0).unwrap(), raw);
	}

	#[test]
	fn test_unfilter_rejects_unknown_type() {
		let data = [0, 1, 2, 5, 3, 4];
		let err = unfilter(&data, 2, 2, 1, 41).unwrap_err();
		assert_eq!(err.offset(), Some(41));
	}

	#[test]
	fn test_filter_none_prefixes_rows() {
		assert_eq!(filter_none(&[1, 2, 3, 4], 2), vec![0, 1, 2, 0, 3, 4]);
	}
}
