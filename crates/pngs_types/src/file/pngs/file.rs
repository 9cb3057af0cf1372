//! PNGS file structure and I/O operations.
//!
//! This module defines the main `File` struct which represents a complete
//! sequence container: an optional header and an ordered list of frames.

use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use super::codec;
use super::frame::{Frame, read_path};
use super::header::Header;
use super::save_config::SaveConfig;
use crate::file::PngsError;
use crate::file::png::RasterDescriptor;

/// Header whose descriptor summarizes `frames`; a default descriptor when empty.
fn summarized_header(frames: &[Frame], prefer_maximized: bool) -> Header {
	let descriptor = RasterDescriptor::summarize(frames.iter().map(Frame::descriptor), prefer_maximized)
		.unwrap_or_default();
	Header::new(descriptor)
}

/// A `.pngs` sequence container.
///
/// Frames are kept decompressed in memory and addressed by index. The header is
/// absent until built explicitly with [`File::build_header`], by one of the
/// `from_*` constructors, or by the first save; loading a file always yields a
/// header. The header descriptor is never updated behind the caller's back:
/// call [`File::refresh_header`] after changing frames.
///
/// # Examples
///
/// ## Building and saving
///
/// ```no_run
/// use pngs_types::file::pngs::{File, Frame};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pngs = File::new();
/// pngs.add_frame(Frame::from_path("walk_0.png", 80)?);
/// pngs.add_frame(Frame::from_path("walk_1.png", 80)?);
///
/// pngs.build_header(true);
/// pngs.set_loop_count(-1)?;
/// pngs.add_metadata("name=walk")?;
///
/// pngs.save("walk.pngs")?;
/// # Ok(())
/// # }
/// ```
///
/// ## Loading and re-encoding a frame
///
/// ```no_run
/// use pngs_types::file::pngs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pngs = File::open("walk.pngs")?;
/// println!("{} frames, {} ms", pngs.frame_count(), pngs.total_duration());
///
/// let png = pngs.encode_frame_png(0)?;
/// std::fs::write("frame_0.png", png)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct File {
	header: Option<Header>,
	frames: Vec<Frame>,
}

impl File {
	/// Creates an empty container with no header and no frames.
	///
	/// # Examples
	///
	/// ```
	/// use pngs_types::file::pngs::File;
	///
	/// let pngs = File::new();
	/// assert_eq!(pngs.frame_count(), 0);
	/// assert!(pngs.header().is_none());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a `.pngs` file from the specified path.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] for an empty path, [`PngsError::Io`] if
	/// the file cannot be read, or any error of [`File::from_bytes`].
	pub fn open(path: impl AsRef<Path>) -> Result<Self, PngsError> {
		let data = read_path(path.as_ref())?;
		Self::from_bytes(&data)
	}

	/// Parses a complete `.pngs` byte buffer.
	///
	/// # Errors
	///
	/// - [`PngsError::Format`] with the byte offset of a missing signature,
	///   truncated field or invalid value
	/// - [`PngsError::Integrity`] if a frame payload fails to decompress
	/// - [`PngsError::UnsupportedFeature`] for a newer major revision
	pub fn from_bytes(data: &[u8]) -> Result<Self, PngsError> {
		let (header, frames) = codec::load(data)?;
		Ok(Self {
			header: Some(header),
			frames,
		})
	}

	/// Reads a `.pngs` stream to the end and parses it.
	pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, PngsError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Creates a container from frames and builds its header.
	///
	/// Frames that are the same as an earlier one are skipped.
	pub fn from_frames(prefer_maximized: bool, frames: impl IntoIterator<Item = Frame>) -> Self {
		let mut file = Self::new();
		file.add_frames(frames);
		file.build_header(prefer_maximized);
		file
	}

	/// Decodes PNG buffers into frames of equal duration and builds the header.
	pub fn from_pngs<B: AsRef<[u8]>>(
		prefer_maximized: bool,
		duration: u32,
		pngs: &[B],
	) -> Result<Self, PngsError> {
		let frames = pngs
			.iter()
			.map(|png| Frame::new(png.as_ref(), duration))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::from_frames(prefer_maximized, frames))
	}

	/// Reads PNG files into frames of equal duration and builds the header.
	pub fn from_png_paths<P: AsRef<Path>>(
		prefer_maximized: bool,
		duration: u32,
		paths: &[P],
	) -> Result<Self, PngsError> {
		let frames = paths
			.iter()
			.map(|path| Frame::from_path(path, duration))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::from_frames(prefer_maximized, frames))
	}

	/// Serializes the container with the default [`SaveConfig`].
	///
	/// Uses a default header when none has been built; the container itself is
	/// not modified.
	pub fn to_bytes(&self) -> Result<Vec<u8>, PngsError> {
		self.to_bytes_with_config(&SaveConfig::default())
	}

	/// Serializes the container with an explicit [`SaveConfig`].
	pub fn to_bytes_with_config(&self, config: &SaveConfig) -> Result<Vec<u8>, PngsError> {
		match &self.header {
			Some(header) => codec::to_bytes(header, &self.frames, config.level),
			None => {
				let header = summarized_header(&self.frames, config.prefer_maximized);
				codec::to_bytes(&header, &self.frames, config.level)
			}
		}
	}

	/// Writes the container to `path`, building the header first if needed.
	pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), PngsError> {
		self.save_with_config(path, &SaveConfig::default())
	}

	/// [`File::save`] with an explicit [`SaveConfig`].
	pub fn save_with_config(
		&mut self,
		path: impl AsRef<Path>,
		config: &SaveConfig,
	) -> Result<(), PngsError> {
		let path = path.as_ref();
		if path.as_os_str().is_empty() {
			return Err(PngsError::argument("save path is empty"));
		}
		let mut file = std::fs::File::create(path)?;
		self.write_to_with_config(&mut file, config)
	}

	/// Writes the container to `writer`, building the header first if needed.
	///
	/// The writer is flushed on success. Closing it is up to the caller.
	pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<(), PngsError> {
		self.write_to_with_config(writer, &SaveConfig::default())
	}

	/// [`File::write_to`] with an explicit [`SaveConfig`].
	pub fn write_to_with_config<W: Write>(
		&mut self,
		writer: &mut W,
		config: &SaveConfig,
	) -> Result<(), PngsError> {
		let header = self
			.header
			.get_or_insert_with(|| summarized_header(&self.frames, config.prefer_maximized));
		codec::save(header, &self.frames, config.level, writer)
	}

	// Frames

	/// Number of frames.
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// Returns `true` if the container has no frames.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// All frames in order.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Iterates over the frames in order.
	pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
		self.frames.iter()
	}

	/// Returns the frame at `index`.
	pub fn frame(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	/// Returns the frame at `index` for in-place changes.
	pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
		self.frames.get_mut(index)
	}

	/// Returns `true` if `frame` (by identity) is in the container.
	pub fn contains_frame(&self, frame: &Frame) -> bool {
		self.frames.iter().any(|f| f.is_same(frame))
	}

	/// Appends `frame` unless it is already present.
	///
	/// Returns `true` if the frame was added.
	pub fn add_frame(&mut self, frame: Frame) -> bool {
		if self.contains_frame(&frame) {
			return false;
		}
		self.frames.push(frame);
		true
	}

	/// Appends every frame not already present. Returns how many were added.
	pub fn add_frames(&mut self, frames: impl IntoIterator<Item = Frame>) -> usize {
		let mut added = 0;
		for frame in frames {
			if self.add_frame(frame) {
				added += 1;
			}
		}
		added
	}

	/// Inserts `frame` before `index` unless it is already present.
	///
	/// `index` may equal the frame count, which appends. Returns `true` if the
	/// frame was inserted.
	pub fn insert_frame(&mut self, index: usize, frame: Frame) -> Result<bool, PngsError> {
		if index > self.frames.len() {
			return Err(PngsError::index(index, self.frames.len() + 1));
		}
		if self.contains_frame(&frame) {
			return Ok(false);
		}
		self.frames.insert(index, frame);
		Ok(true)
	}

	/// Replaces the frame at `index`, returning the old one.
	pub fn set_frame(&mut self, index: usize, frame: Frame) -> Result<Frame, PngsError> {
		let len = self.frames.len();
		let slot = self.frames.get_mut(index).ok_or_else(|| PngsError::index(index, len))?;
		Ok(std::mem::replace(slot, frame))
	}

	/// Removes `frame` (by identity). Returns it, or `None` if it was not present.
	pub fn remove_frame(&mut self, frame: &Frame) -> Option<Frame> {
		let index = self.frames.iter().position(|f| f.is_same(frame))?;
		Some(self.frames.remove(index))
	}

	/// Removes and returns the frame at `index`.
	pub fn remove_frame_at(&mut self, index: usize) -> Result<Frame, PngsError> {
		self.check_index(index)?;
		Ok(self.frames.remove(index))
	}

	/// Removes and returns the first frame.
	pub fn remove_first(&mut self) -> Result<Frame, PngsError> {
		self.remove_frame_at(0)
	}

	/// Removes and returns the last frame.
	pub fn remove_last(&mut self) -> Result<Frame, PngsError> {
		match self.frames.pop() {
			Some(frame) => Ok(frame),
			None => Err(PngsError::index(0, 0)),
		}
	}

	/// Swaps the frames at `i` and `j`. Equal indices are a no-op.
	pub fn swap_frames(&mut self, i: usize, j: usize) -> Result<(), PngsError> {
		self.check_index(i)?;
		self.check_index(j)?;
		if i != j {
			self.frames.swap(i, j);
		}
		Ok(())
	}

	/// Sum of all frame durations in milliseconds.
	pub fn total_duration(&self) -> u64 {
		self.frames.iter().map(|f| f.duration() as u64).sum()
	}

	/// Encodes the frame at `index` as a PNG using the header descriptor.
	///
	/// # Errors
	///
	/// - [`PngsError::Index`] if `index` is out of range
	/// - [`PngsError::Argument`] if there is no header, or the frame's pixels do
	///   not fit the header descriptor
	pub fn encode_frame_png(&self, index: usize) -> Result<Vec<u8>, PngsError> {
		self.check_index(index)?;
		let header = self.require_header()?;
		self.frames[index].encode_png(header.descriptor())
	}

	/// Replaces the pixels of the frame at `index` with a decoded PNG.
	pub fn swap_frame_png(&mut self, index: usize, png: &[u8]) -> Result<(), PngsError> {
		self.check_index(index)?;
		self.frames[index].swap_png(png)
	}

	/// Replaces the pixels of the frame at `index` with a PNG file.
	pub fn swap_frame_png_path(
		&mut self,
		index: usize,
		path: impl AsRef<Path>,
	) -> Result<(), PngsError> {
		self.check_index(index)?;
		self.frames[index].swap_png_path(path)
	}

	fn check_index(&self, index: usize) -> Result<(), PngsError> {
		if index >= self.frames.len() {
			return Err(PngsError::index(index, self.frames.len()));
		}
		Ok(())
	}

	// Header

	/// The header, if one has been built or loaded.
	pub fn header(&self) -> Option<&Header> {
		self.header.as_ref()
	}

	/// Mutable access to the header.
	pub fn header_mut(&mut self) -> Option<&mut Header> {
		self.header.as_mut()
	}

	/// Replaces the header.
	pub fn set_header(&mut self, header: Header) {
		self.header = Some(header);
	}

	/// Builds the header from the frame descriptors if there is none yet.
	///
	/// Each descriptor field is reduced independently with `max` or `min`
	/// (see [`RasterDescriptor::summarize`]). With no frames nothing happens.
	/// Returns `true` if a header exists afterwards.
	pub fn build_header(&mut self, prefer_maximized: bool) -> bool {
		if self.header.is_none() && !self.frames.is_empty() {
			let header = summarized_header(&self.frames, prefer_maximized);
			debug!("Built PNGS header: {}", header.descriptor());
			self.header = Some(header);
		}
		self.header.is_some()
	}

	/// Recomputes the header descriptor from the current frames.
	///
	/// Loop count, revision and metadata are kept. Does nothing without a header
	/// or without frames. Returns `true` if the descriptor was recomputed.
	pub fn refresh_header(&mut self, prefer_maximized: bool) -> bool {
		let Some(descriptor) =
			RasterDescriptor::summarize(self.frames.iter().map(Frame::descriptor), prefer_maximized)
		else {
			return false;
		};
		match self.header.as_mut() {
			Some(header) => {
				header.set_descriptor(descriptor);
				true
			}
			None => false,
		}
	}

	/// Sets the header loop count.
	pub fn set_loop_count(&mut self, loop_count: i32) -> Result<(), PngsError> {
		self.require_header_mut()?.set_loop_count(loop_count);
		Ok(())
	}

	/// Sets the header revision.
	pub fn set_revision(&mut self, revision: f32) -> Result<(), PngsError> {
		self.require_header_mut()?.set_revision(revision)
	}

	fn require_header(&self) -> Result<&Header, PngsError> {
		self.header.as_ref().ok_or_else(|| PngsError::argument("container has no header"))
	}

	fn require_header_mut(&mut self) -> Result<&mut Header, PngsError> {
		self.header.as_mut().ok_or_else(|| PngsError::argument("container has no header"))
	}

	// Metadata

	/// Adds a metadata entry. Returns `false` if it was already present.
	pub fn add_metadata(&mut self, entry: impl Into<String>) -> Result<bool, PngsError> {
		self.require_header_mut()?.metadata_mut().add(entry)
	}

	/// Removes a metadata entry. Returns `false` if it was not present.
	pub fn remove_metadata(&mut self, entry: &str) -> Result<bool, PngsError> {
		Ok(self.require_header_mut()?.metadata_mut().remove(entry))
	}

	/// Removes and returns the metadata entry at `index`.
	pub fn remove_metadata_at(&mut self, index: usize) -> Result<String, PngsError> {
		self.require_header_mut()?.metadata_mut().remove_at(index)
	}

	/// Returns `true` if the header holds `entry`. `false` without a header.
	pub fn contains_metadata(&self, entry: &str) -> bool {
		self.header.as_ref().is_some_and(|h| h.metadata().contains(entry))
	}

	/// Number of metadata entries; zero without a header.
	pub fn metadata_count(&self) -> usize {
		self.header.as_ref().map_or(0, |h| h.metadata().len())
	}

	/// Metadata entries in order; empty without a header.
	pub fn metadata(&self) -> Vec<&str> {
		self.header.as_ref().map(|h| h.metadata().iter().collect()).unwrap_or_default()
	}

	/// Metadata entries matching `predicate`, in order.
	pub fn metadata_where<P>(&self, predicate: P) -> Vec<&str>
	where
		P: FnMut(&str) -> bool,
	{
		self.header
			.as_ref()
			.map(|h| h.metadata().filter(predicate).collect())
			.unwrap_or_default()
	}

	/// Metadata entry at `index`.
	pub fn metadata_at(&self, index: usize) -> Result<&str, PngsError> {
		let metadata = self.require_header()?.metadata();
		metadata.get(index).ok_or_else(|| PngsError::index(index, metadata.len()))
	}
}

impl<'a> IntoIterator for &'a File {
	type Item = &'a Frame;
	type IntoIter = std::slice::Iter<'a, Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.iter()
	}
}

impl IntoIterator for File {
	type Item = Frame;
	type IntoIter = std::vec::IntoIter<Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.into_iter()
	}
}

impl Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.header {
			Some(header) => writeln!(f, "{header}")?,
			None => writeln!(f, "PNGS Header: (none)")?,
		}
		write!(
			f,
			"Frames: {} ({} ms total)",
			self.frames.len(),
			self.total_duration()
		)
	}
}
