//! Container header.

use std::fmt::Display;

use super::constants::{CURRENT_REVISION, INFINITE_LOOP, MAX_MAJOR_REVISION};
use super::metadata::MetadataTable;
use crate::file::PngsError;
use crate::file::png::RasterDescriptor;

/// Returns `true` if `revision` is a finite, non-negative number whose major
/// part this implementation understands.
pub fn is_supported_revision(revision: f32) -> bool {
	revision.is_finite() && revision >= 0.0 && revision < (MAX_MAJOR_REVISION + 1) as f32
}

/// Container header: canonical raster descriptor, playback settings and metadata.
///
/// The descriptor summarizes the frames and is only recomputed when the
/// container is asked to (see [`File::refresh_header`](super::File::refresh_header)).
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
	descriptor: RasterDescriptor,
	loop_count: i32,
	revision: f32,
	metadata: MetadataTable,
}

impl Default for Header {
	fn default() -> Self {
		Self::new(RasterDescriptor::default())
	}
}

impl Header {
	/// Creates a header with an infinite loop count, the current revision and no metadata.
	pub fn new(descriptor: RasterDescriptor) -> Self {
		Self {
			descriptor,
			loop_count: INFINITE_LOOP,
			revision: CURRENT_REVISION,
			metadata: MetadataTable::new(),
		}
	}

	/// Creates a header with every field given. Used by the loader.
	pub(super) fn from_parts(
		descriptor: RasterDescriptor,
		loop_count: i32,
		revision: f32,
		metadata: MetadataTable,
	) -> Self {
		Self {
			descriptor,
			loop_count,
			revision,
			metadata,
		}
	}

	/// Canonical raster descriptor of the container.
	pub fn descriptor(&self) -> &RasterDescriptor {
		&self.descriptor
	}

	/// Replaces the raster descriptor.
	pub fn set_descriptor(&mut self, descriptor: RasterDescriptor) {
		self.descriptor = descriptor;
	}

	/// Number of times playback repeats; `-1` means forever.
	pub fn loop_count(&self) -> i32 {
		self.loop_count
	}

	/// Sets the loop count.
	pub fn set_loop_count(&mut self, loop_count: i32) {
		self.loop_count = loop_count;
	}

	/// Returns `true` if the loop count means "repeat forever".
	pub fn loops_forever(&self) -> bool {
		self.loop_count == INFINITE_LOOP
	}

	/// Format revision.
	pub fn revision(&self) -> f32 {
		self.revision
	}

	/// Sets the format revision.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] for a negative or non-finite value, or a
	/// major revision newer than this implementation writes.
	pub fn set_revision(&mut self, revision: f32) -> Result<(), PngsError> {
		if !is_supported_revision(revision) {
			return Err(PngsError::argument(format!("unsupported revision {revision}")));
		}
		self.revision = revision;
		Ok(())
	}

	/// Metadata strings.
	pub fn metadata(&self) -> &MetadataTable {
		&self.metadata
	}

	/// Mutable access to the metadata strings.
	pub fn metadata_mut(&mut self) -> &mut MetadataTable {
		&mut self.metadata
	}
}

impl Display for Header {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "PNGS Header:")?;
		writeln!(f, "  Revision:       {:.1}", self.revision)?;
		writeln!(f, "  Descriptor:     {}", self.descriptor)?;
		if self.loops_forever() {
			writeln!(f, "  Loop count:     infinite")?;
		} else {
			writeln!(f, "  Loop count:     {}", self.loop_count)?;
		}
		write!(f, "  Metadata:       {} entries", self.metadata.len())
	}
}
