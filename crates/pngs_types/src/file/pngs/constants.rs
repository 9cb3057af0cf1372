//! Constants used in `.pngs` files

/// Top-level file signature
pub const SIGNATURE: &[u8; 5] = b"$PNGS";

/// Metadata block signature
pub const METADATA_SIGNATURE: &[u8; 4] = b"$MET";

/// Frame record signature
pub const FRAME_SIGNATURE: &[u8; 4] = b"$SEQ";

/// Revision written by this implementation
pub const CURRENT_REVISION: f32 = 1.0;

/// Highest major revision this implementation can read
pub const MAX_MAJOR_REVISION: u32 = 1;

/// Loop count meaning "repeat forever"
pub const INFINITE_LOOP: i32 = -1;

/// Size of the fixed header: signature, revision, width, height, loop count and
/// the five descriptor bytes
pub const HEADER_SIZE: usize = SIGNATURE.len() + 4 + 4 + 4 + 4 + 5;

/// Size of a frame record before its payload: signature, length and duration
pub const FRAME_RECORD_HEADER_SIZE: usize = FRAME_SIGNATURE.len() + 4 + 4;
