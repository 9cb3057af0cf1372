//! Save configuration for `.pngs` containers.

use serde::{Deserialize, Serialize};

use crate::file::lz4::CompressionLevel;

/// Configuration for writing a container.
///
/// Controls how hard frame payloads are compressed and, when the container has
/// no header yet, which policy builds it.
///
/// # Presets
///
/// - `default()`: high-effort compression, minimized header
/// - `fast()`: single-probe compression, minimized header
/// - `maximized()`: high-effort compression, maximized header
///
/// # Examples
///
/// ```
/// use pngs_types::file::pngs::SaveConfig;
/// use pngs_types::file::lz4::CompressionLevel;
///
/// let config = SaveConfig::default();
/// assert_eq!(config.level, CompressionLevel::High);
/// assert!(!config.prefer_maximized);
///
/// let config = SaveConfig::new(CompressionLevel::Fast, true);
/// assert!(config.prefer_maximized);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
	/// Block compressor effort for frame payloads
	pub level: CompressionLevel,
	/// Header policy used when a header has to be built during save
	pub prefer_maximized: bool,
}

impl SaveConfig {
	/// Create a save configuration with explicit settings.
	///
	/// # Arguments
	/// * `level` - Block compressor effort
	/// * `prefer_maximized` - Build a missing header from the largest descriptor values
	pub fn new(level: CompressionLevel, prefer_maximized: bool) -> Self {
		Self {
			level,
			prefer_maximized,
		}
	}

	/// Create a configuration that favors save speed over file size.
	pub fn fast() -> Self {
		Self {
			level: CompressionLevel::Fast,
			prefer_maximized: false,
		}
	}

	/// Create a configuration that builds a missing header from maximum values.
	pub fn maximized() -> Self {
		Self {
			level: CompressionLevel::High,
			prefer_maximized: true,
		}
	}
}
