//! Prelude module for `pngs_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use pngs_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut sequence = PngsFile::new();
//! sequence.add_frame(Frame::placeholder(16, 16, 100).unwrap());
//! assert!(sequence.build_header(true));
//! ```

// Re-export everything from pngs_types::prelude
#[doc(inline)]
pub use pngs_types::prelude::*;

// Re-export the entire pngs_types module for advanced usage
#[doc(inline)]
pub use pngs_types;
