#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `pngs-rs` reads and writes `.pngs` image sequences: ordered RGBA frames with
//! per-frame durations, a loop count and free-form metadata, stored as
//! LZ4-compressed payloads behind a small binary header.
//!
pub use pngs_internal::*;
