//! Source Map (v3) codec and position-resolution engine.
//!
//! This crate decodes, queries, merges, and generates source maps in the
//! de-facto v3 JSON format: a bidirectional mapping between positions in a
//! generated artifact (minified/compiled output) and positions in the
//! original sources it was produced from.
//!
//! Entry points:
//!
//! - [`map::SourceMap`] parses a map (flat or indexed) and answers position
//!   queries in both directions.
//! - [`builder::SourceMapBuilder`] accumulates mapping entries, possibly out
//!   of order, and serializes them back to the compact `mappings` encoding.
//!
//! Internals:
//!
//! - [`vlq`] implements the base64 VLQ codec used by the `mappings` field.
//! - [`mappings`] parses and encodes the `;`/`,`-structured mappings string.
//! - [`raw`] holds the serde wire-format structures.
//! - [`path`] resolves source paths against an optional `sourceRoot`.
//! - [`index`] flattens multi-section ("indexed") maps into one table.
//!
//! Lines and columns are 0-based everywhere in the public API.

pub mod builder;
pub mod index;
pub mod map;
pub mod mappings;
pub mod path;
pub mod raw;
pub mod vlq;

pub use builder::{Mapping, SourceMapBuilder};
pub use map::{Bias, OriginalLocation, SourceMap};
pub use mappings::{MappingEntry, OriginalPosition, Position};
pub use raw::{RawIndexedMap, RawMap, RawSection, RawSectionOffset, RawSourceMap};

/// Errors that can occur while parsing, merging, or generating a source map.
///
/// Lookups that simply find no matching entry are not errors; the query
/// methods on [`SourceMap`] return `Option`s or empty collections for those.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unsupported source map version {0} (only version 3 is supported)")]
    UnsupportedVersion(u32),

    #[error("invalid base64 character {0:?} in VLQ data")]
    InvalidBase64(char),

    #[error("VLQ sequence ended while its continuation bit was still set")]
    TruncatedVlq,

    #[error("VLQ value does not fit in 64 bits")]
    VlqOverflow,

    #[error("mapping segment has {0} fields (expected 1, 4, or 5)")]
    InvalidSegmentLength(usize),

    #[error("mapping {field} is out of range after applying deltas")]
    FieldOutOfRange { field: &'static str },

    #[error("mapping references {what} {index}, but the map defines {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },

    #[error(
        "section offset ({line},{column}) decreases from the previous offset ({prev_line},{prev_column})"
    )]
    SectionOrder {
        prev_line: u32,
        prev_column: u32,
        line: u32,
        column: u32,
    },

    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}
