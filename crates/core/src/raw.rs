//! Wire-format structures for Source Map v3 JSON.
//!
//! These structs mirror the serialized form exactly; nothing here is decoded
//! or resolved. [`crate::map::SourceMap`] turns a raw map into a queryable
//! table, and [`crate::builder::SourceMapBuilder`] produces raw maps on the
//! write side.

use serde::{Deserialize, Serialize};

use crate::Error;

/// A flat (non-indexed) source map as serialized.
///
/// `sources` may contain duplicates; they are preserved by index. Each
/// `sourcesContent` slot may individually be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// A multi-section ("indexed") source map as serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndexedMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sections: Vec<RawSection>,
}

/// One section of an indexed map: an embedded flat map plus the offset of
/// its coordinate space within the outer generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub offset: RawSectionOffset,
    pub map: RawSourceMap,
}

/// A section offset in the outer generated output, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSectionOffset {
    pub line: u32,
    pub column: u32,
}

/// Either form of a serialized map, detected by the presence of `sections`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMap {
    Flat(RawSourceMap),
    Indexed(RawIndexedMap),
}

impl RawMap {
    /// Deserialize a map from JSON bytes, detecting flat vs indexed form.
    ///
    /// Version validation happens when the raw map is turned into a
    /// [`crate::map::SourceMap`], together with all other format checks.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("sections").is_some() {
            Ok(RawMap::Indexed(serde_json::from_value(value)?))
        } else {
            Ok(RawMap::Flat(serde_json::from_value(value)?))
        }
    }

    /// Deserialize a map from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Self::from_slice(json.as_bytes())
    }
}
