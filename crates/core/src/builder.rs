//! Incremental construction of source maps.
//!
//! [`SourceMapBuilder`] collects mappings in any order, interns sources and
//! names on first use, and serializes the result as a flat v3 map. The
//! mappings string is encoded from a copy of the entries sorted by generated
//! position, so serializing never disturbs insertion order and can be
//! repeated as more mappings arrive.

use std::collections::HashMap;

use crate::{
    Error,
    mappings::{self, MappingEntry, OriginalPosition, Position},
    raw::RawSourceMap,
};

/// One mapping to record, borrowing its source and name strings.
///
/// `source` and `original` come paired: either both present (the mapping
/// points into an original source) or both absent (a generated-only
/// mapping). `name` requires an original position.
#[derive(Debug, Clone, Copy)]
pub struct Mapping<'a> {
    pub generated: Position,
    pub source: Option<&'a str>,
    pub original: Option<Position>,
    pub name: Option<&'a str>,
}

/// Builds a source map entry by entry.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    source_root: Option<String>,
    sources: Vec<String>,
    source_index: HashMap<String, u32>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    name_index: HashMap<String, u32>,
    entries: Vec<MappingEntry>,
}

impl SourceMapBuilder {
    pub fn new(file: Option<&str>) -> Self {
        SourceMapBuilder {
            file: file.map(|f| f.to_string()),
            ..Default::default()
        }
    }

    pub fn set_source_root(&mut self, source_root: Option<&str>) {
        self.source_root = source_root.map(|r| r.to_string());
    }

    /// Intern a source path, returning its index. Repeated calls with the
    /// same path return the same index; first use fixes the order in the
    /// serialized `sources` array.
    pub fn add_source(&mut self, source: &str) -> u32 {
        if let Some(&idx) = self.source_index.get(source) {
            return idx;
        }
        let idx = self.sources.len() as u32;
        self.sources.push(source.to_string());
        self.sources_content.push(None);
        self.source_index.insert(source.to_string(), idx);
        idx
    }

    /// Intern a name, returning its index.
    pub fn add_name(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.name_index.get(name) {
            return idx;
        }
        let idx = self.names.len() as u32;
        self.names.push(name.to_string());
        self.name_index.insert(name.to_string(), idx);
        idx
    }

    /// Attach embedded content to a source, interning the source if needed.
    pub fn set_source_content(&mut self, source: &str, content: Option<&str>) {
        let idx = self.add_source(source) as usize;
        self.sources_content[idx] = content.map(|c| c.to_string());
    }

    /// Record one mapping.
    ///
    /// Rejects a mapping whose `source` and `original` disagree on presence,
    /// and a `name` without an original position; those shapes have no
    /// serialized form.
    pub fn add_mapping(&mut self, mapping: Mapping<'_>) -> Result<(), Error> {
        let original = match (mapping.source, mapping.original) {
            (Some(source), Some(original)) => {
                let source = self.add_source(source);
                let name = mapping.name.map(|n| self.add_name(n));
                Some(OriginalPosition {
                    source,
                    line: original.line,
                    column: original.column,
                    name,
                })
            }
            (None, None) => {
                if mapping.name.is_some() {
                    return Err(Error::InvalidMapping(
                        "a name requires an original position".to_string(),
                    ));
                }
                None
            }
            (Some(_), None) => {
                return Err(Error::InvalidMapping(
                    "a source requires an original position".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(Error::InvalidMapping(
                    "an original position requires a source".to_string(),
                ));
            }
        };
        self.entries.push(MappingEntry {
            generated: mapping.generated,
            original,
        });
        Ok(())
    }

    /// Serialize the collected state as a raw flat map.
    pub fn to_raw(&self) -> RawSourceMap {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| e.generated);
        let sources_content = self
            .sources_content
            .iter()
            .any(Option::is_some)
            .then(|| self.sources_content.clone());
        RawSourceMap {
            version: 3,
            file: self.file.clone(),
            source_root: self.source_root.clone(),
            sources: self.sources.clone(),
            sources_content,
            names: self.names.clone(),
            mappings: mappings::encode_mappings(&entries),
        }
    }

    /// Serialize the collected state as source map JSON.
    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_raw())?)
    }
}
