//! Flattening of multi-section ("indexed") maps.
//!
//! An indexed map is an ordered list of `{offset, map}` sections, each
//! embedded map valid over a sub-range of the generated output. Flattening
//! translates every section's entries into the outer coordinate space and
//! merges the per-section `sources`/`names` arrays into combined tables, so
//! the result is an ordinary [`SourceMap`].
//!
//! Invariants:
//!
//! - Section offsets must be non-decreasing in `(line, column)`; anything
//!   else is a format error, not silently reordered.
//! - The section offset's column shifts only entries on the section's first
//!   local line; the line offset applies to every entry.
//! - Each section resolves its own `sourceRoot` during flattening, so
//!   sections with different roots stay independent. The merged map carries
//!   pre-resolved source paths and no root of its own.

use crate::{
    Error,
    map::SourceMap,
    mappings::{self, MappingEntry, OriginalPosition, Position},
    path,
    raw::RawIndexedMap,
};

/// Flatten `raw.sections` into a single queryable map.
pub fn flatten(raw: RawIndexedMap) -> Result<SourceMap, Error> {
    if raw.version != 3 {
        return Err(Error::UnsupportedVersion(raw.version));
    }

    let mut sources: Vec<String> = Vec::new();
    let mut sources_content: Vec<Option<String>> = Vec::new();
    let mut any_content = false;
    let mut names: Vec<String> = Vec::new();
    let mut entries: Vec<MappingEntry> = Vec::new();

    let mut prev_offset: Option<(u32, u32)> = None;

    for section in raw.sections {
        let offset = section.offset;
        if let Some((prev_line, prev_column)) = prev_offset {
            if (offset.line, offset.column) < (prev_line, prev_column) {
                return Err(Error::SectionOrder {
                    prev_line,
                    prev_column,
                    line: offset.line,
                    column: offset.column,
                });
            }
        }
        prev_offset = Some((offset.line, offset.column));

        let map = section.map;
        if map.version != 3 {
            return Err(Error::UnsupportedVersion(map.version));
        }

        let local = mappings::parse_mappings(&map.mappings, map.sources.len(), map.names.len())?;

        let source_base = sources.len() as u32;
        let name_base = names.len() as u32;

        // Remap this section's sources into the combined table, applying its
        // own root now so differing roots cannot interfere later.
        let root = map.source_root.as_deref();
        for (i, source) in map.sources.iter().enumerate() {
            sources.push(path::resolve_source(root, source));
            let content = map
                .sources_content
                .as_ref()
                .and_then(|c| c.get(i).cloned())
                .flatten();
            any_content |= content.is_some();
            sources_content.push(content);
        }
        names.extend(map.names.iter().cloned());

        for entry in local {
            let line = entry
                .generated
                .line
                .checked_add(offset.line)
                .ok_or(Error::FieldOutOfRange {
                    field: "generated line",
                })?;
            let column = if entry.generated.line == 0 {
                entry
                    .generated
                    .column
                    .checked_add(offset.column)
                    .ok_or(Error::FieldOutOfRange {
                        field: "generated column",
                    })?
            } else {
                entry.generated.column
            };
            entries.push(MappingEntry {
                generated: Position { line, column },
                original: entry.original.map(|o| OriginalPosition {
                    source: o.source + source_base,
                    line: o.line,
                    column: o.column,
                    name: o.name.map(|n| n + name_base),
                }),
            });
        }
    }

    let sources_content = any_content.then_some(sources_content);
    Ok(SourceMap::from_parts(
        raw.file,
        None,
        sources,
        sources_content,
        names,
        entries,
    ))
}
